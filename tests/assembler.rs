//! Full-program assembly tests: composition order, persistence gating,
//! routing and degraded paths.
mod common;
use common::*;

use ahash::AHashMap;
use botforge::prelude::*;

fn assemble(ctx: &GenerationContext) -> GeneratedProgram {
    let templates = TemplateLibrary::new();
    ProgramAssembler::new(&templates).assemble(ctx)
}

fn simple_context() -> GenerationContext {
    let (nodes, connections) = simple_graph();
    GenerationContext::new("TestBot", ProjectGraph { nodes, connections }, 7)
}

#[test]
fn empty_graph_yields_bootstrap_only() {
    let ctx = GenerationContext::new("TestBot", ProjectGraph::default(), 7);
    let program = assemble(&ctx);

    assert!(program.source.starts_with("#!/usr/bin/env python3"));
    assert!(program.source.contains("from aiogram import Bot, Dispatcher"));
    assert!(program.source.contains("async def safe_edit_or_send"));
    assert!(program.source.contains("async def main():"));
    assert!(program.source.contains("await dp.start_polling(bot)"));
    // No handlers, no routing.
    assert!(!program.source.contains("route_callback"));
    assert!(!program.source.contains("async def handle_"));
}

#[test]
fn supplied_placeholders_never_survive_assembly() {
    let ctx = simple_context()
        .with_bot_token("123:abc")
        .with_api_base_url("https://api.example.test");
    let program = assemble(&ctx);

    for key in [
        "{bot_name}",
        "{bot_token}",
        "{project_id}",
        "{api_base_url}",
        "{registrations}",
        "{handler_name}",
        "{handler_body}",
    ] {
        assert!(
            !program.source.contains(key),
            "unreplaced placeholder {} in output",
            key
        );
    }
    assert!(program.source.contains("os.getenv(\"BOT_TOKEN\", \"123:abc\")"));
    assert!(program.source.contains("PROJECT_ID = 7"));
    assert!(program.source.contains("https://api.example.test"));
}

#[test]
fn assembly_is_deterministic() {
    let first = assemble(&simple_context()).source;
    let second = assemble(&simple_context()).source;
    assert_eq!(first, second);
}

#[test]
fn persistence_templates_follow_the_user_database_flag() {
    let enabled = assemble(&simple_context().with_user_database(true)).source;
    assert!(enabled.contains("async def save_message_to_api"));
    assert!(enabled.contains("async def persistence_middleware"));

    let disabled = assemble(&simple_context()).source;
    assert!(!disabled.contains("save_message_to_api"));
    assert!(!disabled.contains("persistence_middleware"));
    // Helpers are unconditional.
    assert!(disabled.contains("async def safe_edit_or_send"));
    assert!(disabled.contains("def substitute_variables"));
    assert!(disabled.contains("async def fetch_recipients"));
}

#[test]
fn media_variables_are_emitted_sorted_by_name() {
    let mut variables = AHashMap::new();
    variables.insert(
        "zeta".to_string(),
        MediaVariable {
            kind: "photo".to_string(),
            url: "https://cdn.example/z.png".to_string(),
        },
    );
    variables.insert(
        "alpha".to_string(),
        MediaVariable {
            kind: "video".to_string(),
            url: "https://cdn.example/a.mp4".to_string(),
        },
    );
    let ctx = simple_context().with_media_variables(variables);
    let source = assemble(&ctx).source;

    let alpha = source.find("\"alpha\": {\"video\"").unwrap();
    let zeta = source.find("\"zeta\": {\"photo\"").unwrap();
    assert!(alpha < zeta);
}

#[test]
fn start_node_registers_the_entry_handler() {
    let source = assemble(&simple_context()).source;
    assert!(source.contains("async def handle_start_start(message, user_id):"));
    assert!(source.contains("await handle_start_start(message, message.from_user.id)"));
    assert!(source.contains("dp.message.register(on_start, CommandStart())"));
    assert!(source.contains("dp.callback_query.register(route_callback)"));
    assert!(source.contains("dp.message.register(route_text)"));
}

#[test]
fn goto_buttons_get_callback_routes() {
    let (mut nodes, connections) = simple_graph();
    nodes[0].data.keyboard_type = KeyboardKind::Inline;
    nodes[0].data.buttons.push(goto_button("Go", "greeting", None));
    let ctx = GenerationContext::new("TestBot", ProjectGraph { nodes, connections }, 7);
    let source = assemble(&ctx).source;

    assert!(source.contains("if data == \"goto:greeting\":"));
    assert!(source.contains("await handle_message_greeting(callback.message, user_id)"));
}

#[test]
fn input_targets_build_the_text_route() {
    let (mut nodes, connections) = simple_graph();
    nodes[0].data.input_target_node_id = Some("greeting".to_string());
    nodes[0].data.input_variable = Some("user_name".to_string());
    let ctx = GenerationContext::new("TestBot", ProjectGraph { nodes, connections }, 7);
    let source = assemble(&ctx).source;

    assert!(source.contains("\"greeting\": \"user_name\","));
    assert!(source.contains("pending = USER_STATE.pop(str(user_id), None)"));
    assert!(source.contains("if pending == \"greeting\":"));
    assert!(source.contains("await handle_message_greeting(message, user_id)"));
}

#[test]
fn unknown_node_kind_degrades_to_a_placeholder() {
    let mut nodes = vec![start("start", "hi")];
    nodes.push(node("mystery", NodeKind::Unknown));
    let ctx = GenerationContext::new("TestBot", ProjectGraph { nodes, connections: Vec::new() }, 7);
    let source = assemble(&ctx).source;

    assert!(source.contains("# TODO: no handler template for kind 'unknown'"));
    assert!(source.contains("# node 'mystery' skipped"));
    // The rest of the program still assembles.
    assert!(source.contains("async def handle_start_start"));
    assert!(source.contains("async def main():"));
}

#[test]
fn handlers_follow_graph_order_from_the_root() {
    let nodes = vec![
        message("late", "placed last in walk order"),
        start("start", "hi"),
        message("second", "two"),
    ];
    let connections = vec![connect("start", "second"), connect("second", "late")];
    let ctx = GenerationContext::new("TestBot", ProjectGraph { nodes, connections }, 7);
    let source = assemble(&ctx).source;

    let s = source.find("async def handle_start_start").unwrap();
    let second = source.find("async def handle_message_second").unwrap();
    let late = source.find("async def handle_message_late").unwrap();
    assert!(s < second && second < late);
}

#[test]
fn suggested_filename_derives_from_the_bot_name() {
    let ctx = GenerationContext::new("My Shop Bot!", ProjectGraph::default(), 7);
    assert_eq!(assemble(&ctx).filename, "my_shop_bot_bot.py");

    let unnamed = GenerationContext::new("", ProjectGraph::default(), 7);
    assert_eq!(assemble(&unnamed).filename, "generated_bot.py");
}
