//! Program assembler: composes the template library and the node generators
//! into one complete, runnable Python source file per bot project.

use std::fmt::Write;

use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use tracing::warn;

use crate::codegen::{GenerationContext, NodeGenerator, default_generators, handler_name};
use crate::graph::TransitionGraph;
use crate::project::{ButtonAction, Node, NodeKind};
use crate::templates::{TemplateLibrary, escape_py_string, replace_placeholders, sanitize_identifier};

/// The assembled output: one self-contained Python source plus a suggested
/// filename. HTTP delivery is the caller's job.
#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    pub source: String,
    pub filename: String,
}

pub struct AssemblerBuilder<'t> {
    templates: &'t TemplateLibrary,
    registry: AHashMap<NodeKind, Box<dyn NodeGenerator>>,
}

impl<'t> AssemblerBuilder<'t> {
    pub fn new(templates: &'t TemplateLibrary) -> Self {
        Self {
            templates,
            registry: default_generators(),
        }
    }

    /// Overrides or adds the generator for one node kind.
    pub fn with_generator(mut self, kind: NodeKind, generator: Box<dyn NodeGenerator>) -> Self {
        self.registry.insert(kind, generator);
        self
    }

    pub fn build(self) -> ProgramAssembler<'t> {
        ProgramAssembler {
            templates: self.templates,
            registry: self.registry,
        }
    }
}

/// Orchestrates one generation request. Holds no per-request state: the same
/// assembler can serve concurrent generations, sharing only the template
/// cache.
pub struct ProgramAssembler<'t> {
    templates: &'t TemplateLibrary,
    registry: AHashMap<NodeKind, Box<dyn NodeGenerator>>,
}

impl<'t> ProgramAssembler<'t> {
    pub fn new(templates: &'t TemplateLibrary) -> Self {
        Self::builder(templates).build()
    }

    pub fn builder(templates: &'t TemplateLibrary) -> AssemblerBuilder<'t> {
        AssemblerBuilder::new(templates)
    }

    /// Composes the full program in fixed order: encoding header, imports,
    /// bot init and globals, persistence templates (when the user database
    /// is enabled), helper functions, one handler per node in graph order,
    /// routing, main. A malformed node degrades to a placeholder comment,
    /// never a failure.
    pub fn assemble(&self, ctx: &GenerationContext) -> GeneratedProgram {
        let graph = ctx.transition_graph();

        let mut source = String::new();
        source.push_str(&self.templates.encoding());
        source.push_str(&self.templates.imports());

        let mut globals = AHashMap::new();
        globals.insert("bot_name".to_string(), ctx.bot_name.clone());
        globals.insert("bot_token".to_string(), ctx.bot_token.clone());
        globals.insert("project_id".to_string(), ctx.project_id.to_string());
        globals.insert("api_base_url".to_string(), ctx.api_base_url.clone());
        source.push_str(&replace_placeholders(&self.templates.bot_init(), &globals));
        source.push_str(&self.emit_media_variables(ctx));

        if ctx.user_database_enabled {
            source.push_str(&self.templates.save_message());
            source.push_str(&self.templates.middleware());
        }
        source.push_str(&self.templates.safe_edit_or_send());
        source.push_str(&self.templates.utility_functions());

        for node in ordered_nodes(ctx, &graph) {
            match self.registry.get(&node.kind) {
                Some(generator) => {
                    source.push('\n');
                    source.push_str(&generator.generate_handler(node, ctx, &graph));
                }
                None => {
                    warn!(
                        node = node.id.as_str(),
                        kind = node.kind.as_str(),
                        "no generator registered, emitting placeholder"
                    );
                    source.push_str(&self.templates.handler_skeleton(node.kind.as_str()));
                    let _ = writeln!(source, "# node '{}' skipped\n", node.id);
                }
            }
        }

        if !ctx.nodes.is_empty() {
            source.push_str(&self.emit_routers(ctx, &graph));
        }

        let mut main_values = AHashMap::new();
        main_values.insert("bot_name".to_string(), ctx.bot_name.clone());
        main_values.insert(
            "registrations".to_string(),
            self.emit_registrations(ctx, &graph),
        );
        source.push_str(&replace_placeholders(
            &self.templates.main_function(),
            &main_values,
        ));

        GeneratedProgram {
            filename: suggested_filename(&ctx.bot_name),
            source,
        }
    }

    /// Media variables known at generation time, merged under per-user
    /// variables by `user_variables` in the emitted program.
    fn emit_media_variables(&self, ctx: &GenerationContext) -> String {
        let mut out = String::from("\nMEDIA_VARIABLES = {\n");
        for name in ctx.media_variables.keys().sorted() {
            let variable = &ctx.media_variables[name];
            let _ = writeln!(
                out,
                "    \"{}\": {{\"{}\": \"{}\"}},",
                escape_py_string(name),
                escape_py_string(&variable.kind),
                escape_py_string(&variable.url)
            );
        }
        out.push_str("}\n");
        out
    }

    fn emit_routers(&self, ctx: &GenerationContext, graph: &TransitionGraph) -> String {
        let mut out = String::new();

        // Callback router: goto buttons dispatch to the target's handler,
        // input buttons arm the pending-input state.
        let _ = writeln!(out, "\nasync def route_callback(callback: CallbackQuery):");
        let _ = writeln!(out, "    user_id = callback.from_user.id");
        let _ = writeln!(out, "    data = callback.data or \"\"");
        let _ = writeln!(out, "    if data.startswith(\"input:\"):");
        let _ = writeln!(
            out,
            "        USER_STATE[str(user_id)] = data.split(\":\", 1)[1]"
        );
        let _ = writeln!(out, "        await callback.answer()");
        let _ = writeln!(out, "        return");
        for (target, handler) in self.goto_targets(ctx, graph) {
            let _ = writeln!(
                out,
                "    if data == \"goto:{}\":",
                escape_py_string(&target)
            );
            let _ = writeln!(out, "        await {handler}(callback.message, user_id)");
        }
        let _ = writeln!(out, "    await callback.answer()");

        // Text router: consumes the pending input, stores it under the
        // requesting node's variable, then runs the target handler.
        let input_targets = self.input_targets(ctx, graph);
        let _ = writeln!(out, "\nINPUT_VARIABLES = {{");
        for (target, variable, _) in &input_targets {
            let _ = writeln!(
                out,
                "    \"{}\": \"{}\",",
                escape_py_string(target),
                escape_py_string(variable)
            );
        }
        let _ = writeln!(out, "}}");

        let _ = writeln!(out, "\nasync def route_text(message: Message):");
        let _ = writeln!(out, "    user_id = message.from_user.id");
        let _ = writeln!(out, "    pending = USER_STATE.pop(str(user_id), None)");
        let _ = writeln!(out, "    if pending is None:");
        let _ = writeln!(out, "        return");
        let _ = writeln!(
            out,
            "    var_name = INPUT_VARIABLES.get(pending, \"last_input\")"
        );
        let _ = writeln!(
            out,
            "    USER_VARIABLES.setdefault(str(user_id), {{}})[var_name] = message.text or \"\""
        );
        for (target, _, handler) in &input_targets {
            let _ = writeln!(out, "    if pending == \"{}\":", escape_py_string(target));
            let _ = writeln!(out, "        await {handler}(message, user_id)");
        }
        out
    }

    fn emit_registrations(&self, ctx: &GenerationContext, graph: &TransitionGraph) -> String {
        if ctx.nodes.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        if let Some(root) = graph.find_root() {
            if let Some(handler) = self.handler_for(root) {
                let _ = writeln!(out, "    async def on_start(message: Message):");
                let _ = writeln!(out, "        await {handler}(message, message.from_user.id)");
                let _ = writeln!(out, "    dp.message.register(on_start, CommandStart())");
            }
        }
        let _ = writeln!(out, "    dp.callback_query.register(route_callback)");
        out.push_str("    dp.message.register(route_text)");
        out
    }

    fn handler_for(&self, node: &Node) -> Option<String> {
        self.registry
            .get(&node.kind)
            .map(|g| handler_name(g.capability(), &node.id))
    }

    /// Distinct goto-button targets that resolve to a generatable node, in
    /// first-appearance order.
    fn goto_targets(
        &self,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
    ) -> Vec<(String, String)> {
        let mut seen = AHashSet::new();
        let mut targets = Vec::new();
        for node in &ctx.nodes {
            for button in &node.data.buttons {
                if button.action != ButtonAction::Goto {
                    continue;
                }
                let Some(target) = &button.target else { continue };
                if !seen.insert(target.clone()) {
                    continue;
                }
                if let Some(handler) = graph.node(target).and_then(|n| self.handler_for(n)) {
                    targets.push((target.clone(), handler));
                }
            }
        }
        targets
    }

    /// Pending-input targets: `(target id, variable name, handler)` drawn
    /// from `inputTargetNodeId` fields and input-action buttons.
    fn input_targets(
        &self,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
    ) -> Vec<(String, String, String)> {
        let mut seen = AHashSet::new();
        let mut targets = Vec::new();
        let mut push = |target: &str, variable: &str, targets: &mut Vec<(String, String, String)>| {
            if !seen.insert(target.to_string()) {
                return;
            }
            if let Some(handler) = graph.node(target).and_then(|n| self.handler_for(n)) {
                targets.push((target.to_string(), variable.to_string(), handler));
            }
        };
        for node in &ctx.nodes {
            let variable = node.data.input_variable.as_deref().unwrap_or("last_input");
            if let Some(target) = &node.data.input_target_node_id {
                push(target, variable, &mut targets);
            }
            for button in &node.data.buttons {
                if button.action == ButtonAction::Input {
                    if let Some(target) = &button.target {
                        push(target, variable, &mut targets);
                    }
                }
            }
        }
        targets
    }
}

/// Handlers are emitted in graph order: a breadth-first walk over the merged
/// edges from the root, then any leftover nodes in input order.
fn ordered_nodes<'a>(ctx: &'a GenerationContext, graph: &TransitionGraph<'a>) -> Vec<&'a Node> {
    let mut ordered = Vec::new();
    let mut seen: AHashSet<&str> = AHashSet::new();

    if let Some(root) = graph.find_root() {
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(root);
        seen.insert(root.id.as_str());
        while let Some(node) = queue.pop_front() {
            ordered.push(node);
            for edge in graph.outgoing(&node.id) {
                if let Some(next) = graph.node(&edge.target) {
                    if seen.insert(next.id.as_str()) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    for node in &ctx.nodes {
        if seen.insert(node.id.as_str()) {
            ordered.push(node);
        }
    }
    ordered
}

fn suggested_filename(bot_name: &str) -> String {
    let sanitized = sanitize_identifier(&bot_name.to_lowercase());
    let stem = sanitized.trim_matches('_');
    if stem.is_empty() {
        "generated_bot.py".to_string()
    } else {
        format!("{stem}_bot.py")
    }
}
