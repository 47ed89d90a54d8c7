//! Merged transition graph tests: edge priority, dedup, roots and chains.
mod common;
use common::*;

use botforge::graph::{EdgeKind, TransitionGraph, goto_buttons, resolve_outgoing_edges};
use botforge::prelude::*;

#[test]
fn edges_merge_in_priority_order() {
    let mut node = message("hub", "hub");
    node.data.auto_transition_to = Some("auto".to_string());
    node.data.input_target_node_id = Some("input".to_string());
    node.data.buttons.push(goto_button("Btn", "btn", None));
    let connections = vec![connect("hub", "conn")];

    let edges = resolve_outgoing_edges(&node, &connections);
    let kinds: Vec<EdgeKind> = edges.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EdgeKind::AutoTransition,
            EdgeKind::InputTarget,
            EdgeKind::Button,
            EdgeKind::Connection
        ]
    );
    let targets: Vec<&str> = edges.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(targets, vec!["auto", "input", "btn", "conn"]);
}

#[test]
fn duplicate_targets_keep_the_highest_priority_edge() {
    let mut node = message("hub", "hub");
    node.data.auto_transition_to = Some("next".to_string());
    node.data.buttons.push(goto_button("Btn", "next", None));
    let connections = vec![connect("hub", "next")];

    let edges = resolve_outgoing_edges(&node, &connections);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::AutoTransition);
}

#[test]
fn empty_targets_are_dropped() {
    let mut node = message("hub", "hub");
    node.data.auto_transition_to = Some(String::new());
    assert!(resolve_outgoing_edges(&node, &[]).is_empty());
}

#[test]
fn goto_buttons_sort_by_order_with_unordered_last() {
    let mut node = message("menu", "menu");
    node.data.buttons.push(goto_button("unordered", "c", None));
    node.data.buttons.push(goto_button("second", "b", Some(2)));
    node.data.buttons.push(goto_button("first", "a", Some(1)));

    let ordered: Vec<&str> = goto_buttons(&node)
        .iter()
        .filter_map(|b| b.target.as_deref())
        .collect();
    assert_eq!(ordered, vec!["a", "b", "c"]);
}

#[test]
fn non_goto_buttons_never_form_edges() {
    let mut node = message("menu", "menu");
    node.data.buttons.push(Button {
        text: "Docs".to_string(),
        target: None,
        action: ButtonAction::Url,
        url: Some("https://example.test".to_string()),
        order: None,
    });
    assert!(resolve_outgoing_edges(&node, &[]).is_empty());
}

#[test]
fn start_node_wins_root_selection() {
    let nodes = vec![message("m", "m"), start("s", "hi")];
    let graph = TransitionGraph::new(&nodes, &[]);
    assert_eq!(graph.find_root().unwrap().id, "s");
}

#[test]
fn untargeted_node_is_root_without_a_start() {
    let (nodes, connections) = diamond_graph();
    let graph = TransitionGraph::new(&nodes, &connections);
    assert_eq!(graph.find_root().unwrap().id, "a");
}

#[test]
fn full_cycle_falls_back_to_the_first_node() {
    let (nodes, connections) = cycle_graph();
    let graph = TransitionGraph::new(&nodes, &connections);
    assert_eq!(graph.find_root().unwrap().id, "a");
}

#[test]
fn button_only_roots_are_still_roots() {
    // A node reached only through a button is not "targeted" for root
    // selection purposes.
    let mut menu = message("menu", "menu");
    menu.data.buttons.push(goto_button("go", "page", Some(1)));
    let nodes = vec![message("page", "page"), menu];
    let graph = TransitionGraph::new(&nodes, &[]);
    assert_eq!(graph.find_root().unwrap().id, "page");
}

#[test]
fn parents_are_distinct_and_in_input_order() {
    let (nodes, connections) = diamond_graph();
    let graph = TransitionGraph::new(&nodes, &connections);
    assert_eq!(graph.parents("d"), &["b", "c"]);
    assert!(graph.parents("a").is_empty());
}

#[test]
fn chains_skip_plain_connections() {
    let (nodes, connections) = simple_graph();
    let graph = TransitionGraph::new(&nodes, &connections);
    assert!(graph.chain_next("start").is_none());

    let chained = vec![with_auto(start("s", "hi"), "m"), message("m", "m")];
    let chained_graph = TransitionGraph::new(&chained, &[]);
    assert_eq!(chained_graph.chain_next("s").unwrap().id, "m");
}

#[test]
fn dangling_targets_never_resolve_to_nodes() {
    let nodes = vec![with_auto(message("m", "m"), "ghost")];
    let graph = TransitionGraph::new(&nodes, &[]);
    assert!(graph.chain_next("m").is_none());
    assert!(!graph.contains("ghost"));
    // The dangling edge is still visible in the adjacency.
    assert_eq!(graph.outgoing("m").len(), 1);
}
