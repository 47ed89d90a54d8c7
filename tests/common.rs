//! Shared test builders for project graphs.
use botforge::prelude::*;

#[allow(dead_code)]
pub fn node(id: &str, kind: NodeKind) -> Node {
    Node::new(id, kind)
}

#[allow(dead_code)]
pub fn message(id: &str, text: &str) -> Node {
    let mut n = Node::new(id, NodeKind::Message);
    n.data.text = Some(text.to_string());
    n
}

#[allow(dead_code)]
pub fn start(id: &str, text: &str) -> Node {
    let mut n = Node::new(id, NodeKind::Start);
    n.data.text = Some(text.to_string());
    n
}

#[allow(dead_code)]
pub fn connect(source: &str, target: &str) -> Connection {
    Connection {
        source: source.to_string(),
        target: target.to_string(),
    }
}

#[allow(dead_code)]
pub fn with_auto(mut node: Node, target: &str) -> Node {
    node.data.auto_transition_to = Some(target.to_string());
    node
}

#[allow(dead_code)]
pub fn goto_button(text: &str, target: &str, order: Option<i64>) -> Button {
    Button {
        text: text.to_string(),
        target: Some(target.to_string()),
        action: ButtonAction::Goto,
        url: None,
        order,
    }
}

/// One `start` node, one `message` node, connection start -> message.
#[allow(dead_code)]
pub fn simple_graph() -> (Vec<Node>, Vec<Connection>) {
    (
        vec![start("start", "Welcome!"), message("greeting", "Hello")],
        vec![connect("start", "greeting")],
    )
}

/// Diamond: A -> B, A -> C, B -> D, C -> D.
#[allow(dead_code)]
pub fn diamond_graph() -> (Vec<Node>, Vec<Connection>) {
    (
        vec![
            message("a", "A"),
            message("b", "B"),
            message("c", "C"),
            message("d", "D"),
        ],
        vec![
            connect("a", "b"),
            connect("a", "c"),
            connect("b", "d"),
            connect("c", "d"),
        ],
    )
}

/// A auto-transitions to B, B auto-transitions back to A.
#[allow(dead_code)]
pub fn cycle_graph() -> (Vec<Node>, Vec<Connection>) {
    (
        vec![
            with_auto(message("a", "A"), "b"),
            with_auto(message("b", "B"), "a"),
        ],
        Vec::new(),
    )
}

/// Two broadcast-eligible message nodes A -> B linked by auto-transition,
/// plus the broadcast node itself with `idSourceType: both`.
#[allow(dead_code)]
pub fn broadcast_graph() -> ProjectGraph {
    let mut a = with_auto(message("a", "First {name}"), "b");
    a.data.enable_broadcast = true;
    a.data.broadcast_target_node = Some("br".to_string());
    let b = message("b", "Second");

    let mut br = Node::new("br", NodeKind::Broadcast);
    br.data.id_source_type = RecipientSource::Both;
    br.data.success_message = Some("All delivered".to_string());

    ProjectGraph {
        nodes: vec![a, b, br],
        connections: Vec::new(),
    }
}
