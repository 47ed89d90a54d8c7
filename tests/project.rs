//! Stored-project parsing tests: flat and multi-sheet records, defaults and
//! unknown kinds.
use botforge::error::ProjectParseError;
use botforge::prelude::*;

#[test]
fn parses_a_flat_project_record() {
    let json = r#"{
        "nodes": [
            {
                "id": "start",
                "type": "start",
                "position": {"x": 10.0, "y": 20.0},
                "data": {
                    "text": "Welcome!",
                    "keyboardType": "inline",
                    "autoTransitionTo": "menu",
                    "buttons": [
                        {"text": "Go", "target": "menu", "action": "goto", "order": 1}
                    ]
                }
            },
            {"id": "menu", "type": "message", "data": {"messageText": "Pick"}}
        ],
        "connections": [{"source": "start", "target": "menu"}]
    }"#;

    let graph = ProjectGraph::from_json(json).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.connections.len(), 1);

    let start = &graph.nodes[0];
    assert_eq!(start.kind, NodeKind::Start);
    assert_eq!(start.position.x, 10.0);
    assert_eq!(start.data.keyboard_type, KeyboardKind::Inline);
    assert_eq!(start.data.auto_transition_to.as_deref(), Some("menu"));
    assert_eq!(start.data.buttons[0].action, ButtonAction::Goto);
    assert_eq!(start.data.buttons[0].order, Some(1));

    // messageText is the legacy text field.
    assert_eq!(graph.nodes[1].data.effective_text(), "Pick");
}

#[test]
fn missing_fields_take_defaults() {
    let json = r#"{"nodes": [{"id": "m", "type": "message"}]}"#;
    let graph = ProjectGraph::from_json(json).unwrap();
    let node = &graph.nodes[0];
    assert_eq!(node.data.effective_text(), "");
    assert_eq!(node.data.keyboard_type, KeyboardKind::None);
    assert!(node.data.buttons.is_empty());
    assert!(!node.data.enable_broadcast);
    assert!(graph.connections.is_empty());
}

#[test]
fn unknown_node_type_maps_to_the_catch_all() {
    let json = r#"{"nodes": [{"id": "x", "type": "quiz"}], "connections": []}"#;
    let graph = ProjectGraph::from_json(json).unwrap();
    assert_eq!(graph.nodes[0].kind, NodeKind::Unknown);
}

#[test]
fn multi_sheet_record_uses_the_active_sheet() {
    let json = r#"{
        "activeSheetId": "second",
        "sheets": [
            {"id": "first", "nodes": [{"id": "a", "type": "message"}], "connections": []},
            {"id": "second", "nodes": [{"id": "b", "type": "message"}], "connections": []}
        ]
    }"#;

    let graph = ProjectGraph::from_json(json).unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].id, "b");
}

#[test]
fn multi_sheet_record_falls_back_to_the_first_sheet() {
    let json = r#"{
        "sheets": [
            {"id": "first", "nodes": [{"id": "a", "type": "message"}], "connections": []},
            {"id": "second", "nodes": [{"id": "b", "type": "message"}], "connections": []}
        ]
    }"#;
    let graph = ProjectGraph::from_json(json).unwrap();
    assert_eq!(graph.nodes[0].id, "a");

    let unknown_active = r#"{
        "activeSheetId": "ghost",
        "sheets": [
            {"id": "first", "nodes": [{"id": "a", "type": "message"}], "connections": []}
        ]
    }"#;
    let graph = ProjectGraph::from_json(unknown_active).unwrap();
    assert_eq!(graph.nodes[0].id, "a");
}

#[test]
fn empty_sheet_list_is_an_error() {
    let json = r#"{"sheets": [], "activeSheetId": "first"}"#;
    match ProjectGraph::from_json(json) {
        Err(ProjectParseError::EmptyProject) => {}
        other => panic!("expected EmptyProject, got {:?}", other),
    }
}

#[test]
fn malformed_json_reports_a_parse_error() {
    match ProjectGraph::from_json("{not json") {
        Err(ProjectParseError::JsonParseError(_)) => {}
        other => panic!("expected JsonParseError, got {:?}", other),
    }
}

struct CsvFlow {
    rows: Vec<(String, String)>,
}

impl IntoGraph for CsvFlow {
    fn into_graph(self) -> std::result::Result<ProjectGraph, GraphConversionError> {
        if self.rows.is_empty() {
            return Err(GraphConversionError::ValidationError(
                "flow has no rows".to_string(),
            ));
        }
        let mut nodes = Vec::new();
        let mut connections = Vec::new();
        for (i, (id, text)) in self.rows.iter().enumerate() {
            let kind = if i == 0 { NodeKind::Start } else { NodeKind::Message };
            let mut node = Node::new(id.clone(), kind);
            node.data.text = Some(text.clone());
            nodes.push(node);
            if i > 0 {
                connections.push(Connection {
                    source: self.rows[i - 1].0.clone(),
                    target: id.clone(),
                });
            }
        }
        Ok(ProjectGraph { nodes, connections })
    }
}

#[test]
fn custom_formats_convert_through_the_graph_trait() {
    let flow = CsvFlow {
        rows: vec![
            ("start".to_string(), "Welcome".to_string()),
            ("next".to_string(), "Bye".to_string()),
        ],
    };
    let graph = flow.into_graph().unwrap();
    assert_eq!(graph.nodes[0].kind, NodeKind::Start);
    assert_eq!(graph.connections.len(), 1);

    let empty = CsvFlow { rows: Vec::new() };
    match empty.into_graph() {
        Err(GraphConversionError::ValidationError(reason)) => {
            assert!(reason.contains("no rows"));
        }
        other => panic!("expected ValidationError, got {:?}", other),
    }
}

#[test]
fn broadcast_fields_parse_with_snake_case_enums() {
    let json = r#"{
        "nodes": [
            {
                "id": "br",
                "type": "broadcast",
                "data": {
                    "idSourceType": "both",
                    "deliveryMethod": "client_api",
                    "enableBroadcast": false,
                    "successMessage": "done"
                }
            }
        ]
    }"#;
    let graph = ProjectGraph::from_json(json).unwrap();
    let data = &graph.nodes[0].data;
    assert_eq!(data.id_source_type, RecipientSource::Both);
    assert_eq!(
        data.delivery_method,
        botforge::project::DeliveryMethod::ClientApi
    );
    assert_eq!(data.success_message.as_deref(), Some("done"));
}
