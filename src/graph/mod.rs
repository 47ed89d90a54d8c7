//! The merged transition graph.
//!
//! A project graph carries three overlapping kinds of edges: explicit
//! connections, `autoTransitionTo`/`inputTargetNodeId` links, and goto
//! buttons. Layout and code generation must agree on topology, so the merge
//! is performed exactly once here and consumed by both.

use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

use crate::project::{Button, ButtonAction, Connection, Node, NodeKind};

/// Buttons without an explicit `order` sort after every ordered button.
const UNORDERED_BUTTON_RANK: i64 = 999;

/// Which source an outgoing edge came from, in descending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeKind {
    AutoTransition,
    InputTarget,
    Button,
    Connection,
}

#[derive(Debug, Clone)]
pub struct OutgoingEdge {
    pub target: String,
    pub kind: EdgeKind,
}

/// Merges a node's three edge sources into one ordered list:
/// auto-transition first, then the input target, then goto buttons sorted by
/// their `order` field, then plain connections. Duplicate targets keep only
/// their first (highest-priority) occurrence.
pub fn resolve_outgoing_edges(node: &Node, connections: &[Connection]) -> Vec<OutgoingEdge> {
    let mut edges = Vec::new();
    let mut seen: AHashSet<String> = AHashSet::new();

    let mut push = |target: &str, kind: EdgeKind, edges: &mut Vec<OutgoingEdge>| {
        if !target.is_empty() && seen.insert(target.to_string()) {
            edges.push(OutgoingEdge {
                target: target.to_string(),
                kind,
            });
        }
    };

    if let Some(target) = &node.data.auto_transition_to {
        push(target, EdgeKind::AutoTransition, &mut edges);
    }
    if let Some(target) = &node.data.input_target_node_id {
        push(target, EdgeKind::InputTarget, &mut edges);
    }
    for button in goto_buttons(node) {
        if let Some(target) = &button.target {
            push(target, EdgeKind::Button, &mut edges);
        }
    }
    for connection in connections.iter().filter(|c| c.source == node.id) {
        push(&connection.target, EdgeKind::Connection, &mut edges);
    }

    edges
}

/// The node's goto buttons in display order (missing `order` ranks last).
pub fn goto_buttons(node: &Node) -> Vec<&Button> {
    node.data
        .buttons
        .iter()
        .filter(|b| b.action == ButtonAction::Goto && b.target.is_some())
        .sorted_by_key(|b| b.order.unwrap_or(UNORDERED_BUTTON_RANK))
        .collect()
}

/// An immutable, id-keyed view of the merged graph, built once per layout or
/// generation pass. No cyclic child pointers: adjacency lives in plain maps
/// and traversal state is passed as function parameters.
pub struct TransitionGraph<'a> {
    nodes: &'a [Node],
    by_id: AHashMap<&'a str, &'a Node>,
    adjacency: AHashMap<&'a str, Vec<OutgoingEdge>>,
    parents: AHashMap<String, Vec<&'a str>>,
}

impl<'a> TransitionGraph<'a> {
    pub fn new(nodes: &'a [Node], connections: &'a [Connection]) -> Self {
        let by_id: AHashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut adjacency: AHashMap<&str, Vec<OutgoingEdge>> = AHashMap::new();
        let mut parents: AHashMap<String, Vec<&str>> = AHashMap::new();
        for node in nodes {
            let edges = resolve_outgoing_edges(node, connections);
            for edge in &edges {
                // Edges to ids outside the graph are kept in the adjacency
                // (callers skip them) but never produce parent entries.
                if by_id.contains_key(edge.target.as_str()) {
                    let entry = parents.entry(edge.target.clone()).or_default();
                    if !entry.contains(&node.id.as_str()) {
                        entry.push(node.id.as_str());
                    }
                }
            }
            adjacency.insert(node.id.as_str(), edges);
        }

        Self {
            nodes,
            by_id,
            adjacency,
            parents,
        }
    }

    pub fn nodes(&self) -> &'a [Node] {
        self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All merged outgoing edges of a node, highest priority first.
    pub fn outgoing(&self, id: &str) -> &[OutgoingEdge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct parents of a node, in source-node input order.
    pub fn parents(&self, id: &str) -> &[&'a str] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The target this node advances to without user input: its
    /// auto-transition, input target, or first goto button. Plain connections
    /// do not form chains.
    pub fn chain_next(&self, id: &str) -> Option<&'a Node> {
        self.outgoing(id)
            .iter()
            .find(|e| e.kind != EdgeKind::Connection)
            .and_then(|e| self.node(&e.target))
    }

    /// Root selection: prefer a `start` node; else a node that is not the
    /// target of any regular connection or auto-transition (a true graph
    /// root); else fall back to the first node. `None` only for an empty
    /// graph.
    pub fn find_root(&self) -> Option<&'a Node> {
        if let Some(start) = self.nodes.iter().find(|n| n.kind == NodeKind::Start) {
            return Some(start);
        }

        let mut targeted: AHashSet<&str> = AHashSet::new();
        for node in self.nodes {
            for edge in self.outgoing(&node.id) {
                if matches!(edge.kind, EdgeKind::Connection | EdgeKind::AutoTransition) {
                    targeted.insert(edge.target.as_str());
                }
            }
        }

        self.nodes
            .iter()
            .find(|n| !targeted.contains(n.id.as_str()))
            .or_else(|| self.nodes.first())
    }
}
