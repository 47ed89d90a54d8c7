//! Per-capability node code generators.
//!
//! Each generator consumes one node plus the global graph context and emits
//! a self-contained Python async handler body. Generators never fail: unknown
//! or missing data falls back to safe defaults and structural anomalies
//! degrade to visible comments in the emitted source.

use std::fmt::Write;

use ahash::{AHashMap, AHashSet};
use tracing::warn;

use crate::graph::{EdgeKind, TransitionGraph};
use crate::project::{Connection, Node, NodeKind, ProjectGraph};
use crate::templates::sanitize_identifier;

mod broadcast;
mod condition;
mod media;
mod message;

pub use broadcast::{BroadcastGenerator, collect_broadcast_nodes};
pub use condition::ConditionGenerator;
pub use media::MediaGenerator;
pub use message::{MessageGenerator, StartGenerator};

/// A media variable known at generation time: an uploaded file referenced by
/// name from node `attachedMedia` lists.
#[derive(Debug, Clone)]
pub struct MediaVariable {
    /// One of `photo`, `video`, `audio`, `document`.
    pub kind: String,
    pub url: String,
}

/// Everything one generation request needs. Owned by the assembler for the
/// duration of a single request and never persisted.
pub struct GenerationContext {
    pub bot_name: String,
    pub bot_token: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub user_database_enabled: bool,
    pub project_id: i64,
    pub api_base_url: String,
    pub media_variables: AHashMap<String, MediaVariable>,
    pub enable_comments: bool,
}

impl GenerationContext {
    pub fn new(bot_name: impl Into<String>, graph: ProjectGraph, project_id: i64) -> Self {
        Self {
            bot_name: bot_name.into(),
            bot_token: "YOUR_BOT_TOKEN".to_string(),
            nodes: graph.nodes,
            connections: graph.connections,
            user_database_enabled: false,
            project_id,
            api_base_url: "http://localhost:3000".to_string(),
            media_variables: AHashMap::new(),
            enable_comments: false,
        }
    }

    pub fn with_user_database(mut self, enabled: bool) -> Self {
        self.user_database_enabled = enabled;
        self
    }

    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.enable_comments = enabled;
        self
    }

    pub fn with_bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = token.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_media_variables(mut self, variables: AHashMap<String, MediaVariable>) -> Self {
        self.media_variables = variables;
        self
    }

    pub fn transition_graph(&self) -> TransitionGraph<'_> {
        TransitionGraph::new(&self.nodes, &self.connections)
    }
}

/// Deterministic handler name for a node:
/// `handle_<capability>_<sanitized node id>`.
pub fn handler_name(capability: &str, node_id: &str) -> String {
    format!("handle_{}_{}", capability, sanitize_identifier(node_id))
}

/// Defines the contract for emitting one node capability as Python source.
pub trait NodeGenerator: Send + Sync {
    fn capability(&self) -> &'static str;

    /// Emits the handler function body at the given indent. Must read only
    /// documented `data` fields for its node kind and never fail.
    fn generate(
        &self,
        node: &Node,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
        indent: &str,
    ) -> String;

    /// Wraps the body in a named async function, optionally prefixed with a
    /// generation-provenance comment.
    fn generate_handler(
        &self,
        node: &Node,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
    ) -> String {
        let name = handler_name(self.capability(), &node.id);
        let mut out = String::new();
        if ctx.enable_comments {
            let _ = writeln!(
                out,
                "# Generated from {} node '{}' of project {}",
                self.capability(),
                node.id,
                ctx.project_id
            );
        }
        let _ = writeln!(out, "async def {}(message, user_id):", name);
        let body = self.generate(node, ctx, graph, "    ");
        if body.trim().is_empty() {
            out.push_str("    pass\n");
        } else {
            out.push_str(&body);
        }
        out
    }
}

/// The default generator registry, one entry per supported node kind.
/// `NodeKind::Unknown` has no entry: the assembler degrades those nodes to a
/// placeholder comment.
pub fn default_generators() -> AHashMap<NodeKind, Box<dyn NodeGenerator>> {
    let mut registry: AHashMap<NodeKind, Box<dyn NodeGenerator>> = AHashMap::new();
    registry.insert(NodeKind::Start, Box::new(StartGenerator));
    registry.insert(NodeKind::Message, Box::new(MessageGenerator));
    registry.insert(NodeKind::Keyboard, Box::new(MessageGenerator));
    for kind in [
        NodeKind::Photo,
        NodeKind::Video,
        NodeKind::Audio,
        NodeKind::Document,
        NodeKind::Sticker,
        NodeKind::Voice,
        NodeKind::Animation,
        NodeKind::Location,
        NodeKind::Contact,
    ] {
        registry.insert(kind, Box::new(MediaGenerator::new(kind)));
    }
    registry.insert(NodeKind::Condition, Box::new(ConditionGenerator));
    registry.insert(NodeKind::Broadcast, Box::new(BroadcastGenerator));
    registry
}

/// Emits the send logic of one node inline. `visited` carries the node ids
/// already expanded on the current path so transition cycles terminate with
/// a comment instead of recursing forever.
pub(crate) fn emit_node_body(
    node: &Node,
    ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
    visited: &mut AHashSet<String>,
    via_auto: bool,
) -> String {
    match node.kind {
        NodeKind::Start | NodeKind::Message | NodeKind::Keyboard => {
            message::emit_body(node, ctx, graph, indent, visited, via_auto)
        }
        NodeKind::Photo
        | NodeKind::Video
        | NodeKind::Audio
        | NodeKind::Document
        | NodeKind::Sticker
        | NodeKind::Voice
        | NodeKind::Animation
        | NodeKind::Location
        | NodeKind::Contact => media::emit_body(node, ctx, graph, indent, visited),
        NodeKind::Condition => condition::emit_body(node, ctx, graph, indent, visited),
        NodeKind::Broadcast => broadcast::emit_body(node, ctx, graph, indent),
        NodeKind::Unknown => {
            warn!(node = node.id.as_str(), "unsupported node kind, emitting placeholder");
            format!("{indent}# TODO: unsupported node kind (node '{}')\n", node.id)
        }
    }
}

/// Inlines the auto-transition target's send logic, if any. Emitting the
/// next node's sends directly avoids depending on framework internals for
/// synthetic callback dispatch.
pub(crate) fn emit_auto_transition(
    node: &Node,
    ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
    visited: &mut AHashSet<String>,
) -> String {
    let Some(edge) = graph
        .outgoing(&node.id)
        .iter()
        .find(|e| e.kind == EdgeKind::AutoTransition)
    else {
        return String::new();
    };

    let mut out = String::new();
    match graph.node(&edge.target) {
        Some(next) => {
            if !visited.insert(next.id.clone()) {
                warn!(
                    node = node.id.as_str(),
                    target = next.id.as_str(),
                    "auto-transition cycle detected, emission stopped"
                );
                let _ = writeln!(
                    out,
                    "{indent}# auto-transition to '{}' skipped: cycle on this path",
                    next.id
                );
                return out;
            }
            if ctx.enable_comments {
                let _ = writeln!(out, "{indent}# auto-transition to '{}'", next.id);
            }
            out.push_str(&emit_node_body(next, ctx, graph, indent, visited, true));
        }
        None => {
            warn!(
                node = node.id.as_str(),
                target = edge.target.as_str(),
                "auto-transition target not found"
            );
            let _ = writeln!(
                out,
                "{indent}# auto-transition target '{}' not found",
                edge.target
            );
        }
    }
    out
}

/// Emits the pending-input bookkeeping for a node that awaits the user's
/// next text message.
pub(crate) fn emit_input_wait(node: &Node, indent: &str, out: &mut String) {
    if let Some(target) = &node.data.input_target_node_id {
        let _ = writeln!(
            out,
            "{indent}USER_STATE[str(user_id)] = \"{}\"",
            crate::templates::escape_py_string(target)
        );
    }
}
