//! Condition node generator: compares one collected user variable against a
//! configured value and branches. Both branch targets are emitted inline
//! with the same visited-set guard as auto-transitions, so condition cycles
//! terminate with a comment.

use std::fmt::Write;

use ahash::AHashSet;
use tracing::warn;

use crate::graph::TransitionGraph;
use crate::project::Node;
use crate::templates::escape_py_string;

use super::{GenerationContext, NodeGenerator, emit_node_body};

pub struct ConditionGenerator;

impl NodeGenerator for ConditionGenerator {
    fn capability(&self) -> &'static str {
        "condition"
    }

    fn generate(
        &self,
        node: &Node,
        ctx: &GenerationContext,
        graph: &TransitionGraph,
        indent: &str,
    ) -> String {
        let mut visited = AHashSet::new();
        visited.insert(node.id.clone());
        emit_body(node, ctx, graph, indent, &mut visited)
    }
}

pub(super) fn emit_body(
    node: &Node,
    ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
    visited: &mut AHashSet<String>,
) -> String {
    let mut out = String::new();
    let variable = escape_py_string(node.data.condition_variable.as_deref().unwrap_or(""));
    let expected = escape_py_string(node.data.condition_value.as_deref().unwrap_or(""));

    let _ = writeln!(
        out,
        "{indent}value = user_variables(user_id).get(\"{variable}\")"
    );
    let _ = writeln!(out, "{indent}if isinstance(value, dict):");
    let _ = writeln!(out, "{indent}    value = value.get(\"value\")");
    let _ = writeln!(out, "{indent}if str(value) == \"{expected}\":");

    let true_branch = emit_branch(
        node.data.true_target_node_id.as_deref(),
        node,
        ctx,
        graph,
        &format!("{indent}    "),
        visited,
    );
    out.push_str(&true_branch);
    let _ = writeln!(out, "{indent}else:");
    let false_branch = emit_branch(
        node.data.false_target_node_id.as_deref(),
        node,
        ctx,
        graph,
        &format!("{indent}    "),
        visited,
    );
    out.push_str(&false_branch);
    out
}

fn emit_branch(
    target: Option<&str>,
    node: &Node,
    ctx: &GenerationContext,
    graph: &TransitionGraph,
    indent: &str,
    visited: &AHashSet<String>,
) -> String {
    let mut out = String::new();
    match target.and_then(|id| graph.node(id)) {
        Some(next) => {
            // Branches are alternative paths: each gets its own copy of the
            // visited set.
            let mut branch_visited = visited.clone();
            if !branch_visited.insert(next.id.clone()) {
                warn!(
                    node = node.id.as_str(),
                    target = next.id.as_str(),
                    "condition branch cycle detected, emission stopped"
                );
                let _ = writeln!(
                    out,
                    "{indent}pass  # branch to '{}' skipped: cycle on this path",
                    next.id
                );
                return out;
            }
            out.push_str(&emit_node_body(
                next,
                ctx,
                graph,
                indent,
                &mut branch_visited,
                true,
            ));
        }
        None => {
            if let Some(id) = target {
                warn!(
                    node = node.id.as_str(),
                    target = id,
                    "condition branch target not found"
                );
            }
            let _ = writeln!(out, "{indent}pass");
        }
    }
    out
}
