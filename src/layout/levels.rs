use ahash::{AHashMap, AHashSet};
use tracing::warn;

use crate::graph::TransitionGraph;
use crate::project::Node;

/// Assigns hierarchical levels starting from `root`: a node reachable via
/// multiple parents takes the level of its deepest parent plus one, so
/// diamonds render below all their sources. Nodes unreachable from the root
/// get levels by restarting the walk from each of them in input order, which
/// keeps the result total and deterministic.
pub(super) fn assign_levels(graph: &TransitionGraph, root: &str) -> AHashMap<String, usize> {
    let mut levels = AHashMap::new();
    walk(graph, root, 0, &AHashSet::new(), &mut levels);

    for node in graph.nodes() {
        if !levels.contains_key(&node.id) {
            walk(graph, &node.id, 0, &AHashSet::new(), &mut levels);
        }
    }
    levels
}

/// Depth-first level propagation. Re-entry at an equal-or-shallower level is
/// skipped; a strictly deeper level re-propagates. The path set is copied per
/// recursion step, never mutated in place, so sibling branches cannot see
/// each other's state.
fn walk(
    graph: &TransitionGraph,
    id: &str,
    level: usize,
    path: &AHashSet<String>,
    levels: &mut AHashMap<String, usize>,
) {
    if path.contains(id) {
        warn!(node = id, "cycle detected during level assignment, branch aborted");
        return;
    }
    if let Some(&existing) = levels.get(id) {
        if existing >= level {
            return;
        }
    }
    levels.insert(id.to_string(), level);

    let mut path = path.clone();
    path.insert(id.to_string());
    for edge in graph.outgoing(id) {
        if graph.contains(&edge.target) {
            walk(graph, &edge.target, level + 1, &path, levels);
        } else {
            warn!(
                node = id,
                target = edge.target.as_str(),
                "edge target not in graph, skipped"
            );
        }
    }
}

/// Buckets nodes into per-level groups, input order preserved within a level.
pub(super) fn group_by_level<'a>(
    nodes: &'a [Node],
    levels: &AHashMap<String, usize>,
) -> Vec<Vec<&'a Node>> {
    let max_level = levels.values().copied().max().unwrap_or(0);
    let mut groups: Vec<Vec<&Node>> = vec![Vec::new(); max_level + 1];
    for node in nodes {
        if let Some(&level) = levels.get(&node.id) {
            groups[level].push(node);
        }
    }
    groups
}
