use ahash::AHashSet;
use tracing::warn;

use crate::graph::TransitionGraph;
use crate::project::{Node, NodeKind};

/// A maximal run of nodes linked purely by auto-transition, input-target or
/// first-goto-button edges. `members[0]` is the head. Chains are laid out
/// vertically as one unit so linear message sequences stay visually linear.
pub(super) struct Chain<'a> {
    pub members: Vec<&'a Node>,
}

/// Finds all chains of length two or more. A chain starts at a node that is
/// not itself the target of a chain edge, or at a `start` node; every member
/// is claimed by at most one chain, in input order.
pub(super) fn extract_chains<'a>(graph: &TransitionGraph<'a>) -> Vec<Chain<'a>> {
    let mut chain_targets: AHashSet<String> = AHashSet::new();
    for node in graph.nodes() {
        if let Some(next) = graph.chain_next(&node.id) {
            chain_targets.insert(next.id.clone());
        }
    }

    let mut claimed: AHashSet<String> = AHashSet::new();
    let mut chains = Vec::new();

    for node in graph.nodes() {
        let is_head = node.kind == NodeKind::Start || !chain_targets.contains(&node.id);
        if !is_head || claimed.contains(&node.id) {
            continue;
        }

        let mut members = vec![node];
        let mut seen: AHashSet<&str> = AHashSet::new();
        seen.insert(node.id.as_str());

        let mut current = node;
        while let Some(next) = graph.chain_next(&current.id) {
            if seen.contains(next.id.as_str()) {
                warn!(node = current.id.as_str(), "chain loops back on itself, truncated");
                break;
            }
            if claimed.contains(&next.id) {
                break;
            }
            seen.insert(next.id.as_str());
            members.push(next);
            current = next;
        }

        if members.len() >= 2 {
            for member in &members {
                claimed.insert(member.id.clone());
            }
            chains.push(Chain { members });
        }
    }

    chains
}
