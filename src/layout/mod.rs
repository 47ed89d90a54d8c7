//! Hierarchical graph layout.
//!
//! Consumes the node/connection graph and produces 2D coordinates for
//! display: root selection, max-of-parents level assignment, vertical
//! auto-transition chains, cumulative top-down placement, multi-parent
//! centering and a final collision pass. Deterministic for a fixed input,
//! and never fails: cycles and orphans degrade with a logged warning.

use ahash::AHashMap;

use crate::graph::TransitionGraph;
use crate::project::{Connection, Node, Position};

mod chains;
mod levels;
mod presets;

use chains::extract_chains;
use levels::{assign_levels, group_by_level};

const DEFAULT_NODE_WIDTH: f64 = 320.0;
const DEFAULT_NODE_HEIGHT: f64 = 160.0;
const MARGIN: f64 = 100.0;

const DESKTOP_HORIZONTAL_SPACING: f64 = 150.0;
const DESKTOP_VERTICAL_SPACING: f64 = 80.0;
const MOBILE_HORIZONTAL_SPACING: f64 = 60.0;
const MOBILE_VERTICAL_SPACING: f64 = 40.0;

/// Measured on-screen size of one node. When supplied, real sizes override
/// the fixed defaults in every piece of spacing math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

impl Default for NodeSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// Mobile canvases use tighter spacing constants; the algorithm is
    /// identical.
    pub mobile: bool,
    /// Real measured node sizes keyed by node id.
    pub sizes: AHashMap<String, NodeSize>,
    /// Named template with a hand-authored coordinate table; when it matches
    /// a known preset the generic algorithm is bypassed entirely.
    pub template: Option<String>,
}

impl LayoutOptions {
    pub fn mobile() -> Self {
        Self {
            mobile: true,
            ..Self::default()
        }
    }

    /// The minimum vertical gap between stacked nodes for these options.
    pub fn vertical_spacing(&self) -> f64 {
        if self.mobile {
            MOBILE_VERTICAL_SPACING
        } else {
            DESKTOP_VERTICAL_SPACING
        }
    }

    /// The horizontal gap between level columns for these options.
    pub fn horizontal_spacing(&self) -> f64 {
        if self.mobile {
            MOBILE_HORIZONTAL_SPACING
        } else {
            DESKTOP_HORIZONTAL_SPACING
        }
    }

    fn size_of(&self, id: &str) -> NodeSize {
        self.sizes.get(id).copied().unwrap_or_default()
    }
}

/// The hierarchical level of each node, exactly as `layout` assigns them.
/// Empty for an empty graph.
pub fn compute_levels(
    nodes: &[Node],
    connections: &[Connection],
) -> AHashMap<String, usize> {
    if nodes.is_empty() {
        return AHashMap::new();
    }
    let graph = TransitionGraph::new(nodes, connections);
    match graph.find_root() {
        Some(root) => assign_levels(&graph, &root.id),
        None => AHashMap::new(),
    }
}

/// Lays out the graph and returns the nodes with `position` replaced.
/// `data`, `kind` and `id` are never touched, and no layout bookkeeping
/// leaks into the returned nodes.
pub fn layout(nodes: &[Node], connections: &[Connection], options: &LayoutOptions) -> Vec<Node> {
    if nodes.is_empty() {
        return Vec::new();
    }

    if let Some(table) = options
        .template
        .as_deref()
        .and_then(presets::preset_positions)
    {
        return apply_preset(nodes, table);
    }

    let graph = TransitionGraph::new(nodes, connections);
    let root = match graph.find_root() {
        Some(root) => root,
        None => return linear_grid(nodes, options),
    };

    let levels = assign_levels(&graph, &root.id);
    let groups = group_by_level(nodes, &levels);
    let chains = extract_chains(&graph);

    // Chain tails are stacked under their head and excluded from the level
    // sweep and from parent centering.
    let mut tail_of_chain: AHashMap<&str, usize> = AHashMap::new();
    for (i, chain) in chains.iter().enumerate() {
        for member in &chain.members[1..] {
            tail_of_chain.insert(member.id.as_str(), i);
        }
    }

    let mut positions: AHashMap<String, Position> = AHashMap::new();

    // X offset per level: cumulative max node width of all previous levels
    // plus fixed horizontal spacing.
    let h_spacing = options.horizontal_spacing();
    let v_spacing = options.vertical_spacing();
    let level_padding = v_spacing / 2.0;

    let mut column_x = Vec::with_capacity(groups.len());
    let mut x = MARGIN;
    for group in &groups {
        column_x.push(x);
        let max_width = group
            .iter()
            .filter(|n| !tail_of_chain.contains_key(n.id.as_str()))
            .map(|n| options.size_of(&n.id).width)
            .fold(DEFAULT_NODE_WIDTH, f64::max);
        x += max_width + h_spacing;
    }

    // Single top-down sweep: Y accumulates across levels so every level
    // starts below the previous one.
    let mut y = MARGIN;
    for (level, group) in groups.iter().enumerate() {
        for node in group {
            if tail_of_chain.contains_key(node.id.as_str()) {
                continue;
            }
            positions.insert(
                node.id.clone(),
                Position {
                    x: column_x[level],
                    y,
                },
            );
            y += options.size_of(&node.id).height + v_spacing;
        }
        y += level_padding;
    }

    // Stack each chain vertically at the head's X column using real node
    // heights.
    for chain in &chains {
        let head = chain.members[0];
        let Some(head_pos) = positions.get(&head.id).copied() else {
            continue;
        };
        let mut prev = head;
        let mut prev_y = head_pos.y;
        for member in &chain.members[1..] {
            let member_y = prev_y + options.size_of(&prev.id).height + v_spacing;
            positions.insert(
                member.id.clone(),
                Position {
                    x: head_pos.x,
                    y: member_y,
                },
            );
            prev = member;
            prev_y = member_y;
        }
    }

    // Multi-parent centering: a node with several parents sits at the
    // average of its parents' center Y minus half its own height.
    for node in nodes {
        if tail_of_chain.contains_key(node.id.as_str()) {
            continue;
        }
        let parents = graph.parents(&node.id);
        if parents.len() < 2 {
            continue;
        }
        let centers: Vec<f64> = parents
            .iter()
            .filter_map(|pid| {
                positions
                    .get(*pid)
                    .map(|p| p.y + options.size_of(pid).height / 2.0)
            })
            .collect();
        if centers.len() < 2 {
            continue;
        }
        let average = centers.iter().sum::<f64>() / centers.len() as f64;
        if let Some(pos) = positions.get_mut(&node.id) {
            pos.y = average - options.size_of(&node.id).height / 2.0;
        }
    }

    resolve_collisions(nodes, &mut positions, options);

    nodes
        .iter()
        .map(|node| {
            let mut out = node.clone();
            if let Some(pos) = positions.get(&node.id) {
                out.position = *pos;
            }
            out
        })
        .collect()
}

/// Buckets placed nodes by X column and pushes any node whose top is closer
/// than the vertical spacing to the previous node's bottom downward until
/// the minimum gap holds.
fn resolve_collisions(
    nodes: &[Node],
    positions: &mut AHashMap<String, Position>,
    options: &LayoutOptions,
) {
    let v_spacing = options.vertical_spacing();

    let mut buckets: AHashMap<i64, Vec<&str>> = AHashMap::new();
    for node in nodes {
        if let Some(pos) = positions.get(&node.id) {
            buckets
                .entry(pos.x.round() as i64)
                .or_default()
                .push(node.id.as_str());
        }
    }

    let mut keys: Vec<i64> = buckets.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        let mut column = buckets.remove(&key).unwrap_or_default();
        column.sort_by(|a, b| {
            let ya = positions[*a].y;
            let yb = positions[*b].y;
            ya.partial_cmp(&yb).unwrap_or(std::cmp::Ordering::Equal)
        });
        for i in 1..column.len() {
            let prev = column[i - 1];
            let Some(prev_pos) = positions.get(prev).copied() else {
                continue;
            };
            let floor = prev_pos.y + options.size_of(prev).height + v_spacing;
            if let Some(current) = positions.get_mut(column[i]) {
                if current.y < floor {
                    current.y = floor;
                }
            }
        }
    }
}

/// Degraded but always-terminating fallback when no root can be identified:
/// a fixed 3-column grid in original node order.
fn linear_grid(nodes: &[Node], options: &LayoutOptions) -> Vec<Node> {
    let h_spacing = options.horizontal_spacing();
    let v_spacing = options.vertical_spacing();
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let mut out = node.clone();
            out.position = Position {
                x: MARGIN + (i % 3) as f64 * (DEFAULT_NODE_WIDTH + h_spacing),
                y: MARGIN + (i / 3) as f64 * (DEFAULT_NODE_HEIGHT + v_spacing),
            };
            out
        })
        .collect()
}

fn apply_preset(nodes: &[Node], table: &[(&str, f64, f64)]) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let mut out = node.clone();
            if let Some((_, x, y)) = table.iter().find(|(id, _, _)| *id == node.id) {
                out.position = Position { x: *x, y: *y };
            }
            out
        })
        .collect()
}
