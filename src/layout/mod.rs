// Hierarchical top-down layout of a lineage forest.
//
// Layered drawing: a node's row is its depth, and its horizontal slot is
// carved out of its parent's span in proportion to subtree leaf count. A
// subtree therefore occupies one contiguous band of columns, siblings never
// overlap, and every child sits strictly below its parent.
//
// Everything here is a pure function of the forest structure, so an unchanged
// snapshot always re-renders to the same coordinates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lineage::{Forest, NodeId};
use crate::scoring::mutation::{EdgeColor, MutationTier};

/// Fixed node geometry, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Space between horizontally adjacent nodes.
    pub horizontal_gap: f64,
    /// Space between rows.
    pub vertical_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 300.0,
            node_height: 150.0,
            horizontal_gap: 50.0,
            vertical_gap: 50.0,
        }
    }
}

impl LayoutConfig {
    fn slot_width(&self) -> f64 {
        self.node_width + self.horizontal_gap
    }

    fn row_height(&self) -> f64 {
        self.node_height + self.vertical_gap
    }
}

/// A post placed on the canvas. `x`/`y` are the node's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub rank: usize,
    pub tier: MutationTier,
    pub border_color: String,
}

/// Directed parent -> child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub color: EdgeColor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Nodes in depth-first order.
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl LayoutResult {
    pub fn node(&self, post_id: &str) -> Option<&PositionedNode> {
        self.by_id.get(post_id).map(|&i| &self.nodes[i])
    }

    /// `(x, y)` for a post id.
    pub fn position(&self, post_id: &str) -> Option<(f64, f64)> {
        self.node(post_id).map(|n| (n.x, n.y))
    }

    pub fn edge_to(&self, post_id: &str) -> Option<&LayoutEdge> {
        self.edges.iter().find(|e| e.target == post_id)
    }
}

/// Lay out every tree of `forest`, roots side by side in forest order.
pub fn layout(forest: &Forest, config: &LayoutConfig) -> LayoutResult {
    let order: Vec<(NodeId, usize)> = forest.preorder().collect();

    // Leaf counts, children before parents (reverse pre-order)
    let mut leaves = vec![0usize; forest.len()];
    for &(id, _) in order.iter().rev() {
        let children = forest.children(id);
        leaves[id.0] = if children.is_empty() {
            1
        } else {
            children.iter().map(|c| leaves[c.0]).sum()
        };
    }

    let slot = config.slot_width();
    let row = config.row_height();

    // Left edge of each node's band, in slots. Parents are assigned before
    // their children in pre-order, so the band is known when we reach a node.
    let mut band_start = vec![0usize; forest.len()];
    let mut next_root_slot = 0;
    for &root in forest.roots() {
        band_start[root.0] = next_root_slot;
        next_root_slot += leaves[root.0];
    }

    let mut result = LayoutResult::default();
    let mut max_rank = 0;

    for &(id, rank) in &order {
        let mut cursor = band_start[id.0];
        for &child in forest.children(id) {
            band_start[child.0] = cursor;
            cursor += leaves[child.0];
        }

        let span = leaves[id.0] as f64 * slot;
        let x = band_start[id.0] as f64 * slot + (span - slot) / 2.0;
        let y = rank as f64 * row;
        max_rank = max_rank.max(rank);

        let node = forest.node(id);
        let tier = node.post.mutation_tier();

        if let Some(parent) = node.parent {
            result.edges.push(LayoutEdge {
                source: forest.node(parent).post.id.clone(),
                target: node.post.id.clone(),
                // Reposts that arrive without a score draw with the verified stroke
                color: tier.edge_color().unwrap_or(EdgeColor::Tier1),
            });
        }

        result.by_id.insert(node.post.id.clone(), result.nodes.len());
        result.nodes.push(PositionedNode {
            id: node.post.id.clone(),
            x,
            y,
            rank,
            tier,
            border_color: tier.border_color().to_string(),
        });
    }

    if !result.nodes.is_empty() {
        result.width = next_root_slot as f64 * slot - config.horizontal_gap;
        result.height = (max_rank + 1) as f64 * row - config.vertical_gap;
    }

    debug!(
        nodes = result.nodes.len(),
        edges = result.edges.len(),
        width = result.width,
        height = result.height,
        "Computed lineage layout"
    );
    result
}
