//! Level-based flow layout.
//!
//! Nodes are leveled by breadth-first traversal (see `layout::levels`), each
//! level becomes one horizontal rank, and the nodes of a rank are spread with
//! equal gaps across the usable width.

use std::collections::HashMap;

use crate::layout::levels::compute_levels;
use crate::layout::{LayoutConfig, LayoutError, LayoutResult, LayoutStrategy, PointF, RankDirection};
use crate::parser::{FlowGraph, NodeId};

/// Flow layout implementation.
pub struct FlowLayout;

impl LayoutStrategy for FlowLayout {
    fn layout(&self, graph: &FlowGraph, cfg: &LayoutConfig) -> Result<LayoutResult, LayoutError> {
        layout_flow(graph, cfg)
    }
}

/// Place every node on the rank of its level.
pub fn layout_flow(graph: &FlowGraph, cfg: &LayoutConfig) -> Result<LayoutResult, LayoutError> {
    if graph.is_empty() {
        return Err(LayoutError::EmptyGraph);
    }

    let levels = compute_levels(graph);
    let max_level = levels.max_level();

    let mut node_pos: HashMap<NodeId, PointF> = HashMap::with_capacity(graph.len());
    let mut node_level: HashMap<NodeId, usize> = HashMap::with_capacity(graph.len());

    for (level, mut rank) in levels.by_level().into_iter().enumerate() {
        if rank.is_empty() {
            continue;
        }

        // Cluster by subgraph; stable, so settle order survives inside a cluster.
        rank.sort_by(|a, b| {
            let ga = graph.node(*a).group.as_deref().unwrap_or("");
            let gb = graph.node(*b).group.as_deref().unwrap_or("");
            ga.cmp(gb)
        });

        let y = rank_y(level, max_level, cfg);
        for (nid, x) in rank.iter().zip(spread_x(rank.len(), cfg)) {
            node_pos.insert(*nid, PointF { x, y });
            node_level.insert(*nid, level);
        }
    }

    tracing::debug!(ranks = max_level + 1, nodes = node_pos.len(), "flow layout done");
    Ok(LayoutResult::from_positions(cfg, node_pos, node_level))
}

/// Vertical position of a rank (y grows upward). A single rank sits on the
/// vertical midpoint.
pub fn rank_y(level: usize, max_level: usize, cfg: &LayoutConfig) -> f64 {
    if max_level == 0 {
        return cfg.canvas.h / 2.0;
    }
    let t = level as f64 / max_level as f64;
    match cfg.rank_direction {
        RankDirection::BottomUp => cfg.margin + t * cfg.usable_height(),
        RankDirection::TopDown => cfg.canvas.h - cfg.margin - t * cfg.usable_height(),
    }
}

/// `count` x-coordinates with equal gaps between neighbours and margins.
/// A single node sits on the horizontal midpoint.
pub fn spread_x(count: usize, cfg: &LayoutConfig) -> Vec<f64> {
    if count == 1 {
        return vec![cfg.canvas.w / 2.0];
    }
    let spacing = cfg.usable_width() / (count + 1) as f64;
    (1..=count).map(|i| cfg.margin + i as f64 * spacing).collect()
}
