//! Hilbert-curve layout.
//!
//! Node `i` (insertion order) takes cell `i` along a Hilbert curve over the
//! smallest power-of-two grid that holds every node, and the grid is scaled
//! onto the canvas. Successive nodes land in neighbouring cells; edges are
//! not consulted.

use std::collections::HashMap;

use crate::layout::{LayoutConfig, LayoutError, LayoutResult, LayoutStrategy, PointF};
use crate::parser::{FlowGraph, NodeId};

/// Hilbert layout implementation.
pub struct HilbertLayout;

impl LayoutStrategy for HilbertLayout {
    fn layout(&self, graph: &FlowGraph, cfg: &LayoutConfig) -> Result<LayoutResult, LayoutError> {
        Ok(layout_hilbert(graph, cfg))
    }
}

/// Smallest power of two `s` with `s * s >= count` (1 for zero or one node).
pub fn grid_order(count: usize) -> usize {
    let mut s = 1usize;
    while s * s < count {
        s *= 2;
    }
    s
}

/// Curve distance `d` -> cell `(x, y)` on an `n` x `n` grid (`n` a power of two).
pub fn d2xy(n: usize, mut d: usize) -> (usize, usize) {
    let (mut x, mut y) = (0usize, 0usize);
    let mut s = 1usize;
    while s < n {
        let rx = 1 & (d / 2);
        let ry = 1 & (d ^ rx);
        (x, y) = rotate(s, x, y, rx, ry);
        x += s * rx;
        y += s * ry;
        d /= 4;
        s *= 2;
    }
    (x, y)
}

/// Quadrant transform; applied on every step so the curve stays continuous.
fn rotate(size: usize, x: usize, y: usize, rx: usize, ry: usize) -> (usize, usize) {
    if ry != 0 {
        return (x, y);
    }
    let (x, y) = if rx == 1 { (size - 1 - x, size - 1 - y) } else { (x, y) };
    (y, x)
}

/// Place nodes along the curve. No nodes -> no positions.
pub fn layout_hilbert(graph: &FlowGraph, cfg: &LayoutConfig) -> LayoutResult {
    let count = graph.len();
    if count == 0 {
        return LayoutResult::default();
    }

    let n = grid_order(count);
    let usable_w = cfg.usable_width() - cfg.node_size.w;
    let usable_h = cfg.usable_height() - cfg.node_size.h;

    let node_pos: HashMap<NodeId, PointF> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let (hx, hy) = d2xy(n, i);
            let x = cfg.margin + cfg.node_size.w / 2.0 + (hx as f64 / n as f64) * usable_w;
            let y = cfg.margin + cfg.node_size.h / 2.0 + (hy as f64 / n as f64) * usable_h;
            (node.nid, PointF { x, y })
        })
        .collect();

    tracing::debug!(grid = n, nodes = count, "hilbert layout done");
    LayoutResult::from_positions(cfg, node_pos, HashMap::new())
}
