// Canvas layout for flow graphs.
//
// Two independent engines, selected by `LayoutConfig::algorithm`:
// - flow: breadth-first levels, each level spread evenly across the width
// - hilbert: nodes walk a Hilbert curve in insertion order
//
// Goals:
// - Deterministic: same graph + config => same positions
// - Total: every node gets exactly one position
// - Pure: no shared state, config is passed in explicitly
//
// Submodules:
// - levels: in-degree/adjacency + multi-source BFS leveling
// - connectors: connection points along node box sides
// - algorithms: the two engines behind `LayoutStrategy`
//
// Coordinates:
// - Page style: origin at the bottom-left corner, y grows upward.
//
// Output:
// - LayoutResult with node centers, node boxes and (flow only) levels.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parser::{FlowGraph, NodeId};

pub mod algorithms;
pub mod connectors;
pub mod levels;

pub use algorithms::{FlowLayout, HilbertLayout, layout_flow, layout_hilbert};
pub use connectors::{ConnectionPoint, Side, connection_points};
pub use levels::{LevelAssignment, compute_levels};

/// Connection point counts accepted per side pair.
pub const CONNECTION_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeF {
    pub w: f64,
    pub h: f64,
}

/// Axis-aligned box; (x, y) is the minimum corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectF {
    pub fn centered(center: PointF, size: SizeF) -> Self {
        Self {
            x: center.x - size.w / 2.0,
            y: center.y - size.h / 2.0,
            w: size.w,
            h: size.h,
        }
    }

    pub fn right(&self) -> f64 { self.x + self.w }
    pub fn top(&self) -> f64 { self.y + self.h }

    pub fn center(&self) -> PointF {
        PointF { x: self.x + self.w / 2.0, y: self.y + self.h / 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'; expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    #[default]
    Flow,
    Hilbert,
}

impl FromStr for LayoutAlgorithm {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flow" => Ok(Self::Flow),
            "hilbert" => Ok(Self::Hilbert),
            _ => Err(UnknownVariant {
                kind: "layout algorithm",
                value: s.to_string(),
                expected: "flow, hilbert",
            }),
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flow => "flow",
            Self::Hilbert => "hilbert",
        })
    }
}

/// Where level 0 goes in the flow layout.
///
/// Canvas coordinates are page coordinates: the origin is the bottom-left
/// corner and y grows upward.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankDirection {
    /// Level 0 at `y = margin` (bottom), deepest level at `y = h - margin` (top).
    #[default]
    BottomUp,
    /// Level 0 at `y = h - margin` (top), deepest level at `y = margin` (bottom).
    TopDown,
}

impl FromStr for RankDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom-up" | "bottomup" | "bt" => Ok(Self::BottomUp),
            "top-down" | "topdown" | "tb" | "td" => Ok(Self::TopDown),
            _ => Err(UnknownVariant {
                kind: "rank direction",
                value: s.to_string(),
                expected: "bottom-up, top-down",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Which engine places the nodes.
    pub algorithm: LayoutAlgorithm,
    /// Canvas size (A4 landscape in inches by default).
    pub canvas: SizeF,
    /// Margin kept free on every side.
    pub margin: f64,
    /// Box size of every node.
    pub node_size: SizeF,
    pub rank_direction: RankDirection,
    /// Connection points per side on the top and bottom edges.
    pub horizontal_connections: u32,
    /// Connection points per side on the left and right edges.
    pub vertical_connections: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::Flow,
            canvas: SizeF { w: 11.69, h: 8.27 },
            margin: 0.5,
            node_size: SizeF { w: 1.5, h: 0.75 },
            rank_direction: RankDirection::BottomUp,
            horizontal_connections: 5,
            vertical_connections: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("canvas size must be positive, got {w} x {h}")]
    Canvas { w: f64, h: f64 },
    #[error("node size must be positive, got {w} x {h}")]
    NodeSize { w: f64, h: f64 },
    #[error("margin must be a non-negative number, got {0}")]
    Margin(f64),
    #[error("margins and node size leave no usable canvas area")]
    NoUsableArea,
    #[error("{which} connection points must be between 1 and 20, got {value}")]
    Connections { which: &'static str, value: u32 },
    #[error("invalid layout config: {0}")]
    Json(#[from] serde_json::Error),
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl LayoutConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: LayoutConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let SizeF { w, h } = self.canvas;
        if !positive(w) || !positive(h) {
            return Err(ConfigError::Canvas { w, h });
        }
        let SizeF { w: nw, h: nh } = self.node_size;
        if !positive(nw) || !positive(nh) {
            return Err(ConfigError::NodeSize { w: nw, h: nh });
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigError::Margin(self.margin));
        }
        if self.usable_width() < self.node_size.w || self.usable_height() < self.node_size.h {
            return Err(ConfigError::NoUsableArea);
        }
        for (which, value) in [
            ("horizontal", self.horizontal_connections),
            ("vertical", self.vertical_connections),
        ] {
            if !CONNECTION_RANGE.contains(&value) {
                return Err(ConfigError::Connections { which, value });
            }
        }
        Ok(())
    }

    /// Canvas width minus both margins.
    pub fn usable_width(&self) -> f64 {
        self.canvas.w - 2.0 * self.margin
    }

    /// Canvas height minus both margins.
    pub fn usable_height(&self) -> f64 {
        self.canvas.h - 2.0 * self.margin
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("cannot lay out a graph with no nodes")]
    EmptyGraph,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Node centers in canvas coordinates.
    pub node_pos: HashMap<NodeId, PointF>,
    /// Node boxes centered on `node_pos`.
    pub node_bounds: HashMap<NodeId, RectF>,
    /// BFS level per node; empty for engines that don't level.
    pub node_level: HashMap<NodeId, usize>,
}

impl LayoutResult {
    pub fn from_positions(
        cfg: &LayoutConfig,
        node_pos: HashMap<NodeId, PointF>,
        node_level: HashMap<NodeId, usize>,
    ) -> Self {
        let node_bounds = node_pos
            .iter()
            .map(|(&nid, &p)| (nid, RectF::centered(p, cfg.node_size)))
            .collect();
        Self { node_pos, node_bounds, node_level }
    }

    pub fn len(&self) -> usize {
        self.node_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Position of a node by its source identifier.
    pub fn position_of(&self, graph: &FlowGraph, id: &str) -> Option<PointF> {
        graph.lookup(id).and_then(|nid| self.node_pos.get(&nid).copied())
    }
}

/// A layout engine.
pub trait LayoutStrategy {
    fn layout(&self, graph: &FlowGraph, cfg: &LayoutConfig) -> Result<LayoutResult, LayoutError>;
}

/// Get the engine for an algorithm.
pub fn get_layout_strategy(algorithm: LayoutAlgorithm) -> &'static dyn LayoutStrategy {
    match algorithm {
        LayoutAlgorithm::Flow => &FlowLayout,
        LayoutAlgorithm::Hilbert => &HilbertLayout,
    }
}

/// Validate the config, reject empty graphs, then run the configured engine.
pub fn layout_graph(graph: &FlowGraph, cfg: &LayoutConfig) -> Result<LayoutResult, LayoutError> {
    cfg.validate()?;
    if graph.is_empty() {
        return Err(LayoutError::EmptyGraph);
    }

    tracing::debug!(
        algorithm = %cfg.algorithm,
        nodes = graph.len(),
        edges = graph.edges().len(),
        "laying out graph"
    );
    get_layout_strategy(cfg.algorithm).layout(graph, cfg)
}
