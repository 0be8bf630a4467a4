//! Flowchart placement core.
//!
//! Reads the `graph` / `flowchart` subset of Mermaid, then positions every
//! node on a fixed canvas with one of two engines:
//!
//! - **flow**: breadth-first levels become ranks, nodes spread evenly per rank
//! - **hilbert**: nodes follow a Hilbert curve in declaration order
//!
//! ```
//! use flowplace_core::{LayoutConfig, parse_flowchart, layout_graph};
//!
//! let graph = parse_flowchart("graph TD\nA[Start] --> B[End]").unwrap();
//! let result = layout_graph(&graph, &LayoutConfig::default()).unwrap();
//! assert_eq!(result.len(), 2);
//! ```

pub mod error;
pub mod layout;
pub mod output;
pub mod parser;
mod wasm;

pub use error::{Error, Result};
pub use layout::{
    ConfigError, LayoutAlgorithm, LayoutConfig, LayoutError, LayoutResult, LayoutStrategy,
    LevelAssignment, PointF, RankDirection, RectF, SizeF, compute_levels, connection_points,
    layout_flow, layout_graph, layout_hilbert,
};
pub use output::{DiagramOutput, render_diagram, render_json};
pub use parser::{FlowGraph, Ident, NodeId, ParseError, parse_flowchart};
pub use wasm::{compile_diagram, compile_diagram_with_config, default_config};
