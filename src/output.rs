//! Output types for renderer consumption.
//!
//! These structs are serialized to JSON and handed to whatever draws the
//! shapes (the WASM front end or the CLI's caller).

use serde::Serialize;

use crate::error::Error;
use crate::layout::{
    ConnectionPoint, LayoutAlgorithm, LayoutConfig, LayoutResult, PointF, RectF, connection_points,
    layout_graph,
};
use crate::parser::{FlowGraph, parse_flowchart};

/// A placed node
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutput {
    pub id: String,
    pub label: String,
    /// Subgraph the node belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// BFS level (flow layout only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    pub center: PointF,
    pub bounds: RectF,
    pub connection_points: Vec<ConnectionPoint>,
}

/// An edge between two nodes
#[derive(Debug, Clone, Serialize)]
pub struct EdgeOutput {
    pub from: String,
    pub to: String,
}

/// Error information for editor markers
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>, // 1-based
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>, // 1-based
}

impl From<&Error> for ErrorInfo {
    fn from(err: &Error) -> Self {
        match err {
            Error::Parse(e) => ErrorInfo {
                message: e.msg.clone(),
                line: Some(e.line),
                column: Some(e.col),
            },
            other => ErrorInfo {
                message: other.to_string(),
                line: None,
                column: None,
            },
        }
    }
}

/// The combined output
#[derive(Debug, Clone, Serialize)]
pub struct DiagramOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutAlgorithm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl DiagramOutput {
    pub fn from_error(err: &Error) -> Self {
        Self {
            layout: None,
            nodes: vec![],
            edges: vec![],
            error: Some(ErrorInfo::from(err)),
        }
    }

    /// Assemble output for an already laid out graph, in node insertion order.
    pub fn from_layout(graph: &FlowGraph, result: &LayoutResult, cfg: &LayoutConfig) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .filter_map(|n| {
                let center = *result.node_pos.get(&n.nid)?;
                let bounds = result
                    .node_bounds
                    .get(&n.nid)
                    .copied()
                    .unwrap_or_else(|| RectF::centered(center, cfg.node_size));
                Some(NodeOutput {
                    id: n.id.0.clone(),
                    label: n.label.clone(),
                    group: n.group.clone(),
                    level: result.node_level.get(&n.nid).copied(),
                    center,
                    bounds,
                    connection_points: connection_points(
                        &bounds,
                        cfg.horizontal_connections,
                        cfg.vertical_connections,
                    ),
                })
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|e| EdgeOutput {
                from: graph.node(e.from).id.0.clone(),
                to: graph.node(e.to).id.0.clone(),
            })
            .collect();

        Self {
            layout: Some(cfg.algorithm),
            nodes,
            edges,
            error: None,
        }
    }
}

/// Parse, lay out and assemble the output for a flowchart source.
pub fn render_diagram(input: &str, cfg: &LayoutConfig) -> Result<DiagramOutput, Error> {
    let graph = parse_flowchart(input)?;
    let result = layout_graph(&graph, cfg)?;
    Ok(DiagramOutput::from_layout(&graph, &result, cfg))
}

/// Like `render_diagram`, but always returns JSON; failures become an
/// `error` object.
pub fn render_json(input: &str, cfg: &LayoutConfig) -> String {
    let output = match render_diagram(input, cfg) {
        Ok(output) => output,
        Err(e) => DiagramOutput::from_error(&e),
    };
    to_json(&output)
}

pub(crate) fn to_json(output: &DiagramOutput) -> String {
    serde_json::to_string(output).unwrap_or_else(|e| {
        serde_json::json!({ "error": { "message": e.to_string() } }).to_string()
    })
}
