//! Property-based invariant tests for both layout engines.
//!
//! For any non-empty graph and any valid canvas:
//!
//! 1. Totality: one position per node, no extras
//! 2. Determinism: same input, same output
//! 3. Containment: positions stay inside the margins
//! 4. Even spacing: every flow rank has equal gaps, margins included
//! 5. Levels: in a DAG every edge target sits at most one level below its source
//! 6. Hilbert cells: distinct nodes never share a position

use std::collections::{HashMap, HashSet};

use flowplace_core::layout::algorithms::{d2xy, grid_order};
use flowplace_core::{
    FlowGraph, LayoutAlgorithm, LayoutConfig, NodeId, RankDirection, SizeF, compute_levels,
    layout_graph, parse_flowchart,
};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

// ── Helpers ─────────────────────────────────────────────────────────────

fn make_graph(node_count: usize, edges: &[(usize, usize)]) -> FlowGraph {
    let mut graph = FlowGraph::new();
    for i in 0..node_count {
        graph.register_node(&format!("N{i}"), None, None);
    }
    for &(from, to) in edges {
        if from < node_count && to < node_count {
            graph.add_edge(&format!("N{from}"), &format!("N{to}"));
        }
    }
    graph
}

fn arb_graph() -> impl Strategy<Value = FlowGraph> {
    (1usize..40).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..(n * 2)).prop_map(move |edges| make_graph(n, &edges))
    })
}

/// Edges only run from lower to higher index, so every node hangs off a root.
fn arb_dag() -> impl Strategy<Value = FlowGraph> {
    (1usize..40).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..(n * 2)).prop_map(move |edges| {
            let forward: Vec<(usize, usize)> = edges
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect();
            make_graph(n, &forward)
        })
    })
}

fn arb_config() -> impl Strategy<Value = LayoutConfig> {
    (
        prop_oneof![Just(LayoutAlgorithm::Flow), Just(LayoutAlgorithm::Hilbert)],
        prop_oneof![Just(RankDirection::BottomUp), Just(RankDirection::TopDown)],
        8.0f64..40.0,
        6.0f64..30.0,
        0.0f64..1.5,
    )
        .prop_map(|(algorithm, rank_direction, w, h, margin)| LayoutConfig {
            algorithm,
            rank_direction,
            canvas: SizeF { w, h },
            margin,
            node_size: SizeF { w: 1.5, h: 0.75 },
            ..LayoutConfig::default()
        })
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_node_gets_exactly_one_position(graph in arb_graph(), cfg in arb_config()) {
        let result = layout_graph(&graph, &cfg).unwrap();
        prop_assert_eq!(result.len(), graph.len());
        for node in graph.nodes() {
            prop_assert!(result.node_pos.contains_key(&node.nid));
            prop_assert!(result.node_bounds.contains_key(&node.nid));
        }
    }

    #[test]
    fn layout_is_deterministic(graph in arb_graph(), cfg in arb_config()) {
        let a = layout_graph(&graph, &cfg).unwrap();
        let b = layout_graph(&graph, &cfg).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn positions_stay_inside_margins(graph in arb_graph(), cfg in arb_config()) {
        let result = layout_graph(&graph, &cfg).unwrap();
        for p in result.node_pos.values() {
            prop_assert!(p.x >= cfg.margin - EPS && p.x <= cfg.canvas.w - cfg.margin + EPS);
            prop_assert!(p.y >= cfg.margin - EPS && p.y <= cfg.canvas.h - cfg.margin + EPS);
        }
    }

    #[test]
    fn flow_ranks_are_evenly_spaced(graph in arb_graph(), cfg in arb_config()) {
        let cfg = LayoutConfig { algorithm: LayoutAlgorithm::Flow, ..cfg };
        let result = layout_graph(&graph, &cfg).unwrap();

        let mut ranks: HashMap<usize, Vec<f64>> = HashMap::new();
        for (nid, level) in &result.node_level {
            ranks.entry(*level).or_default().push(result.node_pos[nid].x);
        }

        for xs in ranks.values_mut() {
            xs.sort_by(f64::total_cmp);
            if xs.len() < 2 {
                prop_assert!((xs[0] - cfg.canvas.w / 2.0).abs() < EPS);
                continue;
            }
            let gap = (cfg.canvas.w - 2.0 * cfg.margin) / (xs.len() + 1) as f64;
            prop_assert!((xs[0] - cfg.margin - gap).abs() < 1e-7);
            prop_assert!((cfg.canvas.w - cfg.margin - xs[xs.len() - 1] - gap).abs() < 1e-7);
            for w in xs.windows(2) {
                prop_assert!((w[1] - w[0] - gap).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn dag_levels_follow_edges(graph in arb_dag()) {
        let levels = compute_levels(&graph);
        prop_assert_eq!(levels.len(), graph.len());
        prop_assert_eq!(levels.settle_order().len(), graph.len());
        let settled: HashSet<NodeId> = levels.settle_order().iter().copied().collect();
        prop_assert_eq!(settled.len(), graph.len());
        for edge in graph.edges() {
            prop_assert!(levels.level(edge.to) >= 1);
            prop_assert!(levels.level(edge.to) <= levels.level(edge.from) + 1);
        }
    }

    #[test]
    fn hilbert_positions_are_distinct(graph in arb_graph(), cfg in arb_config()) {
        let cfg = LayoutConfig { algorithm: LayoutAlgorithm::Hilbert, ..cfg };
        let result = layout_graph(&graph, &cfg).unwrap();
        let n = grid_order(graph.len());
        let cells: HashSet<(usize, usize)> = (0..graph.len()).map(|d| d2xy(n, d)).collect();
        prop_assert_eq!(cells.len(), graph.len());
        prop_assert_eq!(result.node_pos.len(), graph.len());

        for (a, pa) in &result.node_pos {
            for (b, pb) in &result.node_pos {
                if a != b {
                    prop_assert!((pa.x - pb.x).abs() > EPS || (pa.y - pb.y).abs() > EPS);
                }
            }
        }
    }

    #[test]
    fn parser_never_panics(input in "[A-Za-z0-9_ \\[\\]&|.=>\\-\n%:\"']{0,200}") {
        let _ = parse_flowchart(&input);
    }
}

// ── Fixed cases ─────────────────────────────────────────────────────────

#[test]
fn hilbert_four_nodes_cover_the_two_by_two_grid() {
    let cells: HashSet<(usize, usize)> = (0..4).map(|d| d2xy(grid_order(4), d)).collect();
    let expected: HashSet<(usize, usize)> = [(0, 0), (0, 1), (1, 0), (1, 1)].into_iter().collect();
    assert_eq!(cells, expected);
}

#[test]
fn cycle_still_levels_every_node() {
    let graph = parse_flowchart("graph TD\nA --> B\nB --> C\nC --> A\n").unwrap();
    let levels = compute_levels(&graph);
    assert_eq!(levels.len(), 3);
    assert!(levels.iter().any(|(_, l)| l == 0));
    assert!(layout_graph(&graph, &LayoutConfig::default()).is_ok());
}

#[test]
fn single_node_sits_in_the_middle() {
    let graph = parse_flowchart("A[Only]").unwrap();
    let cfg = LayoutConfig::default();
    let result = layout_graph(&graph, &cfg).unwrap();
    let p = result.position_of(&graph, "A").unwrap();
    assert!((p.x - cfg.canvas.w / 2.0).abs() < EPS);
    assert!((p.y - cfg.canvas.h / 2.0).abs() < EPS);
}
