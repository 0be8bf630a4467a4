// Level assignment for the flow layout.
//
// Builds in-degree counts and an ordered adjacency list from the edge list,
// then runs one breadth-first pass seeded with every root at level 0.
//
// - Roots are the nodes with in-degree zero, in insertion order. When there
//   are none (every node sits on a cycle) every node is a root.
// - A node's level is fixed the first time it leaves the queue; it is never
//   revisited, even if a later path would give a different depth.
// - Nodes the traversal never reaches get level 0.

use std::collections::VecDeque;

use crate::parser::{FlowGraph, NodeId};

/// In-degree and outgoing targets per node, indexed by `NodeId`.
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub in_degree: Vec<usize>,
    /// Targets in edge order; duplicates kept.
    pub outgoing: Vec<Vec<NodeId>>,
}

impl Adjacency {
    pub fn from_graph(graph: &FlowGraph) -> Self {
        let n = graph.len();
        let mut in_degree = vec![0usize; n];
        let mut outgoing: Vec<Vec<NodeId>> = vec![Vec::new(); n];

        for edge in graph.edges() {
            in_degree[edge.to.0] += 1;
            outgoing[edge.from.0].push(edge.to);
        }

        Self { in_degree, outgoing }
    }

    pub fn roots(&self) -> Vec<NodeId> {
        let roots: Vec<NodeId> = self
            .in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| NodeId(i))
            .collect();

        if roots.is_empty() {
            (0..self.in_degree.len()).map(NodeId).collect()
        } else {
            roots
        }
    }

    pub fn targets(&self, nid: NodeId) -> &[NodeId] {
        &self.outgoing[nid.0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAssignment {
    levels: Vec<usize>,
    /// Nodes in the order their level was fixed.
    order: Vec<NodeId>,
}

impl LevelAssignment {
    pub fn level(&self, nid: NodeId) -> usize {
        self.levels[nid.0]
    }

    /// Level of a node by its source identifier.
    pub fn level_of(&self, graph: &FlowGraph, id: &str) -> Option<usize> {
        graph.lookup(id).map(|nid| self.levels[nid.0])
    }

    pub fn max_level(&self) -> usize {
        self.levels.iter().copied().max().unwrap_or(0)
    }

    pub fn settle_order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Nodes grouped by level, each group in settle order.
    pub fn by_level(&self) -> Vec<Vec<NodeId>> {
        let mut groups: Vec<Vec<NodeId>> = vec![Vec::new(); self.max_level() + 1];
        for &nid in &self.order {
            groups[self.levels[nid.0]].push(nid);
        }
        groups
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.levels.iter().enumerate().map(|(i, &l)| (NodeId(i), l))
    }
}

pub fn compute_levels(graph: &FlowGraph) -> LevelAssignment {
    let n = graph.len();
    let adjacency = Adjacency::from_graph(graph);

    let mut settled: Vec<Option<usize>> = vec![None; n];
    let mut order: Vec<NodeId> = Vec::with_capacity(n);
    let mut queue: VecDeque<(NodeId, usize)> =
        adjacency.roots().into_iter().map(|r| (r, 0)).collect();

    while let Some((nid, level)) = queue.pop_front() {
        if settled[nid.0].is_some() {
            continue;
        }
        settled[nid.0] = Some(level);
        order.push(nid);

        for &child in adjacency.targets(nid) {
            if settled[child.0].is_none() {
                queue.push_back((child, level + 1));
            }
        }
    }

    // Unreached nodes (only possible when some roots exist but a cycle hangs
    // off nothing) default to level 0.
    for (i, slot) in settled.iter_mut().enumerate() {
        if slot.is_none() {
            *slot = Some(0);
            order.push(NodeId(i));
        }
    }

    let levels: Vec<usize> = settled.into_iter().map(|l| l.unwrap_or(0)).collect();
    tracing::trace!(max_level = levels.iter().max().copied().unwrap_or(0), "levels assigned");

    LevelAssignment { levels, order }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_of(graph: &FlowGraph, la: &LevelAssignment) -> Vec<(String, usize)> {
        graph
            .nodes()
            .iter()
            .map(|n| (n.id.0.clone(), la.level(n.nid)))
            .collect()
    }

    #[test]
    fn test_adjacency_counts() {
        let graph: FlowGraph = [("A", "B"), ("A", "B"), ("B", "C")].into_iter().collect();
        let adj = Adjacency::from_graph(&graph);
        assert_eq!(adj.in_degree, vec![0, 2, 1]);
        assert_eq!(adj.targets(NodeId(0)), &[NodeId(1), NodeId(1)]);
        assert_eq!(adj.roots(), vec![NodeId(0)]);
    }

    #[test]
    fn test_chain_levels() {
        let graph: FlowGraph = [("A", "B"), ("B", "C")].into_iter().collect();
        let la = compute_levels(&graph);
        assert_eq!(la.level_of(&graph, "A"), Some(0));
        assert_eq!(la.level_of(&graph, "B"), Some(1));
        assert_eq!(la.level_of(&graph, "C"), Some(2));
        assert_eq!(la.max_level(), 2);
    }

    #[test]
    fn test_cycle_uses_all_roots() {
        let graph: FlowGraph = [("A", "B"), ("B", "C"), ("C", "A")].into_iter().collect();
        let la = compute_levels(&graph);
        assert_eq!(la.len(), 3);
        assert_eq!(la.max_level(), 0);
        assert_eq!(la.settle_order(), &[NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_first_settled_wins() {
        // D is reachable at depth 1 from R2 and depth 2 from R1 -> B.
        let graph: FlowGraph = [("R1", "B"), ("B", "D"), ("R2", "D")].into_iter().collect();
        let la = compute_levels(&graph);
        assert_eq!(
            levels_of(&graph, &la),
            vec![
                ("R1".to_string(), 0),
                ("B".to_string(), 1),
                ("D".to_string(), 1),
                ("R2".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_unreachable_cycle_defaults_to_zero() {
        // X <-> Y has no root of its own; A is the only zero in-degree node.
        let graph: FlowGraph = [("A", "B"), ("X", "Y"), ("Y", "X")].into_iter().collect();
        let la = compute_levels(&graph);
        assert_eq!(la.level_of(&graph, "X"), Some(0));
        assert_eq!(la.level_of(&graph, "Y"), Some(0));
        assert_eq!(la.level_of(&graph, "B"), Some(1));
        // Settle order: BFS first, stragglers after in insertion order.
        let order: Vec<&str> = la
            .settle_order()
            .iter()
            .map(|&nid| graph.node(nid).id.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "X", "Y"]);
    }

    #[test]
    fn test_self_loop_and_isolated() {
        let mut graph: FlowGraph = [("A", "A"), ("B", "C")].into_iter().collect();
        graph.register_node("Lone", None, None);
        let la = compute_levels(&graph);
        // A's only incoming edge is its own loop, so it is never a root.
        assert_eq!(la.level_of(&graph, "A"), Some(0));
        assert_eq!(la.level_of(&graph, "C"), Some(1));
        assert_eq!(la.level_of(&graph, "Lone"), Some(0));
    }

    #[test]
    fn test_by_level_groups() {
        let graph: FlowGraph = [("A", "B"), ("A", "C"), ("B", "D")].into_iter().collect();
        let la = compute_levels(&graph);
        let groups = la.by_level();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec![NodeId(0)]);
        assert_eq!(groups[1], vec![NodeId(1), NodeId(2)]);
        assert_eq!(groups[2], vec![NodeId(3)]);
    }
}
