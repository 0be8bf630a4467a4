use std::collections::HashMap;

use serde::Serialize;

/// Opaque node identifier as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Ident(pub String);

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident(s.to_string())
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dense index of a node, assigned in insertion order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Serialize)]
pub struct FlowNode {
    pub nid: NodeId,
    pub id: Ident,
    /// Display label; defaults to the identifier.
    pub label: String,
    /// Subgraph the node was first seen in.
    pub group: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Nodes in insertion order plus the ordered edge list.
///
/// Registration is insert-if-absent: a node keeps the first label and the
/// first group it was given. Edges are never deduplicated.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<Edge>,
    node_by_ident: HashMap<Ident, NodeId>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, or fill in its group if it had none yet.
    /// An empty or missing label falls back to the identifier.
    pub fn register_node(&mut self, id: &str, label: Option<&str>, group: Option<&str>) -> NodeId {
        let ident = Ident::from(id);
        if let Some(&nid) = self.node_by_ident.get(&ident) {
            let node = &mut self.nodes[nid.0];
            if node.group.is_none() {
                node.group = group.map(str::to_string);
            }
            return nid;
        }

        let label = match label {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => id.to_string(),
        };
        let nid = NodeId(self.nodes.len());
        self.nodes.push(FlowNode {
            nid,
            id: ident.clone(),
            label,
            group: group.map(str::to_string),
        });
        self.node_by_ident.insert(ident, nid);
        nid
    }

    /// Add a directed edge, implicitly registering unknown endpoints.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.register_node(from, None, None);
        let to = self.register_node(to, None, None);
        self.edges.push(Edge { from, to });
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, nid: NodeId) -> &FlowNode {
        &self.nodes[nid.0]
    }

    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.node_by_ident.get(&Ident::from(id)).copied()
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.lookup(id).map(|nid| self.nodes[nid.0].label.as_str())
    }

    pub fn group(&self, id: &str) -> Option<&str> {
        self.lookup(id).and_then(|nid| self.nodes[nid.0].group.as_deref())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FlowGraph {
    /// Build a graph straight from an edge list.
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut graph = FlowGraph::new();
        for (from, to) in iter {
            graph.add_edge(from, to);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_keeps_first_label() {
        let mut g = FlowGraph::new();
        g.register_node("A", Some("Start"), None);
        g.register_node("A", Some("Other"), None);
        assert_eq!(g.len(), 1);
        assert_eq!(g.label("A"), Some("Start"));
    }

    #[test]
    fn test_label_defaults_to_identifier() {
        let mut g = FlowGraph::new();
        g.register_node("A", None, None);
        g.register_node("B", Some(""), None);
        assert_eq!(g.label("A"), Some("A"));
        assert_eq!(g.label("B"), Some("B"));
    }

    #[test]
    fn test_group_filled_once() {
        let mut g = FlowGraph::new();
        g.register_node("A", None, None);
        g.register_node("A", None, Some("left"));
        g.register_node("A", None, Some("right"));
        assert_eq!(g.group("A"), Some("left"));
    }

    #[test]
    fn test_edges_register_endpoints_and_keep_duplicates() {
        let g: FlowGraph = [("A", "B"), ("A", "B"), ("C", "C")].into_iter().collect();
        assert_eq!(g.len(), 3);
        assert_eq!(g.edges().len(), 3);
        assert_eq!(g.lookup("C"), Some(NodeId(2)));
        assert_eq!(g.edges()[2], Edge { from: NodeId(2), to: NodeId(2) });
    }
}
