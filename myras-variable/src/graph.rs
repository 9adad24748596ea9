use std::{collections::HashMap, hash::Hash};

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction,
};

/// Directed connection `from -> to` between two node handles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: NodeIndex,
    pub to: NodeIndex,
}

/// Keyed directed graph.
///
/// Nodes live in an arena and are addressed by integer handles; a side table maps every key to
/// the handle of its node, so lookups never scan the node list.
pub struct Graph<K, N> {
    graph: DiGraph<N, ()>,
    handles: HashMap<K, NodeIndex>,
}

impl<K, N> Graph<K, N>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            handles: HashMap::new(),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.handles.contains_key(key)
    }

    /// Returns the handle of the node stored under `key`.
    pub fn handle(&self, key: &K) -> Option<NodeIndex> {
        self.handles.get(key).copied()
    }

    /// Inserts `node` under `key`.
    ///
    /// Returns `None`, leaving the graph untouched, if the key is already present.
    pub fn add_node(&mut self, key: K, node: N) -> Option<NodeIndex> {
        if self.handles.contains_key(&key) {
            return None;
        }

        let handle = self.graph.add_node(node);
        self.handles.insert(key, handle);
        Some(handle)
    }

    /// Returns the handle stored under `key`, inserting the node built by `node` if absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, node: F) -> NodeIndex
    where
        F: FnOnce() -> N,
    {
        match self.handles.get(&key) {
            Some(&handle) => handle,
            None => {
                let handle = self.graph.add_node(node());
                self.handles.insert(key, handle);
                handle
            }
        }
    }

    pub fn node(&self, handle: NodeIndex) -> Option<&N> {
        self.graph.node_weight(handle)
    }

    pub fn node_mut(&mut self, handle: NodeIndex) -> Option<&mut N> {
        self.graph.node_weight_mut(handle)
    }

    /// Iterates over every node together with its handle.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &N)> {
        self.graph
            .node_indices()
            .filter_map(move |handle| self.graph.node_weight(handle).map(|node| (handle, node)))
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Edge {
        self.graph.add_edge(from, to, ());
        Edge { from, to }
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().map(|edge| Edge {
            from: edge.source(),
            to: edge.target(),
        })
    }

    /// Handles of the nodes with an edge into `handle`, one per edge.
    pub fn predecessors(&self, handle: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(handle, Direction::Incoming)
    }

    /// Handles of the nodes `handle` has an edge into, one per edge.
    pub fn successors(&self, handle: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(handle, Direction::Outgoing)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.handles.clear();
    }

    pub(crate) fn inner(&self) -> &DiGraph<N, ()> {
        &self.graph
    }
}

impl<K, N> Default for Graph<K, N>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyed_insertion() {
        let mut graph: Graph<&str, u32> = Graph::new();

        let a = graph.add_node("a", 1).unwrap();
        assert!(graph.add_node("a", 2).is_none());
        assert_eq!(graph.node(a), Some(&1));

        let b = graph.get_or_insert_with("b", || 3);
        assert_eq!(graph.get_or_insert_with("b", || 4), b);
        assert_eq!(graph.node(b), Some(&3));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn adjacency() {
        let mut graph: Graph<u8, ()> = Graph::new();
        let a = graph.get_or_insert_with(0, || ());
        let b = graph.get_or_insert_with(1, || ());
        let c = graph.get_or_insert_with(2, || ());

        graph.add_edge(a, c);
        graph.add_edge(b, c);
        graph.add_edge(b, c);

        let mut predecessors: Vec<_> = graph.predecessors(c).collect();
        predecessors.sort();
        assert_eq!(predecessors, vec![a, b, b]);
        assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![c]);
        assert!(graph.edges().any(|edge| edge == Edge { from: a, to: c }));

        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains(&0));
    }
}
