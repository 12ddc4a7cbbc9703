//! Graph builder: accumulates deduplicated nodes and edges during a
//! crawl.
//!
//! Duplicate discoveries are never errors. A duplicate node is absorbed
//! into the stored node via [`GraphNode::merge_from`] and reported as
//! [`NodeInsert::Merged`]; a duplicate edge is simply not re-added and
//! reported as [`EdgeInsert::Duplicate`]. The outcomes are plain return
//! values so callers can assert on them directly.

use super::matrix::AdjacencyMatrixGraph;
use super::{GraphEdge, GraphNode};
use std::collections::{BTreeMap, HashSet};

/// Outcome of inserting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeInsert {
    /// No node with this identity existed; the node was inserted.
    Inserted,
    /// A node with this identity already existed and absorbed the
    /// incoming one.
    Merged,
}

/// Outcome of inserting an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    /// The edge was new and was inserted.
    Inserted,
    /// An equal edge already existed; nothing was added.
    Duplicate,
}

/// Combined outcome of [`GraphBuilder::add_child_connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInsert {
    pub parent: NodeInsert,
    pub child: NodeInsert,
    pub edge: EdgeInsert,
}

/// Accumulates a deduplicated node set and an edge set, then freezes
/// them into an [`AdjacencyMatrixGraph`].
///
/// One builder serves one crawl: it is mutated only by the crawling
/// task and consumed exactly once by [`GraphBuilder::build`].
#[derive(Debug)]
pub struct GraphBuilder<N: GraphNode, E: GraphEdge<Id = N::Id>> {
    nodes: BTreeMap<N::Id, N>,
    edges: HashSet<E>,
}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> Default for GraphBuilder<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> GraphBuilder<N, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: HashSet::new(),
        }
    }

    /// Insert a node, merging into the stored node when the identity is
    /// already known.
    ///
    /// Postcondition: exactly one node with this identity exists.
    pub fn add_node(&mut self, node: N) -> NodeInsert {
        match self.nodes.entry(node.id().clone()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(node);
                NodeInsert::Inserted
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                slot.get_mut().merge_from(node);
                NodeInsert::Merged
            }
        }
    }

    /// Look up the accumulated node for an identity.
    #[must_use]
    pub fn node(&self, id: &N::Id) -> Option<&N> {
        self.nodes.get(id)
    }

    /// Insert a directed parent→child edge, ensuring both endpoints are
    /// present first. Self-loops are stored without special casing.
    pub fn add_child_connection(&mut self, parent: N, child: N, edge: E) -> ConnectionInsert {
        let parent_outcome = self.add_node(parent);
        let child_outcome = self.add_node(child);

        let edge_outcome = if self.edges.insert(edge) {
            EdgeInsert::Inserted
        } else {
            EdgeInsert::Duplicate
        };

        ConnectionInsert {
            parent: parent_outcome,
            child: child_outcome,
            edge: edge_outcome,
        }
    }

    /// Number of distinct nodes accumulated so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges accumulated so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Freeze the accumulated sets into an immutable queryable graph.
    #[must_use]
    pub fn build(self) -> AdjacencyMatrixGraph<N, E> {
        AdjacencyMatrixGraph::new(self.nodes, self.edges)
    }
}
