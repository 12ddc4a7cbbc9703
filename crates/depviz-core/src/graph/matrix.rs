//! Immutable adjacency-matrix graph.
//!
//! Built once from a finalized node/edge set. Each node gets a dense
//! zero-based index; cell (i, j) of the V×V matrix holds the list of
//! edges directed from node i to node j, so multi-edges between the
//! same ordered pair stay together.
//!
//! Root/leaf detection scans the full matrix (O(V²)) and per-node
//! connection queries scan one row or column (O(V)). The dense
//! representation trades memory for simplicity and is fine while V
//! stays in the hundreds; beyond that an adjacency-list layout with the
//! same query contract is the better choice.

use super::{GraphEdge, GraphNode};
use std::collections::{BTreeMap, HashMap, HashSet};

/// An immutable snapshot of a crawled dependency graph.
#[derive(Debug)]
pub struct AdjacencyMatrixGraph<N: GraphNode, E: GraphEdge<Id = N::Id>> {
    nodes: Vec<N>,
    cells: Vec<Vec<Vec<E>>>,
}

/// One node paired with its construction-time index. Connection queries
/// hang off this handle so consumers can walk the graph without a
/// separate traversal type.
#[derive(Debug)]
pub struct NodeHandle<'g, N: GraphNode, E: GraphEdge<Id = N::Id>> {
    graph: &'g AdjacencyMatrixGraph<N, E>,
    index: usize,
}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> Clone for NodeHandle<'_, N, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> Copy for NodeHandle<'_, N, E> {}

/// One incident edge as seen from a node: the endpoint on the far side
/// and the edge data.
#[derive(Debug)]
pub struct Connection<'g, N: GraphNode, E: GraphEdge<Id = N::Id>> {
    pub end: NodeHandle<'g, N, E>,
    pub data: &'g E,
}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> Clone for Connection<'_, N, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> Copy for Connection<'_, N, E> {}

impl<N: GraphNode, E: GraphEdge<Id = N::Id>> AdjacencyMatrixGraph<N, E> {
    /// Assign indices in the iteration order of the node set and fill
    /// the matrix. Edges whose endpoints are not in the node set are
    /// dropped; the builder never produces them.
    #[must_use]
    pub(crate) fn new(node_map: BTreeMap<N::Id, N>, edges: HashSet<E>) -> Self {
        let index_of: HashMap<N::Id, usize> = node_map
            .keys()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();

        let nodes: Vec<N> = node_map.into_values().collect();
        let count = nodes.len();
        let mut cells: Vec<Vec<Vec<E>>> = vec![vec![Vec::new(); count]; count];

        for edge in edges {
            let (Some(&from), Some(&to)) = (
                index_of.get(edge.parent_id()),
                index_of.get(edge.child_id()),
            ) else {
                continue;
            };
            cells[from][to].push(edge);
        }

        Self { nodes, cells }
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    /// The node handle for a construction-time index.
    ///
    /// # Panics
    /// Panics if `index >= node_count()`.
    #[must_use]
    pub fn handle(&self, index: usize) -> NodeHandle<'_, N, E> {
        assert!(index < self.nodes.len(), "node index out of bounds");
        NodeHandle { graph: self, index }
    }

    /// Every node paired with its index, in construction order.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeHandle<'_, N, E>> {
        (0..self.nodes.len()).map(|index| NodeHandle { graph: self, index })
    }

    /// Nodes no other node points into. A node with no edges at all is
    /// both a root and a leaf.
    pub fn root_nodes(&self) -> impl Iterator<Item = NodeHandle<'_, N, E>> {
        self.all_nodes().filter(|handle| {
            let me = handle.index;
            (0..self.nodes.len())
                .filter(|&other| other != me)
                .all(|other| self.cells[other][me].is_empty())
        })
    }

    /// Nodes with no edge directed out to any other node.
    pub fn leaf_nodes(&self) -> impl Iterator<Item = NodeHandle<'_, N, E>> {
        self.all_nodes().filter(|handle| {
            let me = handle.index;
            (0..self.nodes.len())
                .filter(|&other| other != me)
                .all(|other| self.cells[me][other].is_empty())
        })
    }
}

impl<'g, N: GraphNode, E: GraphEdge<Id = N::Id>> NodeHandle<'g, N, E> {
    /// Construction-time index, stable for the graph's lifetime.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The node value.
    #[must_use]
    pub fn node(&self) -> &'g N {
        &self.graph.nodes[self.index]
    }

    /// One connection per edge directed out of this node.
    #[must_use]
    pub fn children_connections(&self) -> Vec<Connection<'g, N, E>> {
        let row = &self.graph.cells[self.index];
        (0..self.graph.nodes.len())
            .flat_map(|to| {
                row[to].iter().map(move |edge| Connection {
                    end: NodeHandle {
                        graph: self.graph,
                        index: to,
                    },
                    data: edge,
                })
            })
            .collect()
    }

    /// One connection per edge directed into this node.
    #[must_use]
    pub fn parent_connections(&self) -> Vec<Connection<'g, N, E>> {
        (0..self.graph.nodes.len())
            .flat_map(|from| {
                self.graph.cells[from][self.index]
                    .iter()
                    .map(move |edge| Connection {
                        end: NodeHandle {
                            graph: self.graph,
                            index: from,
                        },
                        data: edge,
                    })
            })
            .collect()
    }
}
