//! Graph accumulation and query engine.
//!
//! The engine is generic over the node and edge types: nodes supply an
//! identity (equality and hashing on the identity alone) plus a merge
//! policy for duplicate discoveries, edges supply their endpoints.
//! A [`GraphBuilder`] accumulates deduplicated nodes and edges during a
//! crawl and freezes them into an immutable [`AdjacencyMatrixGraph`].

pub mod builder;
pub mod matrix;
pub mod node;

pub use builder::{ConnectionInsert, EdgeInsert, GraphBuilder, NodeInsert};
pub use matrix::{AdjacencyMatrixGraph, Connection, NodeHandle};
pub use node::{DependencyEdge, PackageNode};

use std::fmt::Debug;
use std::hash::Hash;

/// Contract for node types stored in the graph.
///
/// Identity drives deduplication: two nodes with equal ids are the same
/// node regardless of their other attributes. When a duplicate is
/// discovered, the stored node absorbs the incoming one via
/// [`GraphNode::merge_from`].
pub trait GraphNode: Clone {
    /// Identity key. Equality and hashing of nodes is defined on this
    /// key alone.
    type Id: Clone + Eq + Hash + Ord + Debug;

    /// The node's identity.
    fn id(&self) -> &Self::Id;

    /// Reconcile a duplicate discovery into this (already stored) node.
    fn merge_from(&mut self, incoming: Self);
}

/// Contract for directed edge types stored in the graph.
///
/// Edge equality is structural over the whole edge value, so two edges
/// between the same endpoints with different payloads coexist.
pub trait GraphEdge: Clone + Eq + Hash {
    /// Endpoint identity type, shared with the node type.
    type Id: Clone + Eq + Hash + Ord + Debug;

    /// Identity of the depending (parent) endpoint.
    fn parent_id(&self) -> &Self::Id;

    /// Identity of the depended-upon (child) endpoint.
    fn child_id(&self) -> &Self::Id;
}
