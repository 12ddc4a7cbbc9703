//! JSON tree view of a crawled graph.
//!
//! The API serves the graph as a forest: one tree per root node, each
//! dependency edge becoming a child entry carrying its declared version
//! range. A shared package appears once per path that reaches it; a
//! package that closes a cycle on the current path is emitted once more
//! without children so the serialization stays finite.

use depviz_core::{DependencyEdge, NodeHandle, PackageGraph, PackageNode};
use serde::Serialize;
use std::collections::HashSet;

/// One package in the tree view.
#[derive(Debug, Serialize)]
pub struct TreeNode {
    pub package_id: String,
    pub versions: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub dependencies: Vec<TreeDependency>,
}

/// One dependency edge under a package.
#[derive(Debug, Serialize)]
pub struct TreeDependency {
    pub version_range: String,
    pub package: TreeNode,
}

type Handle<'g> = NodeHandle<'g, PackageNode, DependencyEdge>;

/// Serialize the graph as one tree per root node.
///
/// A graph with no roots (every node sits on a cycle) yields an empty
/// forest, matching what the root scan reports.
#[must_use]
pub fn dependency_trees(graph: &PackageGraph) -> Vec<TreeNode> {
    graph
        .root_nodes()
        .map(|root| {
            let mut on_path = HashSet::new();
            subtree(root, &mut on_path)
        })
        .collect()
}

fn subtree(handle: Handle<'_>, on_path: &mut HashSet<usize>) -> TreeNode {
    on_path.insert(handle.index());

    let dependencies = handle
        .children_connections()
        .into_iter()
        .map(|connection| {
            let package = if on_path.contains(&connection.end.index()) {
                // Cycle back onto the current path: emit the node once
                // more, childless.
                leaf_view(connection.end)
            } else {
                subtree(connection.end, on_path)
            };
            TreeDependency {
                version_range: connection.data.version_range().to_string(),
                package,
            }
        })
        .collect();

    on_path.remove(&handle.index());
    view(handle, dependencies)
}

fn leaf_view(handle: Handle<'_>) -> TreeNode {
    view(handle, Vec::new())
}

fn view(handle: Handle<'_>, dependencies: Vec<TreeDependency>) -> TreeNode {
    let node = handle.node();
    TreeNode {
        package_id: node.package_id().to_string(),
        versions: node.versions().iter().map(ToString::to_string).collect(),
        description: node.description().to_string(),
        url: node.package_url().map(ToString::to_string),
        dependencies,
    }
}
