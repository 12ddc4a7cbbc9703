//! Depth-bounded, regex-filtered dependency crawl.
//!
//! The crawler searches the configured sources for top-level packages,
//! keeps the ones whose id matches the search-result pattern, then
//! expands each root depth-first through the provider: fetch the
//! dependency list for the node's minimum known version, keep entries
//! matching the dependency pattern, resolve each to a concrete package
//! and record the edge. Expansion runs off an explicit worklist, and a
//! visited set restricted to the current path stops cycles from
//! re-expanding while still letting the same package be reached again
//! via a different path within the depth bound.

use crate::config::PackageFilter;
use crate::error::Error;
use crate::graph::{AdjacencyMatrixGraph, DependencyEdge, GraphBuilder, PackageNode};
use crate::provider::{Lookup, MetadataProvider, PackageSummary};
use regex_lite::Regex;
use tracing::{debug, info, warn};

/// A finished crawl result.
pub type PackageGraph = AdjacencyMatrixGraph<PackageNode, DependencyEdge>;

/// The filter with its name patterns compiled (case-insensitively).
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub search_term: String,
    pub search_result: Regex,
    pub dependency: Regex,
}

/// One pending expansion: a node, how deep it sits below its root, and
/// the chain of ancestor ids (including itself) that led here.
#[derive(Debug)]
struct WorkItem {
    id: String,
    depth: u32,
    path: Vec<String>,
}

/// Drives discovery from a [`MetadataProvider`] into a graph.
pub struct DependencyCrawler<'a, P> {
    provider: &'a P,
    filter: CompiledFilter,
    max_depth: u32,
}

impl<'a, P: MetadataProvider> DependencyCrawler<'a, P> {
    /// Create a crawler, compiling the filter patterns. A malformed
    /// pattern fails here, before any provider call.
    pub fn new(provider: &'a P, filter: &PackageFilter, max_depth: u32) -> Result<Self, Error> {
        Ok(Self {
            provider,
            filter: filter.compile()?,
            max_depth,
        })
    }

    /// Run the crawl and freeze the result.
    ///
    /// Lookup misses are logged and skipped; the crawl always produces
    /// the best graph reachable given the depth bound and available
    /// data.
    pub async fn crawl(&self) -> Result<PackageGraph, Error> {
        let mut builder: GraphBuilder<PackageNode, DependencyEdge> = GraphBuilder::new();
        let mut worklist: Vec<WorkItem> = Vec::new();

        let results = self.provider.search(&self.filter.search_term).await?;
        info!(
            term = %self.filter.search_term,
            count = results.len(),
            "search finished"
        );

        for summary in results {
            if !self.filter.search_result.is_match(&summary.id) {
                continue;
            }
            let node = node_from_summary(summary);
            let id = node.package_id().to_string();
            builder.add_node(node);
            worklist.push(WorkItem {
                path: vec![id.clone()],
                id,
                depth: 1,
            });
        }

        while let Some(item) = worklist.pop() {
            if item.depth > self.max_depth {
                continue;
            }
            self.expand(&mut builder, &mut worklist, &item).await;
        }

        Ok(builder.build())
    }

    /// Expand one node: fetch its dependency list, filter, resolve and
    /// record each edge, and queue unvisited children.
    async fn expand(
        &self,
        builder: &mut GraphBuilder<PackageNode, DependencyEdge>,
        worklist: &mut Vec<WorkItem>,
        item: &WorkItem,
    ) {
        // The accumulated node carries every version discovered so far;
        // dependencies are fetched for the smallest one.
        let Some(parent) = builder.node(&item.id).cloned() else {
            return;
        };
        let Some(version) = parent.min_version().cloned() else {
            return;
        };

        let deps = match self.provider.dependencies(&item.id, &version).await {
            Lookup::Found { source, value } => {
                debug!(id = %item.id, %version, %source, count = value.len(), "dependencies");
                value
            }
            Lookup::NotFound => {
                debug!(id = %item.id, %version, "no source knows this version");
                return;
            }
            Lookup::Failed(errors) => {
                warn!(id = %item.id, %version, errors = errors.len(), "dependency lookup failed on every source");
                return;
            }
        };

        for dep in deps {
            if !self.filter.dependency.is_match(&dep.id) {
                continue;
            }

            let child = match self.provider.resolve(&dep.id, &dep.version_range).await {
                Lookup::Found { value, .. } => node_from_summary(value),
                Lookup::NotFound => {
                    warn!(id = %dep.id, range = %dep.version_range, "child package not found");
                    continue;
                }
                Lookup::Failed(errors) => {
                    warn!(id = %dep.id, range = %dep.version_range, errors = errors.len(), "child resolution failed on every source");
                    continue;
                }
            };

            let child_id = child.package_id().to_string();
            let edge = DependencyEdge::new(dep.version_range, item.id.clone(), child_id.clone());
            builder.add_child_connection(parent.clone(), child, edge);

            // A child already on the current path closes a cycle: its
            // edge is recorded above, but it is not re-expanded.
            if item.path.iter().any(|ancestor| *ancestor == child_id) {
                debug!(id = %child_id, "cycle on current path, not re-expanding");
                continue;
            }

            let mut path = item.path.clone();
            path.push(child_id.clone());
            worklist.push(WorkItem {
                id: child_id,
                depth: item.depth + 1,
                path,
            });
        }
    }
}

fn node_from_summary(summary: PackageSummary) -> PackageNode {
    PackageNode::new(
        summary.id,
        summary.version,
        summary.description,
        summary.url,
    )
}
