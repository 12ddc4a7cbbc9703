//! End-to-end crawl scenarios against an in-memory provider.

use depviz_core::{
    lowest_matching, DependencyCrawler, DependencyEntry, Lookup, MetadataProvider, PackageFilter,
    PackageGraph, PackageSummary,
};
use semver::Version;
use std::collections::BTreeMap;

/// In-memory metadata provider: package id -> version -> declared
/// dependencies.
#[derive(Default)]
struct FakeProvider {
    packages: BTreeMap<String, BTreeMap<Version, Vec<DependencyEntry>>>,
}

impl FakeProvider {
    fn add(&mut self, id: &str, version: &str, deps: &[(&str, &str)]) {
        let deps = deps
            .iter()
            .map(|(dep_id, range)| DependencyEntry {
                id: (*dep_id).to_string(),
                version_range: (*range).to_string(),
            })
            .collect();
        self.packages
            .entry(id.to_string())
            .or_default()
            .insert(Version::parse(version).unwrap(), deps);
    }

    fn summary(&self, id: &str, version: &Version) -> PackageSummary {
        PackageSummary {
            id: id.to_string(),
            version: version.clone(),
            description: format!("{id} description"),
            url: None,
        }
    }
}

impl MetadataProvider for FakeProvider {
    async fn search(&self, term: &str) -> Result<Vec<PackageSummary>, depviz_core::Error> {
        let term = term.to_lowercase();
        Ok(self
            .packages
            .iter()
            .filter(|(id, _)| id.to_lowercase().contains(&term))
            .map(|(id, versions)| {
                let lowest = versions.keys().next().unwrap();
                self.summary(id, lowest)
            })
            .collect())
    }

    async fn dependencies(&self, id: &str, version: &Version) -> Lookup<Vec<DependencyEntry>> {
        match self.packages.get(id).and_then(|v| v.get(version)) {
            Some(deps) => Lookup::Found {
                source: "fake".to_string(),
                value: deps.clone(),
            },
            None => Lookup::NotFound,
        }
    }

    async fn resolve(&self, id: &str, range: &str) -> Lookup<PackageSummary> {
        let Some(versions) = self.packages.get(id) else {
            return Lookup::NotFound;
        };
        let pool: Vec<Version> = versions.keys().cloned().collect();
        match lowest_matching(&pool, range) {
            Ok(Some(version)) => Lookup::Found {
                source: "fake".to_string(),
                value: self.summary(id, &version),
            },
            Ok(None) => Lookup::NotFound,
            Err(e) => Lookup::Failed(vec![e]),
        }
    }
}

fn filter(term: &str) -> PackageFilter {
    PackageFilter {
        search_term: term.to_string(),
        search_result_pattern: ".*".to_string(),
        dependency_pattern: ".*".to_string(),
    }
}

async fn crawl(provider: &FakeProvider, filter: &PackageFilter, depth: u32) -> PackageGraph {
    DependencyCrawler::new(provider, filter, depth)
        .unwrap()
        .crawl()
        .await
        .unwrap()
}

fn node_ids(graph: &PackageGraph) -> Vec<String> {
    let mut ids: Vec<String> = graph
        .all_nodes()
        .map(|h| h.node().package_id().to_string())
        .collect();
    ids.sort();
    ids
}

fn root_ids(graph: &PackageGraph) -> Vec<String> {
    let mut ids: Vec<String> = graph
        .root_nodes()
        .map(|h| h.node().package_id().to_string())
        .collect();
    ids.sort();
    ids
}

fn leaf_ids(graph: &PackageGraph) -> Vec<String> {
    let mut ids: Vec<String> = graph
        .leaf_nodes()
        .map(|h| h.node().package_id().to_string())
        .collect();
    ids.sort();
    ids
}

/// a depends on b and c; b depends on d; c and d are leaves.
fn diamondless_provider() -> FakeProvider {
    let mut provider = FakeProvider::default();
    provider.add("a", "1.0.0", &[("b", "^1.0.0"), ("c", "^1.0.0")]);
    provider.add("b", "1.0.0", &[("d", "^1.0.0")]);
    provider.add("c", "1.0.0", &[]);
    provider.add("d", "1.0.0", &[]);
    provider
}

#[tokio::test]
async fn test_depth_two_discovers_grandchildren() {
    let provider = diamondless_provider();
    let graph = crawl(&provider, &filter("a"), 2).await;

    assert_eq!(node_ids(&graph), ["a", "b", "c", "d"]);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(root_ids(&graph), ["a"]);
    assert_eq!(leaf_ids(&graph), ["c", "d"]);
}

#[tokio::test]
async fn test_depth_one_stops_at_children() {
    let provider = diamondless_provider();
    let graph = crawl(&provider, &filter("a"), 1).await;

    assert_eq!(node_ids(&graph), ["a", "b", "c"]);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(leaf_ids(&graph), ["b", "c"]);
}

#[tokio::test]
async fn test_depth_zero_yields_roots_only() {
    let provider = diamondless_provider();
    let graph = crawl(&provider, &filter("a"), 0).await;

    assert_eq!(node_ids(&graph), ["a"]);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(root_ids(&graph), ["a"]);
    assert_eq!(leaf_ids(&graph), ["a"]);
}

#[tokio::test]
async fn test_cycle_terminates_with_both_edges() {
    let mut provider = FakeProvider::default();
    provider.add("x", "1.0.0", &[("y", "^1.0.0")]);
    provider.add("y", "1.0.0", &[("x", "^1.0.0")]);

    let graph = crawl(&provider, &filter("x"), 5).await;

    assert_eq!(node_ids(&graph), ["x", "y"]);
    assert_eq!(graph.edge_count(), 2);
    // Every node sits on the cycle, so nothing is a root or a leaf.
    assert!(root_ids(&graph).is_empty());
    assert!(leaf_ids(&graph).is_empty());
}

#[tokio::test]
async fn test_search_result_pattern_filters_roots() {
    let mut provider = FakeProvider::default();
    provider.add("pkg-app", "1.0.0", &[]);
    provider.add("pkg-noise", "1.0.0", &[]);

    let mut f = filter("pkg");
    f.search_result_pattern = "^pkg-app$".to_string();
    let graph = crawl(&provider, &f, 2).await;

    assert_eq!(node_ids(&graph), ["pkg-app"]);
}

#[tokio::test]
async fn test_dependency_pattern_excludes_resolvable_packages() {
    let mut provider = FakeProvider::default();
    provider.add(
        "pkg-app",
        "1.0.0",
        &[("pkg-lib", "^1.0.0"), ("other-lib", "^1.0.0")],
    );
    provider.add("pkg-lib", "1.0.0", &[]);
    provider.add("other-lib", "1.0.0", &[]);

    let mut f = filter("pkg-app");
    f.dependency_pattern = "^pkg-".to_string();
    let graph = crawl(&provider, &f, 3).await;

    // other-lib is resolvable but filtered: neither node nor edge.
    assert_eq!(node_ids(&graph), ["pkg-app", "pkg-lib"]);
    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn test_unresolvable_dependency_is_skipped_not_fatal() {
    let mut provider = FakeProvider::default();
    provider.add("main", "1.0.0", &[("ghost", "^1.0.0"), ("real", "^1.0.0")]);
    provider.add("real", "1.0.0", &[]);

    let graph = crawl(&provider, &filter("main"), 2).await;

    assert_eq!(node_ids(&graph), ["main", "real"]);
    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn test_shared_dependency_merges_version_sets() {
    let mut provider = FakeProvider::default();
    provider.add("app-one", "1.0.0", &[("shared", "^1.0.0")]);
    provider.add("app-two", "1.0.0", &[("shared", "^2.0.0")]);
    provider.add("shared", "1.0.0", &[]);
    provider.add("shared", "2.0.0", &[]);

    let graph = crawl(&provider, &filter("app"), 1).await;

    assert_eq!(node_ids(&graph), ["app-one", "app-two", "shared"]);
    assert_eq!(graph.edge_count(), 2);

    let shared = graph
        .all_nodes()
        .find(|h| h.node().package_id() == "shared")
        .unwrap();
    let versions: Vec<String> = shared
        .node()
        .versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(versions, ["1.0.0", "2.0.0"]);
    assert_eq!(root_ids(&graph), ["app-one", "app-two"]);
    assert_eq!(leaf_ids(&graph), ["shared"]);
}

#[tokio::test]
async fn test_malformed_pattern_fails_before_any_crawl() {
    let provider = FakeProvider::default();
    let mut f = filter("x");
    f.dependency_pattern = "*(".to_string();

    assert!(DependencyCrawler::new(&provider, &f, 1).is_err());
}
