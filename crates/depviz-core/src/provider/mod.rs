//! Package metadata provider: the crawler's window onto one or more
//! remote registries.
//!
//! The crawler only ever talks to the [`MetadataProvider`] trait; the
//! HTTP implementation lives in [`registry`]. Lookup operations return
//! a [`Lookup`] so callers can tell "legitimately absent everywhere"
//! apart from "every source errored".

pub mod registry;

pub use registry::{RegistryProvider, RegistrySource};

use crate::error::Error;
use semver::Version;
use serde::Serialize;
use url::Url;

/// One package as a registry reports it: a concrete id/version pair
/// with display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    pub id: String,
    pub version: Version,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
}

/// One declared dependency of a package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub id: String,
    pub version_range: String,
}

/// Outcome of a lookup tried against an ordered list of sources.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The first source that had an answer, and its answer.
    Found { source: String, value: T },
    /// At least one source answered, and none of them had it.
    NotFound,
    /// Every source failed outright.
    Failed(Vec<Error>),
}

/// Answers search, dependency-lookup, and metadata-resolution queries
/// against the configured registries.
///
/// All operations are sequential suspension points: the crawl does not
/// proceed past a call until its result (or failure) is available.
pub trait MetadataProvider {
    /// Free-text search, unioned across every configured source in
    /// declared order.
    fn search(
        &self,
        term: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PackageSummary>, Error>> + Send;

    /// The dependency list one concrete package version declares.
    /// Sources are tried in order; the first that knows the version
    /// wins (no cross-source merging for a single lookup).
    fn dependencies(
        &self,
        id: &str,
        version: &Version,
    ) -> impl std::future::Future<Output = Lookup<Vec<DependencyEntry>>> + Send;

    /// Resolve a dependency (id plus declared range) to a concrete
    /// package, trying sources in order.
    fn resolve(
        &self,
        id: &str,
        range: &str,
    ) -> impl std::future::Future<Output = Lookup<PackageSummary>> + Send;
}
