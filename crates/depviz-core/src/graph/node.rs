//! Package node and dependency edge value types.

use super::{GraphEdge, GraphNode};
use semver::Version;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// A deduplicated record of one package identity and every version of
/// it discovered during a crawl.
///
/// Equality and hashing are defined solely on the package id; the
/// version set grows as the same package is rediscovered at other
/// versions and never shrinks.
#[derive(Debug, Clone)]
pub struct PackageNode {
    package_id: String,
    versions: BTreeSet<Version>,
    description: String,
    package_url: Option<Url>,
}

impl PackageNode {
    /// Create a node with its first-seen version.
    #[must_use]
    pub fn new(
        package_id: impl Into<String>,
        initial_version: Version,
        description: impl Into<String>,
        package_url: Option<Url>,
    ) -> Self {
        let mut versions = BTreeSet::new();
        versions.insert(initial_version);
        Self {
            package_id: package_id.into(),
            versions,
            description: description.into(),
            package_url,
        }
    }

    /// The package id (identity).
    #[must_use]
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// All known versions, ascending.
    #[must_use]
    pub fn versions(&self) -> &BTreeSet<Version> {
        &self.versions
    }

    /// The smallest known version. `None` only for a node whose version
    /// set is empty, which the constructors never produce.
    #[must_use]
    pub fn min_version(&self) -> Option<&Version> {
        self.versions.iter().next()
    }

    /// Record another known version.
    pub fn add_version(&mut self, version: Version) {
        self.versions.insert(version);
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn package_url(&self) -> Option<&Url> {
        self.package_url.as_ref()
    }
}

impl PartialEq for PackageNode {
    fn eq(&self, other: &Self) -> bool {
        self.package_id == other.package_id
    }
}

impl Eq for PackageNode {}

impl Hash for PackageNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package_id.hash(state);
    }
}

impl fmt::Display for PackageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.package_id, self.description)
    }
}

impl GraphNode for PackageNode {
    type Id = String;

    fn id(&self) -> &String {
        &self.package_id
    }

    /// Union the incoming version set into this node. Description and
    /// detail URL keep their first-seen values.
    fn merge_from(&mut self, incoming: Self) {
        self.versions.extend(incoming.versions);
    }
}

/// A directed dependency relationship from a depending package to a
/// depended-upon package, qualified by the declared version range.
///
/// Equality is the (range, parent, child) triple: two edges between the
/// same pair with different ranges are distinct and coexist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    version_range: String,
    parent: String,
    child: String,
}

impl DependencyEdge {
    #[must_use]
    pub fn new(
        version_range: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            version_range: version_range.into(),
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// The version range the parent declared for this dependency.
    #[must_use]
    pub fn version_range(&self) -> &str {
        &self.version_range
    }
}

impl GraphEdge for DependencyEdge {
    type Id = String;

    fn parent_id(&self) -> &String {
        &self.parent
    }

    fn child_id(&self) -> &String {
        &self.child
    }
}
