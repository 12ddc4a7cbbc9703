//! Configuration surface: registry endpoints, package filter, crawl
//! depth.
//!
//! Loaded from a JSON file (`depviz.json` by default); the CLI and the
//! web API override individual fields from flags or query parameters.

use crate::crawler::CompiledFilter;
use crate::error::Error;
use regex_lite::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name.
pub const CONFIG_FILE: &str = "depviz.json";

fn default_max_depth() -> u32 {
    10
}

fn default_pattern() -> String {
    ".*".to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepvizConfig {
    /// Ordered registry endpoints (tried in declared order).
    pub registries: RegistriesConfig,

    /// The crawl filter.
    pub filter: PackageFilter,

    /// Maximum recursive expansion depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

/// Registry endpoints with optional shared basic-auth credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistriesConfig {
    /// Base endpoint URLs, in lookup order.
    pub urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// What to search for and which package names to keep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageFilter {
    /// Free-text search term sent to each registry.
    pub search_term: String,

    /// Case-insensitive pattern a search result's id must match to
    /// seed a root node.
    #[serde(default = "default_pattern")]
    pub search_result_pattern: String,

    /// Case-insensitive pattern a dependency's id must match to be
    /// followed.
    #[serde(default = "default_pattern")]
    pub dependency_pattern: String,
}

impl PackageFilter {
    /// Compile both name patterns. A malformed pattern is a fatal
    /// configuration error, surfaced here before any crawl begins.
    pub fn compile(&self) -> Result<CompiledFilter, Error> {
        Ok(CompiledFilter {
            search_term: self.search_term.clone(),
            search_result: compile_pattern(&self.search_result_pattern)?,
            dependency: compile_pattern(&self.dependency_pattern)?,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<regex_lite::Regex, Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

impl DepvizConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
