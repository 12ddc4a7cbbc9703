//! npm-style registry client and the ordered multi-source provider.

use super::{DependencyEntry, Lookup, MetadataProvider, PackageSummary};
use crate::config::RegistriesConfig;
use crate::error::Error;
use crate::version::lowest_matching;
use reqwest::Client;
use semver::Version;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Maximum number of search results requested per source.
const SEARCH_PAGE_SIZE: usize = 250;

/// Client for a single registry endpoint with optional basic auth.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    base_url: Url,
    http: Client,
    username: Option<String>,
    password: Option<String>,
}

impl RegistrySource {
    /// Create a source for the given base URL.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot
    /// be created.
    pub fn new(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, Error> {
        // A trailing slash keeps Url::join from eating the last path
        // segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|source| Error::InvalidRegistryUrl {
            url: normalized.clone(),
            source,
        })?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("depviz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::registry(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            http,
            username,
            password,
        })
    }

    /// A short display name for log lines: the endpoint host.
    #[must_use]
    pub fn name(&self) -> &str {
        self.base_url.host_str().unwrap_or("registry")
    }

    /// Run the registry's free-text search.
    pub async fn search(&self, term: &str) -> Result<Vec<PackageSummary>, Error> {
        let mut url = self
            .base_url
            .join("-/v1/search")
            .map_err(|e| Error::registry(format!("Failed to build search URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("text", term)
            .append_pair("size", &SEARCH_PAGE_SIZE.to_string());

        let body = self
            .get_json(url)
            .await?
            .ok_or_else(|| Error::registry(format!("{}: search endpoint missing", self.name())))?;

        Ok(summaries_from_search(&body))
    }

    /// Fetch the full package document for a package id, or `None` when
    /// this source does not know the package.
    pub async fn packument(&self, id: &str) -> Result<Option<Value>, Error> {
        let url = self
            .base_url
            .join(&encode_name(id))
            .map_err(|e| Error::registry(format!("Failed to build URL for '{id}': {e}")))?;
        self.get_json(url).await
    }

    async fn get_json(&self, url: Url) -> Result<Option<Value>, Error> {
        let mut request = self.http.get(url.as_str());
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::registry(format!(
                "{} returned status {}",
                self.name(),
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        Ok(Some(json))
    }
}

/// URL-encode a package name, escaping the slash in scoped names.
fn encode_name(name: &str) -> String {
    if name.starts_with('@') {
        name.replace('/', "%2F")
    } else {
        name.to_string()
    }
}

/// Extract package summaries from a search response body.
#[must_use]
pub fn summaries_from_search(body: &Value) -> Vec<PackageSummary> {
    let Some(objects) = body.get("objects").and_then(Value::as_array) else {
        return Vec::new();
    };

    objects
        .iter()
        .filter_map(|entry| {
            let package = entry.get("package")?;
            let id = package.get("name")?.as_str()?;
            let version = Version::parse(package.get("version")?.as_str()?).ok()?;
            Some(PackageSummary {
                id: id.to_string(),
                version,
                description: string_field(package, "description"),
                url: package
                    .get("links")
                    .and_then(|links| links.get("npm"))
                    .and_then(Value::as_str)
                    .and_then(|s| Url::parse(s).ok()),
            })
        })
        .collect()
}

/// All parseable published versions in a packument.
#[must_use]
pub fn all_versions(packument: &Value) -> Vec<Version> {
    packument
        .get("versions")
        .and_then(Value::as_object)
        .map(|versions| {
            versions
                .keys()
                .filter_map(|v| Version::parse(v).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// The dependency list one published version declares, or `None` when
/// the packument does not contain that version.
#[must_use]
pub fn dependencies_of_version(packument: &Value, version: &Version) -> Option<Vec<DependencyEntry>> {
    let entry = packument.get("versions")?.get(version.to_string())?;

    let deps = entry
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| {
            deps.iter()
                .map(|(id, range)| DependencyEntry {
                    id: id.clone(),
                    version_range: range.as_str().unwrap_or("*").to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(deps)
}

/// Build a summary for one published version of a packument.
#[must_use]
pub fn summary_for_version(packument: &Value, id: &str, version: &Version) -> Option<PackageSummary> {
    let entry = packument.get("versions")?.get(version.to_string())?;

    let description = match entry.get("description").and_then(Value::as_str) {
        Some(d) => d.to_string(),
        None => string_field(packument, "description"),
    };

    let url = entry
        .get("homepage")
        .or_else(|| packument.get("homepage"))
        .and_then(Value::as_str)
        .and_then(|s| Url::parse(s).ok());

    Some(PackageSummary {
        id: id.to_string(),
        version: version.clone(),
        description,
        url,
    })
}

/// Decide the search outcome: an empty union is a valid answer, but
/// "no source answered and at least one errored" must surface as an
/// error so callers can tell it apart from "no results".
fn search_union(
    answered: bool,
    results: Vec<PackageSummary>,
    errors: Vec<Error>,
) -> Result<Vec<PackageSummary>, Error> {
    if !answered && !errors.is_empty() {
        let detail = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::registry(format!("every source failed: {detail}")));
    }
    Ok(results)
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Ordered list of registry sources.
///
/// Searches union every source's results; dependency and metadata
/// lookups try sources in declared order and take the first answer.
#[derive(Debug, Clone)]
pub struct RegistryProvider {
    sources: Vec<RegistrySource>,
}

impl RegistryProvider {
    #[must_use]
    pub fn new(sources: Vec<RegistrySource>) -> Self {
        Self { sources }
    }

    /// Build the provider from the registries section of the config.
    pub fn from_config(config: &RegistriesConfig) -> Result<Self, Error> {
        let sources = config
            .urls
            .iter()
            .map(|url| {
                RegistrySource::new(url, config.username.clone(), config.password.clone())
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self::new(sources))
    }
}

impl MetadataProvider for RegistryProvider {
    /// Union of every source's search results. A failing source is
    /// logged and skipped as long as at least one source answers; when
    /// every source fails, the search itself fails.
    async fn search(&self, term: &str) -> Result<Vec<PackageSummary>, Error> {
        let mut all = Vec::new();
        let mut errors = Vec::new();
        let mut answered = false;

        for source in &self.sources {
            match source.search(term).await {
                Ok(results) => {
                    debug!(
                        source = source.name(),
                        count = results.len(),
                        "search results"
                    );
                    answered = true;
                    all.extend(results);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "search failed");
                    errors.push(e);
                }
            }
        }

        search_union(answered, all, errors)
    }

    async fn dependencies(&self, id: &str, version: &Version) -> Lookup<Vec<DependencyEntry>> {
        let mut errors = Vec::new();
        let mut answered = false;

        for source in &self.sources {
            match source.packument(id).await {
                Ok(Some(packument)) => {
                    answered = true;
                    if let Some(deps) = dependencies_of_version(&packument, version) {
                        return Lookup::Found {
                            source: source.name().to_string(),
                            value: deps,
                        };
                    }
                }
                Ok(None) => answered = true,
                Err(e) => errors.push(e),
            }
        }

        if !answered && !errors.is_empty() {
            Lookup::Failed(errors)
        } else {
            Lookup::NotFound
        }
    }

    async fn resolve(&self, id: &str, range: &str) -> Lookup<PackageSummary> {
        let mut errors = Vec::new();
        let mut answered = false;

        for source in &self.sources {
            match source.packument(id).await {
                Ok(Some(packument)) => {
                    answered = true;
                    let versions = all_versions(&packument);
                    match lowest_matching(&versions, range) {
                        Ok(Some(version)) => {
                            if let Some(summary) = summary_for_version(&packument, id, &version) {
                                return Lookup::Found {
                                    source: source.name().to_string(),
                                    value: summary,
                                };
                            }
                        }
                        Ok(None) => {}
                        // The range itself is broken; no source will do
                        // better.
                        Err(e) => return Lookup::Failed(vec![e]),
                    }
                }
                Ok(None) => answered = true,
                Err(e) => errors.push(e),
            }
        }

        if !answered && !errors.is_empty() {
            Lookup::Failed(errors)
        } else {
            Lookup::NotFound
        }
    }
}
