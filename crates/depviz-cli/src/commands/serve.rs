//! The `serve` command: JSON API plus the interactive visualization.
//!
//! Every request runs a fresh crawl with the configured settings,
//! individually overridable through query parameters. Crawls against
//! real registries take a while at higher depths; the server holds no
//! cache, so callers should.

use super::crawl::crawl_graph;
use super::tree;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use depviz_core::{to_html, DepvizConfig};
use miette::{IntoDiagnostic, Result};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    config: DepvizConfig,
}

/// Per-request overrides of the configured crawl settings.
#[derive(Debug, Default, Deserialize)]
struct CrawlParams {
    search_term: Option<String>,
    search_result_pattern: Option<String>,
    dependency_pattern: Option<String>,
    max_depth: Option<u32>,
}

impl CrawlParams {
    fn apply(self, mut config: DepvizConfig) -> DepvizConfig {
        if let Some(term) = self.search_term {
            config.filter.search_term = term;
        }
        if let Some(pattern) = self.search_result_pattern {
            config.filter.search_result_pattern = pattern;
        }
        if let Some(pattern) = self.dependency_pattern {
            config.filter.dependency_pattern = pattern;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        config
    }
}

pub async fn run(config: DepvizConfig, host: &str, port: u16) -> Result<()> {
    let app = router(config);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.into_diagnostic()?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

fn router(config: DepvizConfig) -> Router {
    Router::new()
        .route("/", get(visualization))
        .route("/api/v1/dependencies", get(dependencies))
        .layer(CorsLayer::permissive())
        .with_state(AppState { config })
}

/// GET /api/v1/dependencies — the crawled graph as a forest of trees.
async fn dependencies(
    State(state): State<AppState>,
    Query(params): Query<CrawlParams>,
) -> Response {
    let config = params.apply(state.config);
    match crawl_graph(&config).await {
        Ok(graph) => Json(tree::dependency_trees(&graph)).into_response(),
        Err(e) => {
            error!(error = %e, "crawl failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET / — the self-contained d3-graphviz page.
async fn visualization(
    State(state): State<AppState>,
    Query(params): Query<CrawlParams>,
) -> Response {
    let config = params.apply(state.config);
    match crawl_graph(&config).await {
        Ok(graph) => Html(to_html(&graph)).into_response(),
        Err(e) => {
            error!(error = %e, "crawl failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depviz_core::{PackageFilter, RegistriesConfig};

    fn base_config() -> DepvizConfig {
        DepvizConfig {
            registries: RegistriesConfig {
                urls: vec!["https://registry.example.org/".to_string()],
                username: None,
                password: None,
            },
            filter: PackageFilter {
                search_term: "configured".to_string(),
                search_result_pattern: ".*".to_string(),
                dependency_pattern: ".*".to_string(),
            },
            max_depth: 10,
        }
    }

    #[test]
    fn test_params_override_config() {
        let params = CrawlParams {
            search_term: Some("requested".to_string()),
            max_depth: Some(2),
            ..CrawlParams::default()
        };

        let config = params.apply(base_config());
        assert_eq!(config.filter.search_term, "requested");
        assert_eq!(config.max_depth, 2);
        // Untouched fields keep their configured values.
        assert_eq!(config.filter.search_result_pattern, ".*");
    }

    #[test]
    fn test_empty_params_keep_config() {
        let config = CrawlParams::default().apply(base_config());
        assert_eq!(config.filter.search_term, "configured");
        assert_eq!(config.max_depth, 10);
    }
}
