//! The `crawl` command: run one crawl and emit the graph.

use super::tree;
use depviz_core::{
    to_dot, to_html, DependencyCrawler, DepvizConfig, Error, PackageGraph, RegistryProvider,
};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

/// Crawl action, with the config already merged with flag overrides.
#[derive(Debug)]
pub struct CrawlAction {
    pub config: DepvizConfig,
    pub format: String,
    pub out: Option<PathBuf>,
}

/// Build a provider from the config and run one crawl to completion.
///
/// Shared with the web server, which runs this per request.
pub async fn crawl_graph(config: &DepvizConfig) -> Result<PackageGraph, Error> {
    let provider = RegistryProvider::from_config(&config.registries)?;
    let crawler = DependencyCrawler::new(&provider, &config.filter, config.max_depth)?;
    crawler.crawl().await
}

pub async fn run(action: CrawlAction) -> Result<()> {
    let graph = crawl_graph(&action.config).await.into_diagnostic()?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "crawl finished"
    );

    let output = match action.format.as_str() {
        "dot" => to_dot(&graph),
        "html" => to_html(&graph),
        // clap restricts the value; anything else is "json".
        _ => {
            let forest = tree::dependency_trees(&graph);
            let mut json = serde_json::to_string_pretty(&forest).into_diagnostic()?;
            json.push('\n');
            json
        }
    };

    match action.out {
        Some(path) => std::fs::write(&path, output).into_diagnostic()?,
        None => print!("{output}"),
    }
    Ok(())
}
