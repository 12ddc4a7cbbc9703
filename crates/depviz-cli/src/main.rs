#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use depviz_core::{DepvizConfig, CONFIG_FILE};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "depviz")]
#[command(author, version, about = "Explore and visualize package dependency graphs", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Path to the configuration file (default: depviz.json)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Crawl the configured registries and emit the dependency graph
    Crawl {
        /// Search term (overrides the configured one)
        #[arg(long, short = 't')]
        term: Option<String>,

        /// Pattern a search result's id must match to seed a root
        #[arg(long)]
        search_pattern: Option<String>,

        /// Pattern a dependency's id must match to be followed
        #[arg(long)]
        dependency_pattern: Option<String>,

        /// Maximum expansion depth (overrides the configured one)
        #[arg(long, short = 'd')]
        depth: Option<u32>,

        /// Output format: "json", "dot", or "html"
        #[arg(long, short = 'f', default_value = "json", value_parser = ["json", "dot", "html"])]
        format: String,

        /// Write the output to a file instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Serve the JSON API and the interactive visualization over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, short = 'p', default_value = "8080")]
        port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = DepvizConfig::load(&config_path).into_diagnostic()?;

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;

    match cli.command {
        Commands::Crawl {
            term,
            search_pattern,
            dependency_pattern,
            depth,
            format,
            out,
        } => {
            let mut config = config;
            if let Some(term) = term {
                config.filter.search_term = term;
            }
            if let Some(pattern) = search_pattern {
                config.filter.search_result_pattern = pattern;
            }
            if let Some(pattern) = dependency_pattern {
                config.filter.dependency_pattern = pattern;
            }
            if let Some(depth) = depth {
                config.max_depth = depth;
            }

            let action = commands::crawl::CrawlAction {
                config,
                format,
                out,
            };
            runtime.block_on(commands::crawl::run(action))
        }
        Commands::Serve { host, port } => {
            runtime.block_on(commands::serve::run(config, &host, port))
        }
    }
}
