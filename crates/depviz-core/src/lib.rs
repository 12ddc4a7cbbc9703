#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod crawler;
pub mod error;
pub mod graph;
pub mod provider;
pub mod render;
pub mod version;

pub use config::{DepvizConfig, PackageFilter, RegistriesConfig, CONFIG_FILE};
pub use crawler::{CompiledFilter, DependencyCrawler, PackageGraph};
pub use error::Error;
pub use graph::{
    AdjacencyMatrixGraph, Connection, ConnectionInsert, DependencyEdge, EdgeInsert, GraphBuilder,
    GraphEdge, GraphNode, NodeHandle, NodeInsert, PackageNode,
};
pub use provider::{
    DependencyEntry, Lookup, MetadataProvider, PackageSummary, RegistryProvider, RegistrySource,
};
pub use render::{to_dot, to_html};
pub use version::{lowest_matching, parse_range};
