pub mod crawl;
pub mod serve;
pub mod tree;
