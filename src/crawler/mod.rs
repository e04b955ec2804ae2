//! Crawling engine and HTTP client

pub mod engine;
pub mod fetcher;

pub use engine::CrawlEngine;
pub use fetcher::{build_http_client, FetchClient};

use crate::config::Config;
use crate::output::RunSummary;
use crate::Result;

/// Runs a full crawl with the given configuration
pub async fn crawl(config: Config) -> Result<RunSummary> {
    let engine = CrawlEngine::new(config)?;
    Ok(engine.run().await)
}
