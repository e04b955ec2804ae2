//! Plotfetch: a recursive article crawler for an encyclopedia-style site
//!
//! Given a seed article identifier, plotfetch fetches the article, extracts a
//! structured record (plot summary plus attribute fields), discovers outbound
//! article links, and recurses until an item budget or safety depth is hit.
//! Completion status is persisted after every item, so an interrupted crawl
//! can be resumed without re-fetching finished articles.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod store;

use thiserror::Error;

/// Main error type for plotfetch operations
///
/// These cover setup-level and store-level failures only. Per-article fetch
/// and extraction failures are recorded as data (see
/// [`extract::FetchOutcome`]) and never surface as `Err`.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for plotfetch operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{ArticleId, ArticleRecord, FetchOutcome, FetchStatus};
pub use store::ArticleStore;
