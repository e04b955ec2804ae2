use serde::Deserialize;

/// Main configuration structure for plotfetch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Total number of articles to process before stopping
    #[serde(rename = "max-items")]
    pub max_items: usize,

    /// Seed article identifier to start discovery from
    pub seed: String,

    /// Hard recursion depth limit to prevent runaway traversal
    #[serde(rename = "max-safety-depth", default = "default_safety_depth")]
    pub max_safety_depth: u32,

    /// Follow every discovered link (true) or cap per article (false)
    #[serde(rename = "process-all-links", default = "default_true")]
    pub process_all_links: bool,

    /// Per-article link cap, used only when process-all-links is false
    #[serde(rename = "max-links-per-item", default = "default_links_per_item")]
    pub max_links_per_item: usize,

    /// Courtesy pause inserted every 10th child link (milliseconds)
    #[serde(rename = "courtesy-delay-ms", default = "default_courtesy_delay")]
    pub courtesy_delay_ms: u64,

    /// Skip identifiers already on the current traversal path
    #[serde(rename = "prevent-cycles", default = "default_true")]
    pub prevent_cycles: bool,

    /// Skip identifiers already processed anywhere in this run
    #[serde(rename = "prevent-duplicates", default = "default_true")]
    pub prevent_duplicates: bool,
}

/// Article source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL that identifiers are appended to, e.g.
    /// "https://en.wikipedia.org/wiki"
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the JSON store files
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Number of link-history entries retained in the ring buffer
    #[serde(rename = "history-limit", default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_safety_depth() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

fn default_links_per_item() -> usize {
    10
}

fn default_courtesy_delay() -> u64 {
    100
}

fn default_history_limit() -> usize {
    100
}
