//! HTTP fetch client
//!
//! Wraps the markup extractor and link discoverer behind identifier-based
//! operations. Per-article failures never escape as errors: every fetch
//! produces a [`FetchOutcome`] recording what happened.

use crate::config::{SourceConfig, UserAgentConfig};
use crate::extract::{discover_links, extract_article, ArticleId, FetchOutcome};
use reqwest::Client;
use std::time::Duration;

/// Fixed per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with proper configuration
///
/// The user agent identifies the bot and a contact point:
/// `CrawlerName/Version (+ContactURL; ContactEmail)`.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches article pages by identifier and runs extraction on them
pub struct FetchClient {
    client: Client,
    base_url: String,
}

impl FetchClient {
    pub fn new(
        source: &SourceConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            base_url: source.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The request URL for an identifier
    pub fn article_url(&self, identifier: &ArticleId) -> String {
        format!("{}/{}", self.base_url, identifier)
    }

    /// Fetches one article and extracts its structured record
    ///
    /// A non-200 response or transport failure yields `Error` with the cause
    /// captured verbatim; a page without usable plot content yields `Failed`.
    pub async fn fetch_and_extract(&self, identifier: &ArticleId) -> FetchOutcome {
        let url = self.article_url(identifier);
        tracing::debug!("Fetching: {}", url);

        let body = match self.fetch_body(&url).await {
            Ok(body) => body,
            Err(message) => return FetchOutcome::Error { message },
        };

        match extract_article(&body, identifier.as_str(), &url) {
            Ok(record) => FetchOutcome::Success(record),
            Err(e) => FetchOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Re-fetches the same article and discovers its outbound links
    ///
    /// Kept separate from extraction so link discovery runs only when an
    /// extraction succeeded. Failures surface as an error message rather
    /// than aborting the crawl.
    pub async fn fetch_links(&self, identifier: &ArticleId) -> Result<Vec<ArticleId>, String> {
        let url = self.article_url(identifier);
        let body = self.fetch_body(&url).await?;
        Ok(discover_links(&body))
    }

    /// Single GET with status handling; maps failures to display messages
    async fn fetch_body(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!(
                "Failed to fetch page. Status code: {}",
                status.as_u16()
            ));
        }

        response
            .text()
            .await
            .map_err(|e| format!("Request failed: {}", e))
    }
}
