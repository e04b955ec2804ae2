//! Data model for extracted articles

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normalized identifier naming one crawlable article
///
/// Construction trims surrounding whitespace and replaces interior spaces
/// with underscores; case is preserved. The identifier doubles as the natural
/// primary key in every persisted store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().replace(' ', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attribute value: either a single text field or a list of items
///
/// List values come from list-style sections (cast, external links,
/// references); everything else is narrative text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

/// Structured record extracted from one article page
///
/// `attributes` holds only fields that were actually found; a missing key
/// means "not present on the page", never an empty placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub source_url: String,
    pub summary: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Terminal processing status for one fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Fetched, parsed, and a usable record was produced
    Success,
    /// The fetch and parse ran, but the page had no usable plot content
    Failed,
    /// Transport failure or an exception during processing
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Result of processing one identifier end to end
///
/// Per-article failures are data, not errors: the fetch client always
/// returns one of these and never propagates an exception to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchOutcome {
    Success(ArticleRecord),
    Failed { reason: String },
    Error { message: String },
}

impl FetchOutcome {
    pub fn status(&self) -> FetchStatus {
        match self {
            Self::Success(_) => FetchStatus::Success,
            Self::Failed { .. } => FetchStatus::Failed,
            Self::Error { .. } => FetchStatus::Error,
        }
    }

    /// The failure reason, if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failed { reason } => Some(reason),
            Self::Error { message } => Some(message),
        }
    }

    pub fn record(&self) -> Option<&ArticleRecord> {
        match self {
            Self::Success(record) => Some(record),
            _ => None,
        }
    }
}
