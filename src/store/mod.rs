//! Persistence for crawl progress and extracted records
//!
//! Four JSON-array files back the store:
//! - completion index: one entry per identifier ever attempted (upserted)
//! - attempt log: every attempt, appended (audit trail)
//! - record log: full records of successful extractions, appended
//! - link history: ring buffer of recently discovered link batches

mod json;

pub use json::ArticleStore;

use crate::extract::{ArticleId, ArticleRecord, FetchStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable record of an identifier's terminal processing status
///
/// At most one entry exists per identifier; reprocessing overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEntry {
    /// Opaque unique ID for record-level referencing
    pub id: String,
    pub identifier: ArticleId,
    pub completed_at: DateTime<Utc>,
    pub status: FetchStatus,
    pub error: Option<String>,
}

/// One entry per processing attempt, for audit and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptEntry {
    pub attempt: usize,
    pub identifier: ArticleId,
    pub timestamp: DateTime<Utc>,
    pub status: FetchStatus,
    /// Full fetch outcome as persisted JSON
    pub outcome: serde_json::Value,
    pub depth: u32,
}

/// A successful extraction as persisted for downstream consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: String,
    pub identifier: ArticleId,
    #[serde(flatten)]
    pub record: ArticleRecord,
}

/// One batch of links discovered from an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkHistoryEntry {
    pub identifier: ArticleId,
    pub links: Vec<ArticleId>,
    pub depth: u32,
    pub timestamp: DateTime<Utc>,
    pub count: usize,
}

/// Aggregate counts over the completion index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub success: usize,
    pub failed: usize,
    pub error: usize,
}

impl StoreStats {
    pub fn total(&self) -> usize {
        self.success + self.failed + self.error
    }
}
