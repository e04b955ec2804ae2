//! JSON-file-backed article store
//!
//! Every mutation is a read-merge-rewrite of the affected file: load the
//! current array (missing file means empty), apply the change, write the
//! whole array back through a temp-file rename. The durability contract is
//! that prior entries survive once a call returns, not during it.

use crate::extract::{ArticleId, FetchStatus};
use crate::store::{
    AttemptEntry, CompletionEntry, LinkHistoryEntry, StoreError, StoreResult, StoreStats,
    StoredRecord,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const COMPLETIONS_FILE: &str = "completions.json";
const ATTEMPTS_FILE: &str = "attempts.json";
const RECORDS_FILE: &str = "records.json";
const LINK_HISTORY_FILE: &str = "link_history.json";

/// Append-only, idempotent-by-identifier persistence for crawl progress
pub struct ArticleStore {
    data_dir: PathBuf,
    history_limit: usize,
}

impl ArticleStore {
    /// Opens (and creates if needed) a store rooted at `data_dir`
    pub fn open(data_dir: &Path, history_limit: usize) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            history_limit,
        })
    }

    /// Loads the completion index
    ///
    /// A missing file is an empty index. A corrupt file is reported as a
    /// warning and treated as empty so a damaged index never aborts a crawl.
    pub fn load_completions(&self) -> Vec<CompletionEntry> {
        let path = self.data_dir.join(COMPLETIONS_FILE);
        match load_array(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to load completion index, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Upserts a completion entry for an identifier and rewrites the index
    ///
    /// An existing entry for the identifier is overwritten in place; the log
    /// holds at most one entry per identifier.
    pub fn record_completion(
        &self,
        identifier: &ArticleId,
        status: FetchStatus,
        error: Option<&str>,
    ) -> StoreResult<()> {
        let mut entries = self.load_completions();

        let entry = CompletionEntry {
            id: Uuid::new_v4().to_string(),
            identifier: identifier.clone(),
            completed_at: Utc::now(),
            status,
            error: error.map(str::to_string),
        };

        match entries.iter_mut().find(|e| &e.identifier == identifier) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        save_array(&self.data_dir.join(COMPLETIONS_FILE), &entries)
    }

    /// Returns true iff the identifier has a success-status completion entry
    pub fn is_completed(&self, identifier: &ArticleId) -> bool {
        self.load_completions()
            .iter()
            .any(|e| &e.identifier == identifier && e.status == FetchStatus::Success)
    }

    /// Appends an attempt entry to the audit log
    pub fn append_attempt(&self, entry: AttemptEntry) -> StoreResult<()> {
        let path = self.data_dir.join(ATTEMPTS_FILE);
        let mut entries: Vec<AttemptEntry> = load_array_tolerant(&path);
        entries.push(entry);
        save_array(&path, &entries)
    }

    /// Appends a successful extraction to the record log
    pub fn append_record(&self, record: StoredRecord) -> StoreResult<()> {
        let path = self.data_dir.join(RECORDS_FILE);
        let mut entries: Vec<StoredRecord> = load_array_tolerant(&path);
        entries.push(record);
        save_array(&path, &entries)
    }

    /// Appends a link batch to the history ring buffer, keeping only the
    /// most recent `history_limit` entries
    pub fn append_link_history(&self, entry: LinkHistoryEntry) -> StoreResult<()> {
        let path = self.data_dir.join(LINK_HISTORY_FILE);
        let mut entries: Vec<LinkHistoryEntry> = load_array_tolerant(&path);
        entries.push(entry);

        if entries.len() > self.history_limit {
            let excess = entries.len() - self.history_limit;
            entries.drain(..excess);
        }

        save_array(&path, &entries)
    }

    /// Loads the link history, most recent last
    pub fn load_link_history(&self) -> Vec<LinkHistoryEntry> {
        load_array_tolerant(&self.data_dir.join(LINK_HISTORY_FILE))
    }

    /// Loads the record log
    pub fn load_records(&self) -> Vec<StoredRecord> {
        load_array_tolerant(&self.data_dir.join(RECORDS_FILE))
    }

    /// Aggregate status counts from the completion index
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats::default();
        for entry in self.load_completions() {
            match entry.status {
                FetchStatus::Success => stats.success += 1,
                FetchStatus::Failed => stats.failed += 1,
                FetchStatus::Error => stats.error += 1,
            }
        }
        stats
    }
}

/// Reads a JSON array file; a missing file yields an empty vector
fn load_array<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

/// Like [`load_array`], but degrades a corrupt file to empty with a warning
fn load_array_tolerant<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match load_array(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to load {}, treating as empty: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Writes a pretty-printed JSON array through a temp-file rename
fn save_array<T: Serialize>(path: &Path, entries: &[T]) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> ArticleStore {
        ArticleStore::open(dir.path(), 100).unwrap()
    }

    #[test]
    fn test_empty_store_loads_empty_index() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(store.load_completions().is_empty());
        assert_eq!(store.stats().total(), 0);
    }

    #[test]
    fn test_record_and_check_completion() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = ArticleId::new("Some_Film");

        store
            .record_completion(&id, FetchStatus::Success, None)
            .unwrap();

        assert!(store.is_completed(&id));
        assert_eq!(store.load_completions().len(), 1);
    }

    #[test]
    fn test_is_completed_requires_success() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = ArticleId::new("Broken_Film");

        store
            .record_completion(&id, FetchStatus::Failed, Some("Plot section not found or empty."))
            .unwrap();

        assert!(!store.is_completed(&id));
        assert_eq!(store.load_completions().len(), 1);
    }

    #[test]
    fn test_is_completed_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = ArticleId::new("Some_Film");

        store
            .record_completion(&id, FetchStatus::Success, None)
            .unwrap();

        assert_eq!(store.is_completed(&id), store.is_completed(&id));
    }

    #[test]
    fn test_completion_upsert_keeps_one_entry() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let id = ArticleId::new("Retried_Film");

        store
            .record_completion(&id, FetchStatus::Error, Some("Request failed: timeout"))
            .unwrap();
        store
            .record_completion(&id, FetchStatus::Success, None)
            .unwrap();

        let entries = store.load_completions();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, FetchStatus::Success);
        assert_eq!(entries[0].error, None);
        assert!(store.is_completed(&id));
    }

    #[test]
    fn test_completions_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let id = ArticleId::new("Persisted_Film");

        {
            let store = open_store(&dir);
            store
                .record_completion(&id, FetchStatus::Success, None)
                .unwrap();
        }

        let store = open_store(&dir);
        assert!(store.is_completed(&id));
    }

    #[test]
    fn test_corrupt_completion_index_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(COMPLETIONS_FILE), "{not json]").unwrap();

        let store = open_store(&dir);
        assert!(store.load_completions().is_empty());

        // The store stays writable afterwards
        let id = ArticleId::new("After_Corruption");
        store
            .record_completion(&id, FetchStatus::Success, None)
            .unwrap();
        assert!(store.is_completed(&id));
    }

    #[test]
    fn test_attempts_accumulate() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        for n in 1..=3 {
            store
                .append_attempt(AttemptEntry {
                    attempt: n,
                    identifier: ArticleId::new(&format!("Film_{}", n)),
                    timestamp: Utc::now(),
                    status: FetchStatus::Success,
                    outcome: serde_json::json!({"status": "success"}),
                    depth: 0,
                })
                .unwrap();
        }

        let attempts: Vec<AttemptEntry> =
            load_array(&dir.path().join(ATTEMPTS_FILE)).unwrap();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[2].attempt, 3);
    }

    #[test]
    fn test_link_history_respects_limit() {
        let dir = TempDir::new().unwrap();
        let store = ArticleStore::open(dir.path(), 5).unwrap();

        for n in 0..8 {
            store
                .append_link_history(LinkHistoryEntry {
                    identifier: ArticleId::new(&format!("Film_{}", n)),
                    links: vec![],
                    depth: 0,
                    timestamp: Utc::now(),
                    count: 0,
                })
                .unwrap();
        }

        let history = store.load_link_history();
        assert_eq!(history.len(), 5);
        // Oldest entries were dropped
        assert_eq!(history[0].identifier, ArticleId::new("Film_3"));
        assert_eq!(history[4].identifier, ArticleId::new("Film_7"));
    }

    #[test]
    fn test_stats_counts_by_status() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .record_completion(&ArticleId::new("A"), FetchStatus::Success, None)
            .unwrap();
        store
            .record_completion(&ArticleId::new("B"), FetchStatus::Success, None)
            .unwrap();
        store
            .record_completion(&ArticleId::new("C"), FetchStatus::Failed, Some("no plot"))
            .unwrap();
        store
            .record_completion(&ArticleId::new("D"), FetchStatus::Error, Some("timeout"))
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.success, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.error, 1);
        assert_eq!(stats.total(), 4);
    }
}
