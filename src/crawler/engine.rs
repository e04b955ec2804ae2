//! Crawl engine - recursive discovery over the article link graph
//!
//! The traversal is an explicit worklist rather than recursion: each frame
//! carries its own branch-visited set (the identifiers on the path from the
//! seed), so sibling branches never see each other's path markings and
//! backtracking needs no cleanup. Global state lives in a single
//! [`TraversalContext`].
//!
//! Persistence happens immediately after each fetch, before any expansion,
//! so an external kill loses at most the in-flight article.

use crate::config::Config;
use crate::crawler::fetcher::FetchClient;
use crate::extract::{ArticleId, FetchOutcome};
use crate::output::RunSummary;
use crate::store::{ArticleStore, AttemptEntry, LinkHistoryEntry, StoredRecord};
use crate::CrawlError;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A courtesy pause is inserted before every Nth child of an article
const COURTESY_INTERVAL: usize = 10;

/// Shared traversal state for one crawl run
///
/// The processed count gates the item budget; it is kept as an atomic so the
/// budget stays a single consistently-updated counter even if fetches are
/// ever spread across workers.
struct TraversalContext {
    processed: HashSet<ArticleId>,
    global_visited: HashSet<ArticleId>,
    processed_count: AtomicUsize,
}

impl TraversalContext {
    fn new() -> Self {
        Self {
            processed: HashSet::new(),
            global_visited: HashSet::new(),
            processed_count: AtomicUsize::new(0),
        }
    }

    fn count(&self) -> usize {
        self.processed_count.load(Ordering::Relaxed)
    }
}

/// One pending article on the worklist
struct Frame {
    id: ArticleId,
    depth: u32,
    /// Identifiers on the path from the seed to this frame's parent
    branch: HashSet<ArticleId>,
    /// Sleep the courtesy delay before fetching this frame
    pause: bool,
}

/// Orchestrates the crawl: guards, fetching, persistence, link expansion
pub struct CrawlEngine {
    config: Config,
    client: FetchClient,
    store: ArticleStore,
}

impl CrawlEngine {
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let client = FetchClient::new(&config.source, &config.user_agent)?;
        let store = ArticleStore::open(
            Path::new(&config.output.data_dir),
            config.output.history_limit,
        )?;

        Ok(Self {
            config,
            client,
            store,
        })
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    /// Runs the crawl from the configured seed to completion
    ///
    /// Completion means the item budget is exhausted or the seed's entire
    /// reachable subgraph (under the safety depth) has been visited. No
    /// single article failure aborts the run.
    pub async fn run(&self) -> RunSummary {
        let crawler = &self.config.crawler;
        let seed = ArticleId::new(&crawler.seed);
        tracing::info!(
            "Starting crawl from '{}' (budget: {} articles)",
            seed,
            crawler.max_items
        );

        let start = Instant::now();
        let mut ctx = TraversalContext::new();
        let mut stack = vec![Frame {
            id: seed,
            depth: 0,
            branch: HashSet::new(),
            pause: false,
        }];

        while let Some(frame) = stack.pop() {
            if frame.depth > crawler.max_safety_depth {
                tracing::warn!(
                    "Safety depth {} exceeded at '{}', pruning branch",
                    crawler.max_safety_depth,
                    frame.id
                );
                continue;
            }

            if ctx.global_visited.contains(&frame.id) {
                tracing::debug!("'{}' already dispatched in this run, skipping", frame.id);
                continue;
            }

            if ctx.count() >= crawler.max_items {
                tracing::info!("Item budget reached ({}), stopping", crawler.max_items);
                break;
            }

            if crawler.prevent_cycles && frame.branch.contains(&frame.id) {
                tracing::debug!("'{}' already on current branch, skipping cycle", frame.id);
                continue;
            }

            if crawler.prevent_duplicates && ctx.processed.contains(&frame.id) {
                tracing::debug!("'{}' already processed, skipping", frame.id);
                continue;
            }

            ctx.processed.insert(frame.id.clone());
            ctx.global_visited.insert(frame.id.clone());
            let count = ctx.processed_count.fetch_add(1, Ordering::Relaxed) + 1;

            tracing::info!(
                "[{}/{}] Processing '{}' (depth {})",
                count,
                crawler.max_items,
                frame.id,
                frame.depth
            );

            // Resume support: a durably successful article is never re-fetched
            if self.store.is_completed(&frame.id) {
                tracing::info!("'{}' already completed in store, skipping", frame.id);
                continue;
            }

            if frame.pause {
                tokio::time::sleep(Duration::from_millis(crawler.courtesy_delay_ms)).await;
            }

            let outcome = self.client.fetch_and_extract(&frame.id).await;
            // Persist before expanding so a crash mid-subtree loses nothing
            self.persist_outcome(&frame, count, &outcome);

            match &outcome {
                FetchOutcome::Success(_) => {
                    self.expand_links(&frame, &ctx, &mut stack).await;
                }
                FetchOutcome::Failed { reason } => {
                    tracing::info!("'{}' failed: {}", frame.id, reason);
                }
                FetchOutcome::Error { message } => {
                    tracing::warn!("'{}' errored: {}", frame.id, message);
                }
            }
        }

        let summary = RunSummary {
            stats: self.store.stats(),
            processed: ctx.count(),
            target: crawler.max_items,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "Crawl finished: {} articles processed in {:?}",
            summary.processed,
            summary.elapsed
        );
        summary
    }

    /// Writes the completion entry, attempt entry, and (on success) the full
    /// record. Store failures are logged and never abort the crawl.
    fn persist_outcome(&self, frame: &Frame, attempt: usize, outcome: &FetchOutcome) {
        let status = outcome.status();

        if let Err(e) =
            self.store
                .record_completion(&frame.id, status, outcome.error_message())
        {
            tracing::warn!("Failed to record completion for '{}': {}", frame.id, e);
        }

        let outcome_json = match serde_json::to_value(outcome) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize outcome for '{}': {}", frame.id, e);
                serde_json::Value::Null
            }
        };

        if let Err(e) = self.store.append_attempt(AttemptEntry {
            attempt,
            identifier: frame.id.clone(),
            timestamp: Utc::now(),
            status,
            outcome: outcome_json,
            depth: frame.depth,
        }) {
            tracing::warn!("Failed to append attempt for '{}': {}", frame.id, e);
        }

        if let FetchOutcome::Success(record) = outcome {
            if let Err(e) = self.store.append_record(StoredRecord {
                record_id: Uuid::new_v4().to_string(),
                identifier: frame.id.clone(),
                record: record.clone(),
            }) {
                tracing::warn!("Failed to append record for '{}': {}", frame.id, e);
            }
        }
    }

    /// Discovers outbound links and pushes unprocessed children onto the
    /// worklist in document order
    async fn expand_links(&self, frame: &Frame, ctx: &TraversalContext, stack: &mut Vec<Frame>) {
        let crawler = &self.config.crawler;

        let links = match self.client.fetch_links(&frame.id).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Failed to discover links from '{}': {}", frame.id, e);
                return;
            }
        };

        if links.is_empty() {
            tracing::debug!("No outbound article links found on '{}'", frame.id);
            return;
        }

        tracing::info!("Found {} outbound article links on '{}'", links.len(), frame.id);

        if let Err(e) = self.store.append_link_history(LinkHistoryEntry {
            identifier: frame.id.clone(),
            links: links.clone(),
            depth: frame.depth,
            timestamp: Utc::now(),
            count: links.len(),
        }) {
            tracing::warn!("Failed to append link history for '{}': {}", frame.id, e);
        }

        let cap = if crawler.process_all_links {
            links.len()
        } else {
            crawler.max_links_per_item
        };

        // The child's branch set is the parent's path plus the parent itself;
        // each child gets its own copy so siblings stay isolated.
        let mut path = frame.branch.clone();
        path.insert(frame.id.clone());

        let mut children = Vec::new();
        for (i, child) in links.into_iter().take(cap).enumerate() {
            if ctx.processed.contains(&child) {
                continue;
            }
            children.push(Frame {
                id: child,
                depth: frame.depth + 1,
                branch: path.clone(),
                pause: i > 0 && i % COURTESY_INTERVAL == 0,
            });
        }

        // Reversed so the stack pops children in document order
        stack.extend(children.into_iter().rev());
    }
}
