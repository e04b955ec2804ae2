//! Statistics and run summaries from the article store
//!
//! This module reads back the persisted crawl data and renders it for the
//! stats and history CLI modes, plus the end-of-run summary.

use crate::store::{ArticleStore, LinkHistoryEntry, StoreStats};
use std::time::Duration;

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Completion counts by status, as persisted in the store
    pub stats: StoreStats,

    /// Articles dispatched for processing during this run
    pub processed: usize,

    /// The configured item budget
    pub target: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Processing rate in articles per minute
    pub fn rate_per_minute(&self) -> f64 {
        let minutes = self.elapsed.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.processed as f64 / minutes
        } else {
            0.0
        }
    }
}

/// Prints the end-of-run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");
    println!(
        "Processed: {} / {} articles in {:.1}s ({:.1} articles/min)",
        summary.processed,
        summary.target,
        summary.elapsed.as_secs_f64(),
        summary.rate_per_minute()
    );
    println!();
    print_statistics(&summary.stats);
}

/// Prints completion statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStats) {
    let total = stats.total();

    println!("=== Store Statistics ===\n");
    println!("Completions:");
    println!("  Success: {}", stats.success);
    println!("  Failed:  {}", stats.failed);
    println!("  Error:   {}", stats.error);
    println!("  Total:   {}", total);
    println!();

    let success_rate = if total > 0 {
        (stats.success as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} articles)",
        success_rate, stats.success, total
    );
}

/// Prints the link discovery history to stdout, most recent last
///
/// # Arguments
///
/// * `history` - The link history entries to display
pub fn print_history(history: &[LinkHistoryEntry]) {
    println!("=== Link History ({} entries) ===\n", history.len());

    for entry in history {
        println!(
            "{} '{}' (depth {}): {} links",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.identifier,
            entry.depth,
            entry.count
        );
        for link in &entry.links {
            println!("  - {}", link);
        }
        println!();
    }
}

/// Loads completion statistics from the store
pub fn load_statistics(store: &ArticleStore) -> StoreStats {
    store.stats()
}
