//! Output module for crawl summaries and reports

pub mod stats;

pub use stats::{load_statistics, print_history, print_statistics, print_summary, RunSummary};
