//! Report types and the writer trait
//!
//! A [`CrawlReport`] is the complete, immutable result of one crawl. Writers
//! render it to a destination; they never see the live crawl.

use crate::state::FetchOutcome;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One recorded outcome with the pages that referenced its URL
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub outcome: FetchOutcome,
    pub referrers: Vec<Url>,
}

/// Result of a crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Number of fetches dispatched
    pub processed: usize,

    /// Number of errors counted while crawling
    pub errors: usize,

    /// Wall-clock time of the crawl
    pub elapsed: Duration,

    /// True if the crawl was stopped before all work finished
    pub interrupted: bool,

    /// Recorded outcomes, in arrival order
    pub entries: Vec<ReportEntry>,
}

impl CrawlReport {
    /// Entries with anything to report: a non-200 status, errors or issues
    pub fn problems(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_clean())
    }
}

/// Trait for report writers
pub trait ReportWriter {
    /// Renders the report to the writer's destination
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()>;
}

/// Human-readable reason phrase for a status code, empty for 0 or unknown codes
pub fn status_text(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}
