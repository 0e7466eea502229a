//! Progress reporting abstraction for harvest runs
//!
//! Defines the `HarvestProgress` trait for lifecycle event reporting, a
//! tracing-backed reporter used by the binary and a no-op implementation.

use std::path::Path;
use tracing::{info, warn};

use super::crawl_types::HarvestSummary;
use crate::checkpoint::CrawlState;
use crate::page_extractor::ArticleLink;

/// Trait for reporting harvest progress at key lifecycle events
pub trait HarvestProgress: Send + Sync {
    /// A run attempt started on `run_dir`
    fn report_run_started(&self, run_dir: &Path, attempt: u32);

    /// A list page was read; `added` of its `found` links were new
    fn report_page_discovered(&self, page_num: u32, found: usize, added: usize);

    /// A list page could not be read and will be retried on the next run
    fn report_page_failed(&self, page_num: u32, error: &str);

    /// Processing of one article started
    fn report_article_started(&self, link: &ArticleLink, position: usize, total: usize);

    /// An article record was persisted
    fn report_article_stored(&self, link: &ArticleLink, download_url: Option<&str>, state: &CrawlState);

    /// An article failed and stays unprocessed
    fn report_article_skipped(&self, link: &ArticleLink, error: &str);

    /// The run finished
    fn report_completed(&self, summary: &HarvestSummary);
}

/// Progress reporter that writes structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl HarvestProgress for TracingProgress {
    fn report_run_started(&self, run_dir: &Path, attempt: u32) {
        info!(attempt, run_dir = %run_dir.display(), "Harvest run started");
    }

    fn report_page_discovered(&self, page_num: u32, found: usize, added: usize) {
        info!(page_num, found, added, "List page read");
    }

    fn report_page_failed(&self, page_num: u32, error: &str) {
        warn!(page_num, "List page skipped: {}", error);
    }

    fn report_article_started(&self, link: &ArticleLink, position: usize, total: usize) {
        info!(position, total, url = %link.url, "Processing article: {}", link.title);
    }

    fn report_article_stored(&self, link: &ArticleLink, download_url: Option<&str>, state: &CrawlState) {
        info!(
            processed = state.processed_articles,
            total = state.total_articles,
            captured = download_url.is_some(),
            "Stored article: {}",
            link.title
        );
    }

    fn report_article_skipped(&self, link: &ArticleLink, error: &str) {
        warn!(url = %link.url, "Article skipped: {}", error);
    }

    fn report_completed(&self, summary: &HarvestSummary) {
        info!(
            processed = summary.processed,
            discovered = summary.discovered,
            captured = summary.captured,
            skipped = summary.skipped,
            attempts = summary.attempts,
            "Harvest finished: {}/{} articles processed",
            summary.processed,
            summary.discovered
        );
    }
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl HarvestProgress for NoOpProgress {
    #[inline(always)]
    fn report_run_started(&self, _run_dir: &Path, _attempt: u32) {}

    #[inline(always)]
    fn report_page_discovered(&self, _page_num: u32, _found: usize, _added: usize) {}

    #[inline(always)]
    fn report_page_failed(&self, _page_num: u32, _error: &str) {}

    #[inline(always)]
    fn report_article_started(&self, _link: &ArticleLink, _position: usize, _total: usize) {}

    #[inline(always)]
    fn report_article_stored(&self, _link: &ArticleLink, _download_url: Option<&str>, _state: &CrawlState) {}

    #[inline(always)]
    fn report_article_skipped(&self, _link: &ArticleLink, _error: &str) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &HarvestSummary) {}
}
