//! Getter methods for `HarvestConfig`

use std::path::Path;
use std::time::Duration;

use super::types::{HarvestConfig, RetryPolicy};

impl HarvestConfig {
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// URL of catalog list page `page` (1-based).
    #[must_use]
    pub fn list_page_url(&self, page: u32) -> String {
        format!("{}/page/{page}/?0", self.site_url)
    }

    #[must_use]
    pub fn list_pages(&self) -> u32 {
        self.settings.list_pages
    }

    #[must_use]
    pub fn resume(&self) -> bool {
        self.settings.resume
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.settings.headless
    }

    #[must_use]
    pub fn supplementary_images(&self) -> bool {
        self.settings.supplementary_images
    }

    #[must_use]
    pub fn block_heavy_resources(&self) -> bool {
        self.settings.block_heavy_resources
    }

    #[must_use]
    pub fn stealth(&self) -> bool {
        self.settings.stealth
    }

    #[must_use]
    pub fn storage_batch_size(&self) -> usize {
        self.settings.storage_batch_size
    }

    #[must_use]
    pub fn work_batch_size(&self) -> usize {
        self.settings.work_batch_size
    }

    #[must_use]
    pub fn session_page_budget(&self) -> usize {
        self.settings.session_page_budget
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        self.settings.navigation_timeout
    }

    #[must_use]
    pub fn marker_timeout(&self) -> Duration {
        self.settings.marker_timeout
    }

    #[must_use]
    pub fn trigger_timeout(&self) -> Duration {
        self.settings.trigger_timeout
    }

    #[must_use]
    pub fn capture_deadline(&self) -> Duration {
        self.settings.capture_deadline
    }

    #[must_use]
    pub fn page_cooldown(&self) -> Duration {
        self.settings.page_cooldown
    }

    #[must_use]
    pub fn article_cooldown(&self) -> Duration {
        self.settings.article_cooldown
    }

    #[must_use]
    pub fn batch_cooldown(&self) -> Duration {
        self.settings.batch_cooldown
    }

    #[must_use]
    pub fn session_cooldown(&self) -> Duration {
        self.settings.session_cooldown
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.settings.retry
    }

    #[must_use]
    pub fn signed_url_marker(&self) -> &str {
        &self.settings.signed_url_marker
    }

    #[must_use]
    pub fn trigger_selector(&self) -> &str {
        &self.settings.trigger_selector
    }

    #[must_use]
    pub fn article_marker(&self) -> &str {
        &self.settings.article_marker
    }

    #[must_use]
    pub fn list_marker(&self) -> &str {
        &self.settings.list_marker
    }
}
