//! Builder methods available for all states
//!
//! Optional settings can be supplied before or after the required fields.

use std::time::Duration;

use super::builder::HarvestConfigBuilder;
use super::types::RetryPolicy;

impl<State> HarvestConfigBuilder<State> {
    /// Number of list pages walked in the discovery phase (pages `1..=n`).
    #[must_use]
    pub fn list_pages(mut self, pages: u32) -> Self {
        self.settings.list_pages = pages;
        self
    }

    /// Continue the most recent run under `output_dir` instead of starting a new one.
    ///
    /// Falls back to a fresh run when no previous run exists.
    #[must_use]
    pub fn resume(mut self, resume: bool) -> Self {
        self.settings.resume = resume;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.settings.headless = headless;
        self
    }

    /// Look up a supplementary icon for every article (best effort).
    #[must_use]
    pub fn supplementary_images(mut self, enabled: bool) -> Self {
        self.settings.supplementary_images = enabled;
        self
    }

    /// Abort image, media and font requests on article contexts.
    #[must_use]
    pub fn block_heavy_resources(mut self, enabled: bool) -> Self {
        self.settings.block_heavy_resources = enabled;
        self
    }

    #[must_use]
    pub fn stealth(mut self, enabled: bool) -> Self {
        self.settings.stealth = enabled;
        self
    }

    /// Records per persisted batch file (validated non-zero at `build()`).
    #[must_use]
    pub fn storage_batch_size(mut self, size: usize) -> Self {
        self.settings.storage_batch_size = size;
        self
    }

    /// Links per phase-2 work batch. Independent of `storage_batch_size`.
    #[must_use]
    pub fn work_batch_size(mut self, size: usize) -> Self {
        self.settings.work_batch_size = size;
        self
    }

    /// Pages a browser instance serves before it is recycled.
    #[must_use]
    pub fn session_page_budget(mut self, pages: usize) -> Self {
        self.settings.session_page_budget = pages;
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.settings.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn marker_timeout(mut self, timeout: Duration) -> Self {
        self.settings.marker_timeout = timeout;
        self
    }

    #[must_use]
    pub fn trigger_timeout(mut self, timeout: Duration) -> Self {
        self.settings.trigger_timeout = timeout;
        self
    }

    #[must_use]
    pub fn capture_deadline(mut self, deadline: Duration) -> Self {
        self.settings.capture_deadline = deadline;
        self
    }

    #[must_use]
    pub fn page_cooldown(mut self, cooldown: Duration) -> Self {
        self.settings.page_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn article_cooldown(mut self, cooldown: Duration) -> Self {
        self.settings.article_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn batch_cooldown(mut self, cooldown: Duration) -> Self {
        self.settings.batch_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn session_cooldown(mut self, cooldown: Duration) -> Self {
        self.settings.session_cooldown = cooldown;
        self
    }

    /// Set every cooldown at once. Handy for tests and for polite-but-fast local mirrors.
    #[must_use]
    pub fn all_cooldowns(mut self, cooldown: Duration) -> Self {
        self.settings.page_cooldown = cooldown;
        self.settings.article_cooldown = cooldown;
        self.settings.batch_cooldown = cooldown;
        self.settings.session_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.settings.retry = policy;
        self
    }

    /// Substring identifying the signed download URL among observed responses.
    #[must_use]
    pub fn signed_url_marker(mut self, marker: impl Into<String>) -> Self {
        self.settings.signed_url_marker = marker.into();
        self
    }

    #[must_use]
    pub fn trigger_selector(mut self, selector: impl Into<String>) -> Self {
        self.settings.trigger_selector = selector.into();
        self
    }

    #[must_use]
    pub fn article_marker(mut self, selector: impl Into<String>) -> Self {
        self.settings.article_marker = selector.into();
        self
    }

    #[must_use]
    pub fn list_marker(mut self, selector: impl Into<String>) -> Self {
        self.settings.list_marker = selector.into();
        self
    }
}
