//! Core configuration types for a harvest run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::{
    ARTICLE_MARKER_SELECTOR, DEFAULT_ARTICLE_COOLDOWN_MS, DEFAULT_BATCH_COOLDOWN_MS,
    DEFAULT_CAPTURE_DEADLINE_SECS, DEFAULT_LIST_PAGES, DEFAULT_MARKER_TIMEOUT_SECS,
    DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_PAGE_COOLDOWN_MS, DEFAULT_RUN_ATTEMPTS,
    DEFAULT_RUN_RETRY_DELAY_SECS, DEFAULT_SESSION_COOLDOWN_MS, DEFAULT_SESSION_PAGE_BUDGET,
    DEFAULT_SIGNED_URL_MARKER, DEFAULT_STORAGE_BATCH_SIZE, DEFAULT_TRIGGER_SELECTOR,
    DEFAULT_TRIGGER_TIMEOUT_SECS, DEFAULT_WORK_BATCH_SIZE, LIST_MARKER_SELECTOR,
};

/// Bounded retry of the whole two-phase run.
///
/// `max_attempts` counts the first attempt; the delay between attempts is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RUN_ATTEMPTS,
            delay: Duration::from_secs(DEFAULT_RUN_RETRY_DELAY_SECS),
        }
    }
}

/// Everything tunable about a run except the two required fields.
///
/// Shared by the builder (every type state) and the finished config, so a
/// type-state transition only moves this value along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestSettings {
    pub(crate) list_pages: u32,
    pub(crate) resume: bool,
    pub(crate) headless: bool,
    pub(crate) supplementary_images: bool,
    pub(crate) block_heavy_resources: bool,
    pub(crate) stealth: bool,

    pub(crate) storage_batch_size: usize,
    pub(crate) work_batch_size: usize,
    pub(crate) session_page_budget: usize,

    /// Bound on goto plus marker wait for one navigation.
    pub(crate) navigation_timeout: Duration,
    /// Bound on the structural marker alone; shorter than `navigation_timeout`.
    pub(crate) marker_timeout: Duration,
    pub(crate) trigger_timeout: Duration,
    /// Measured from the moment the trigger was clicked.
    pub(crate) capture_deadline: Duration,

    pub(crate) page_cooldown: Duration,
    pub(crate) article_cooldown: Duration,
    pub(crate) batch_cooldown: Duration,
    pub(crate) session_cooldown: Duration,

    pub(crate) retry: RetryPolicy,

    pub(crate) signed_url_marker: String,
    pub(crate) trigger_selector: String,
    pub(crate) article_marker: String,
    pub(crate) list_marker: String,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            list_pages: DEFAULT_LIST_PAGES,
            resume: false,
            headless: true,
            supplementary_images: true,
            block_heavy_resources: true,
            stealth: true,
            storage_batch_size: DEFAULT_STORAGE_BATCH_SIZE,
            work_batch_size: DEFAULT_WORK_BATCH_SIZE,
            session_page_budget: DEFAULT_SESSION_PAGE_BUDGET,
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            marker_timeout: Duration::from_secs(DEFAULT_MARKER_TIMEOUT_SECS),
            trigger_timeout: Duration::from_secs(DEFAULT_TRIGGER_TIMEOUT_SECS),
            capture_deadline: Duration::from_secs(DEFAULT_CAPTURE_DEADLINE_SECS),
            page_cooldown: Duration::from_millis(DEFAULT_PAGE_COOLDOWN_MS),
            article_cooldown: Duration::from_millis(DEFAULT_ARTICLE_COOLDOWN_MS),
            batch_cooldown: Duration::from_millis(DEFAULT_BATCH_COOLDOWN_MS),
            session_cooldown: Duration::from_millis(DEFAULT_SESSION_COOLDOWN_MS),
            retry: RetryPolicy::default(),
            signed_url_marker: DEFAULT_SIGNED_URL_MARKER.to_string(),
            trigger_selector: DEFAULT_TRIGGER_SELECTOR.to_string(),
            article_marker: ARTICLE_MARKER_SELECTOR.to_string(),
            list_marker: LIST_MARKER_SELECTOR.to_string(),
        }
    }
}

/// Main configuration struct for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Root under which `run_<timestamp>` directories are created.
    pub(crate) output_dir: PathBuf,
    /// Catalog base URL without trailing slash.
    pub(crate) site_url: String,
    pub(crate) settings: HarvestSettings,
}
