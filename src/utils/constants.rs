//! Shared configuration constants for the harvester
//!
//! Default values used by the config builder and the site extractors, kept in
//! one place to avoid magic numbers scattered across modules.

/// Catalog site crawled when no other site URL is supplied.
pub const DEFAULT_SITE_URL: &str = "https://getintopc.com";

/// Default number of list pages walked during discovery.
pub const DEFAULT_LIST_PAGES: u32 = 1;

/// Records per persisted batch file.
///
/// A batch file is sealed (by convention only) once this many records have
/// been appended and the next record opens a new file.
pub const DEFAULT_STORAGE_BATCH_SIZE: usize = 100;

/// Links processed between two long cooldown pauses in phase 2.
pub const DEFAULT_WORK_BATCH_SIZE: usize = 5;

/// Pages (list pages or articles) served by one browser before it is recycled.
///
/// Chrome's resident memory grows steadily over a long session; recycling
/// every few pages keeps multi-hundred-page runs bounded.
pub const DEFAULT_SESSION_PAGE_BUDGET: usize = 10;

/// Upper bound for a whole navigation (goto + structural marker).
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;

/// Upper bound for the structural marker to appear once the page has loaded.
pub const DEFAULT_MARKER_TIMEOUT_SECS: u64 = 30;

/// Upper bound for the download trigger control to appear.
pub const DEFAULT_TRIGGER_TIMEOUT_SECS: u64 = 15;

/// Deadline for the signed URL to show up after the trigger was clicked.
pub const DEFAULT_CAPTURE_DEADLINE_SECS: u64 = 60;

/// Pause after every list page in phase 1.
pub const DEFAULT_PAGE_COOLDOWN_MS: u64 = 1_500;

/// Pause after every article in phase 2.
pub const DEFAULT_ARTICLE_COOLDOWN_MS: u64 = 2_000;

/// Pause after every work batch in phase 2.
pub const DEFAULT_BATCH_COOLDOWN_MS: u64 = 10_000;

/// Pause between closing a spent browser and launching its replacement.
pub const DEFAULT_SESSION_COOLDOWN_MS: u64 = 3_000;

/// Attempts for the whole two-phase run (including the first).
pub const DEFAULT_RUN_ATTEMPTS: u32 = 3;

/// Fixed delay between two top-level run attempts.
pub const DEFAULT_RUN_RETRY_DELAY_SECS: u64 = 30;

/// Query-string marker carried by the site's signed download URLs.
pub const DEFAULT_SIGNED_URL_MARKER: &str = "expires";

/// Button that opens the intermediate download page.
pub const DEFAULT_TRIGGER_SELECTOR: &str = "button.btn";

/// Element that proves an article page finished rendering.
pub const ARTICLE_MARKER_SELECTOR: &str = "div.post-content";

/// Element that proves a list page finished rendering.
pub const LIST_MARKER_SELECTOR: &str = "h2.title";

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Chrome releases new stable versions ~every 4 weeks.
/// Update quarterly to stay within reasonable version window.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
