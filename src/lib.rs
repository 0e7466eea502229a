pub mod browser;
pub mod browser_profile;
pub mod browser_session;
pub mod browser_setup;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod crawl_engine;
pub mod download_capture;
pub mod logging;
pub mod page_extractor;
pub mod utils;

pub use browser::{
    BrowserError, BrowserInstance, BrowserLauncher, BrowserResult, BrowsingContext,
    ChromiumLauncher, ObservedResponse, RequestPolicy,
};
pub use browser_session::BrowserSessionManager;
pub use checkpoint::{CheckpointError, CheckpointStore, CrawlState};
pub use config::{HarvestConfig, RetryPolicy};
pub use crawl_engine::{
    Harvester, HarvestError, HarvestProgress, HarvestResult, HarvestSummary, NoOpProgress,
    TracingProgress,
};
pub use download_capture::{CaptureOutcome, CaptureSettings, DownloadCaptureEngine};
pub use page_extractor::schema::*;

/// Run a complete harvest with a Chromium browser.
pub async fn harvest(config: HarvestConfig) -> HarvestResult<HarvestSummary> {
    let launcher = ChromiumLauncher::new(config.headless());
    Harvester::new(config, launcher).run().await
}
