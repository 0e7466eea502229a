//! Harvest Engine Module
//!
//! Orchestration of a harvest run: list-page discovery, per-article
//! processing, bounded retry of the whole run and progress reporting.

pub mod article_processor;
pub mod crawl_types;
pub mod orchestrator;
pub mod page_timeout;
pub mod progress;
pub mod retry;

pub use article_processor::ArticleProcessor;
pub use crawl_types::{HarvestError, HarvestResult, HarvestSummary};
pub use orchestrator::Harvester;
pub use progress::{HarvestProgress, NoOpProgress, TracingProgress};
pub use retry::{RetryDecision, run_with_retry};
