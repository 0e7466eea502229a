//! Main harvest orchestration logic
//!
//! Coordinates a run in two phases:
//! - Phase 1 walks the catalog list pages and fills the ledger
//! - Phase 2 processes every unprocessed link, one at a time, in work batches
//!
//! Both phases share one browser session that is recycled on its page budget.
//! The whole two-phase attempt is retried a bounded number of times; because
//! every step is checkpointed, a retry continues where the last attempt stopped.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::article_processor::ArticleProcessor;
use super::crawl_types::{HarvestResult, HarvestSummary};
use super::progress::{HarvestProgress, TracingProgress};
use super::retry::run_with_retry;
use crate::browser::{BrowserInstance, BrowserLauncher, BrowsingContext};
use crate::browser_session::BrowserSessionManager;
use crate::checkpoint::{CheckpointStore, CrawlState, new_run_id};
use crate::config::HarvestConfig;
use crate::page_extractor::{ArticleLink, extract_article_links, navigate, prepare_context};

/// Per-attempt counters of phase 2.
#[derive(Debug, Clone, Copy, Default)]
struct AttemptStats {
    captured: usize,
    skipped: usize,
}

/// Runs a complete harvest against one catalog site.
pub struct Harvester<L: BrowserLauncher, P: HarvestProgress = TracingProgress> {
    config: HarvestConfig,
    session: Mutex<BrowserSessionManager<L>>,
    processor: ArticleProcessor,
    progress: P,
}

impl<L: BrowserLauncher> Harvester<L, TracingProgress> {
    #[must_use]
    pub fn new(config: HarvestConfig, launcher: L) -> Self {
        Self::with_progress(config, launcher, TracingProgress)
    }
}

impl<L: BrowserLauncher, P: HarvestProgress> Harvester<L, P> {
    #[must_use]
    pub fn with_progress(config: HarvestConfig, launcher: L, progress: P) -> Self {
        let session = BrowserSessionManager::new(
            launcher,
            config.session_page_budget(),
            config.session_cooldown(),
        );
        let processor = ArticleProcessor::from_config(&config);
        Self {
            config,
            session: Mutex::new(session),
            processor,
            progress,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run both phases under the configured retry policy.
    ///
    /// Fails only when the store cannot be opened or every attempt failed.
    pub async fn run(&self) -> HarvestResult<HarvestSummary> {
        let store = self.open_store().await?;
        let store_ref = &store;

        let (attempts, stats) = run_with_retry(self.config.retry_policy(), |attempt| async move {
            self.run_attempt(store_ref, attempt)
                .await
                .map(|stats| (attempt, stats))
        })
        .await?;

        let links = store.links().await;
        let summary = HarvestSummary {
            run_dir: store.run_dir().to_path_buf(),
            discovered: links.len(),
            processed: links.iter().filter(|link| link.processed).count(),
            captured: stats.captured,
            skipped: stats.skipped,
            attempts,
        };
        self.progress.report_completed(&summary);
        Ok(summary)
    }

    /// Resume the latest run when asked to and one exists, else start a new one.
    async fn open_store(&self) -> HarvestResult<CheckpointStore> {
        let root = self.config.output_dir();
        let batch_size = self.config.storage_batch_size();

        if self.config.resume() {
            if let Some(run_dir) = CheckpointStore::latest_run(root).await? {
                return Ok(CheckpointStore::open(&run_dir, batch_size).await?);
            }
            info!("No previous run under {}, starting a new one", root.display());
        }
        Ok(CheckpointStore::create(root, &new_run_id(), batch_size).await?)
    }

    async fn run_attempt(&self, store: &CheckpointStore, attempt: u32) -> HarvestResult<AttemptStats> {
        let mut session = self.session.lock().await;
        self.progress.report_run_started(store.run_dir(), attempt);

        let mut state = store.load_state().await;
        debug!(?state, "Checkpoint state loaded");

        let result = async {
            self.discover(&mut session, store, &mut state).await?;
            self.process_pending(&mut session, store, &mut state).await
        }
        .await;

        // The browser never outlives an attempt, whatever its outcome.
        session.release().await;
        result
    }

    /// Phase 1: fill the ledger from list pages `1..=list_pages`.
    ///
    /// Pages that already contributed links (resumed run or earlier attempt)
    /// are skipped. A failed page is logged and left for the next run.
    async fn discover(
        &self,
        session: &mut BrowserSessionManager<L>,
        store: &CheckpointStore,
        state: &mut CrawlState,
    ) -> HarvestResult<()> {
        let done = store.discovered_pages().await;

        for page_num in 1..=self.config.list_pages() {
            if done.contains(&page_num) {
                debug!(page_num, "List page already in ledger, skipping");
                continue;
            }

            let url = self.config.list_page_url(page_num);
            match self.read_list_page(session, &url, page_num).await {
                Ok(links) => {
                    let found = links.len();
                    match store.append_links(state, links, page_num).await {
                        Ok(added) => self.progress.report_page_discovered(page_num, found, added),
                        Err(e) => self.progress.report_page_failed(page_num, &e.to_string()),
                    }
                }
                Err(e) if e.is_browser_fatal() => return Err(e),
                Err(e) => self.progress.report_page_failed(page_num, &e.to_string()),
            }

            session.record_page();
            session.restart_if_exceeded().await?;
            tokio::time::sleep(self.config.page_cooldown()).await;
        }
        Ok(())
    }

    async fn read_list_page(
        &self,
        session: &mut BrowserSessionManager<L>,
        url: &str,
        page_num: u32,
    ) -> HarvestResult<Vec<ArticleLink>> {
        let instance = session.acquire().await?;
        let context = instance.open_context().await?;
        prepare_context(
            &context,
            self.processor.stealth(),
            self.processor.request_policy().clone(),
        )
        .await;

        let context = navigate(
            context,
            url,
            self.config.list_marker(),
            self.config.navigation_timeout(),
            self.config.marker_timeout(),
        )
        .await?;

        let html = context.content().await;
        if let Err(e) = context.close().await
            && !e.is_already_closed()
        {
            debug!("Failed to close list page context: {}", e);
        }
        Ok(extract_article_links(&html?, url, page_num))
    }

    /// Phase 2: process unprocessed links in ledger order.
    ///
    /// A link is marked processed only once its record is stored. Failed
    /// links are skipped and picked up again by the next run.
    async fn process_pending(
        &self,
        session: &mut BrowserSessionManager<L>,
        store: &CheckpointStore,
        state: &mut CrawlState,
    ) -> HarvestResult<AttemptStats> {
        let pending = store.unprocessed_links().await;
        let total = pending.len();
        let mut stats = AttemptStats::default();
        info!(
            pending = total,
            discovered = state.total_articles,
            "Processing unprocessed articles"
        );

        let work_batch_size = self.config.work_batch_size();
        for (batch_no, batch) in pending.chunks(work_batch_size).enumerate() {
            if batch_no > 0 {
                debug!(batch_no, "Work batch finished, cooling down");
                tokio::time::sleep(self.config.batch_cooldown()).await;
            }

            for (offset, link) in batch.iter().enumerate() {
                let position = batch_no * work_batch_size + offset + 1;
                self.progress.report_article_started(link, position, total);

                let outcome = {
                    let instance = session.acquire().await?;
                    self.processor.process(instance, link).await
                };
                session.record_page();

                match outcome {
                    Ok(record) => {
                        let download_url = record.data.download_url.clone();
                        match store.append_article(state, record).await {
                            Ok(_) => {
                                if let Err(e) = store.mark_processed(&link.url).await {
                                    warn!(url = %link.url, "Record stored but ledger not updated: {}", e);
                                }
                                if download_url.is_some() {
                                    stats.captured += 1;
                                }
                                self.progress
                                    .report_article_stored(link, download_url.as_deref(), state);
                            }
                            Err(e) => {
                                stats.skipped += 1;
                                self.progress.report_article_skipped(link, &e.to_string());
                            }
                        }
                    }
                    Err(e) if e.is_browser_fatal() => return Err(e),
                    Err(e) => {
                        stats.skipped += 1;
                        self.progress.report_article_skipped(link, &e.to_string());
                    }
                }

                session.restart_if_exceeded().await?;
                if offset + 1 < batch.len() {
                    tokio::time::sleep(self.config.article_cooldown()).await;
                }
            }
        }

        Ok(stats)
    }
}
