//! Browser lifecycle management for a harvest run
//!
//! Owns at most one live browser instance. The instance is launched lazily on
//! the first `acquire()`, counted against a page budget, and recycled (close,
//! cooldown, relaunch) once the budget is spent so that Chrome's memory stays
//! bounded over long runs.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::browser::{BrowserInstance, BrowserLauncher, BrowserResult};

/// Manager for the single browser instance used by a run
///
/// # Lifecycle
/// - Nothing is launched on creation
/// - `acquire()` launches on first use and returns the live instance afterwards
/// - `record_page()` counts a page served by the instance
/// - `restart_if_exceeded()` recycles the instance once the budget is reached
/// - `release()` closes the instance; safe to call any number of times
pub struct BrowserSessionManager<L: BrowserLauncher> {
    launcher: L,
    current: Option<L::Instance>,
    pages_served: usize,
    page_budget: usize,
    cooldown: Duration,
    launches: usize,
}

impl<L: BrowserLauncher> BrowserSessionManager<L> {
    #[must_use]
    pub fn new(launcher: L, page_budget: usize, cooldown: Duration) -> Self {
        Self {
            launcher,
            current: None,
            pages_served: 0,
            page_budget: page_budget.max(1),
            cooldown,
            launches: 0,
        }
    }

    /// Return the live instance, launching one if necessary.
    ///
    /// Launch failures propagate; the caller decides whether to retry.
    pub async fn acquire(&mut self) -> BrowserResult<&L::Instance> {
        let instance = match self.current.take() {
            Some(instance) => instance,
            None => {
                let instance = self.launcher.launch().await?;
                self.launches += 1;
                self.pages_served = 0;
                info!(launches = self.launches, "Browser session started");
                instance
            }
        };
        let instance: &L::Instance = self.current.insert(instance);
        Ok(instance)
    }

    /// Count one page (list page or article) served by the current instance.
    pub fn record_page(&mut self) {
        self.pages_served += 1;
        debug!(
            pages_served = self.pages_served,
            page_budget = self.page_budget,
            "Page recorded against browser budget"
        );
    }

    /// Recycle the instance once it has served `page_budget` pages.
    ///
    /// Returns whether a restart happened.
    pub async fn restart_if_exceeded(&mut self) -> BrowserResult<bool> {
        if self.current.is_none() || self.pages_served < self.page_budget {
            return Ok(false);
        }

        info!(
            pages_served = self.pages_served,
            "Browser page budget reached, recycling instance"
        );
        self.release().await;
        tokio::time::sleep(self.cooldown).await;
        self.acquire().await?;
        Ok(true)
    }

    /// Close the current instance, if any.
    ///
    /// Errors saying the instance is already gone are expected after a crash
    /// and only logged at debug level.
    pub async fn release(&mut self) {
        if let Some(mut instance) = self.current.take() {
            match instance.close().await {
                Ok(()) => debug!("Browser session released"),
                Err(e) if e.is_already_closed() => {
                    debug!("Browser was already closed on release: {}", e);
                }
                Err(e) => warn!("Failed to close browser on release: {}", e),
            }
        }
        self.pages_served = 0;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn pages_served(&self) -> usize {
        self.pages_served
    }

    /// Total number of instances launched by this manager.
    #[must_use]
    pub fn launches(&self) -> usize {
        self.launches
    }
}
