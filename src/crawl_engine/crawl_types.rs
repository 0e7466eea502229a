//! Error and summary types for harvest runs

use std::path::PathBuf;

use crate::browser::BrowserError;
use crate::checkpoint::CheckpointError;
use crate::page_extractor::NavigationFailure;

/// Convenience alias for Result with `HarvestError`
pub type HarvestResult<T> = Result<T, HarvestError>;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Navigation(#[from] NavigationFailure),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("Run failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<HarvestError>,
    },
}

impl HarvestError {
    /// Whether the browser itself is gone (launch failed, process crashed,
    /// CDP connection lost), which ends the current attempt instead of only
    /// skipping one link or page.
    #[must_use]
    pub fn is_browser_fatal(&self) -> bool {
        match self {
            Self::Browser(e) => matches!(e, BrowserError::Launch(_)) || e.is_connection_lost(),
            Self::Navigation(failure) => failure.source.is_connection_lost(),
            Self::Checkpoint(_) | Self::RetriesExhausted { .. } => false,
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSummary {
    pub run_dir: PathBuf,
    /// Links in the ledger.
    pub discovered: usize,
    /// Links marked processed in the ledger.
    pub processed: usize,
    /// Records stored by this run with a captured download URL.
    pub captured: usize,
    /// Links that failed in this run and stay unprocessed.
    pub skipped: usize,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}
