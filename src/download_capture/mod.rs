//! Download-link capture
//!
//! Clicking the download trigger makes the site open a secondary browsing
//! context which walks a redirect chain ending at a short-lived signed URL.
//! The engine watches every context opened after the click and reports the
//! first response whose URL carries the signed-URL marker.
//!
//! ```text
//! Idle -> Triggered -> Watching -> Resolved(url)
//!                              \-> TimedOut
//!   (any step)                 \-> Failed
//! ```

mod engine;
mod filter;

pub use engine::{CaptureSettings, DownloadCaptureEngine};
pub use filter::SignedUrlFilter;

/// Where a capture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Triggered,
    Watching,
    Resolved,
    TimedOut,
    Failed,
}

impl CaptureState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::TimedOut | Self::Failed)
    }
}

/// Result of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The first signed URL observed after the trigger.
    Resolved(String),
    /// No signed URL before the deadline.
    TimedOut,
    /// Trigger missing, click failed, or the browser stopped reporting contexts.
    Failed(String),
}

impl CaptureOutcome {
    /// The captured URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Resolved(url) => Some(url),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Resolved(url) => Some(url),
            _ => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> CaptureState {
        match self {
            Self::Resolved(_) => CaptureState::Resolved,
            Self::TimedOut => CaptureState::TimedOut,
            Self::Failed(_) => CaptureState::Failed,
        }
    }
}
