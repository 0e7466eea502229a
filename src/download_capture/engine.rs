use futures::StreamExt;
use futures::stream::{BoxStream, SelectAll};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::{CaptureOutcome, CaptureState, SignedUrlFilter};
use crate::browser::{BrowserInstance, BrowsingContext, ObservedResponse};
use crate::config::HarvestConfig;

/// Knobs for one capture attempt.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub trigger_selector: String,
    pub trigger_timeout: Duration,
    /// Measured from the click.
    pub deadline: Duration,
    pub marker: String,
}

impl CaptureSettings {
    #[must_use]
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            trigger_selector: config.trigger_selector().to_string(),
            trigger_timeout: config.trigger_timeout(),
            deadline: config.capture_deadline(),
            marker: config.signed_url_marker().to_string(),
        }
    }
}

/// Ephemeral state of one capture: the secondary contexts seen so far and
/// where the state machine is.
struct CaptureSession<C: BrowsingContext> {
    state: CaptureState,
    observed: Vec<C>,
    watching_since: Option<Instant>,
}

impl<C: BrowsingContext> CaptureSession<C> {
    fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            observed: Vec::new(),
            watching_since: None,
        }
    }

    fn transition(&mut self, next: CaptureState) {
        trace!(from = ?self.state, to = ?next, "Capture state transition");
        if next == CaptureState::Watching {
            self.watching_since = Some(Instant::now());
        }
        self.state = next;
    }

    fn observe(&mut self, context: C) {
        self.observed.push(context);
    }

    /// Close every observed secondary context.
    ///
    /// Runs on every exit path so no context outlives the attempt that saw it.
    async fn close_observed(&mut self) {
        for context in self.observed.drain(..) {
            if let Err(e) = context.close().await
                && !e.is_already_closed()
            {
                debug!("Failed to close secondary context: {}", e);
            }
        }
    }
}

/// Drives the capture state machine against one browser instance.
#[derive(Debug, Clone)]
pub struct DownloadCaptureEngine {
    settings: CaptureSettings,
    filter: SignedUrlFilter,
}

impl DownloadCaptureEngine {
    #[must_use]
    pub fn new(settings: CaptureSettings) -> Self {
        let filter = SignedUrlFilter::new(settings.marker.clone());
        Self { settings, filter }
    }

    #[must_use]
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Click the trigger on `primary` and wait for the signed URL.
    ///
    /// `primary` must already show the article. It is left open; every
    /// context the click spawned is closed before this returns, whatever the
    /// outcome.
    pub async fn capture<B: BrowserInstance>(
        &self,
        instance: &B,
        primary: &B::Context,
    ) -> CaptureOutcome {
        let mut session = CaptureSession::new();
        let outcome = self.run(instance, primary, &mut session).await;
        session.transition(outcome.state());

        let elapsed = session.watching_since.map(|t| t.elapsed());
        let secondary_contexts = session.observed.len();
        session.close_observed().await;

        match &outcome {
            CaptureOutcome::Resolved(url) => {
                info!(?elapsed, secondary_contexts, "Captured signed URL: {}", url);
            }
            CaptureOutcome::TimedOut => warn!(
                deadline = ?self.settings.deadline,
                secondary_contexts,
                "No signed URL observed before the deadline"
            ),
            CaptureOutcome::Failed(reason) => warn!("Download capture failed: {}", reason),
        }
        outcome
    }

    async fn run<B: BrowserInstance>(
        &self,
        instance: &B,
        primary: &B::Context,
        session: &mut CaptureSession<B::Context>,
    ) -> CaptureOutcome {
        // Subscribe before clicking so the popup cannot slip past.
        let mut contexts = match instance.watch_contexts().await {
            Ok(stream) => stream,
            Err(e) => return CaptureOutcome::Failed(format!("cannot watch new contexts: {e}")),
        };

        let selector = self.settings.trigger_selector.as_str();
        if let Err(e) = primary
            .wait_for_selector(selector, self.settings.trigger_timeout)
            .await
        {
            return CaptureOutcome::Failed(format!("trigger '{selector}' not available: {e}"));
        }
        if let Err(e) = primary.click(selector).await {
            return CaptureOutcome::Failed(format!("clicking trigger '{selector}' failed: {e}"));
        }
        session.transition(CaptureState::Triggered);

        session.transition(CaptureState::Watching);
        match tokio::time::timeout(self.settings.deadline, self.watch(&mut contexts, session)).await
        {
            Ok(outcome) => outcome,
            Err(_) => CaptureOutcome::TimedOut,
        }
        // `contexts` and every response stream are dropped here, which
        // releases their subscriptions.
    }

    async fn watch<C: BrowsingContext>(
        &self,
        contexts: &mut BoxStream<'static, C>,
        session: &mut CaptureSession<C>,
    ) -> CaptureOutcome {
        let mut responses: SelectAll<BoxStream<'static, ObservedResponse>> = SelectAll::new();

        loop {
            tokio::select! {
                next = contexts.next() => {
                    let Some(context) = next else {
                        return CaptureOutcome::Failed(
                            "browser stopped reporting new contexts".to_string(),
                        );
                    };

                    match context.responses().await {
                        Ok(stream) => responses.push(stream),
                        Err(e) => debug!("Cannot observe responses of new context: {}", e),
                    }

                    // A context opened straight at the signed URL has no
                    // response left to observe.
                    let opened_at = context.url().await;
                    session.observe(context);
                    if let Some(url) = opened_at {
                        debug!(url = %url, "Observing secondary context");
                        if self.filter.matches(&url) {
                            return CaptureOutcome::Resolved(url);
                        }
                    }
                }
                Some(response) = responses.next(), if !responses.is_empty() => {
                    if self.filter.matches(&response.url) {
                        return CaptureOutcome::Resolved(response.url);
                    }
                    trace!(status = response.status, url = %response.url, "Ignoring response");
                }
            }
        }
    }
}
