//! Bounded navigation of a single browsing context

use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::browser::{BrowserError, BrowsingContext, RequestPolicy};
use crate::crawl_engine::page_timeout::with_page_timeout;

/// Hides the most common automation tell before any site script runs.
pub const STEALTH_SHIM: &str = r"
Object.defineProperty(Navigator.prototype, 'webdriver', {
    get: () => undefined,
    configurable: true,
});
";

/// Navigation did not produce a usable page.
///
/// The context has already been closed when this is returned.
#[derive(Debug, thiserror::Error)]
#[error("Navigation to {url} failed: {source}")]
pub struct NavigationFailure {
    pub url: String,
    #[source]
    pub source: BrowserError,
}

impl NavigationFailure {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.source, BrowserError::Timeout { .. })
    }
}

/// Install the stealth shim and the request policy on a fresh context.
///
/// Must run before the first `goto`: the shim is registered as an init
/// script, so it applies to every document the context loads afterwards.
/// Both are best effort: failures are logged and the context is still usable.
pub async fn prepare_context<C: BrowsingContext>(context: &C, stealth: bool, policy: RequestPolicy) {
    if stealth && let Err(e) = context.add_init_script(STEALTH_SHIM).await {
        debug!("Stealth shim not applied: {}", e);
    }
    if let Err(e) = context.intercept_requests(policy).await {
        warn!("Request interception not installed: {}", e);
    }
}

/// Navigate `context` to `url` and wait for `marker` to appear.
///
/// `nav_timeout` bounds the whole sequence; `marker_timeout` bounds the
/// marker wait on its own. On failure the context is closed before the
/// error is returned, so callers only ever hold contexts that loaded.
pub async fn navigate<C: BrowsingContext>(
    context: C,
    url: &str,
    marker: &str,
    nav_timeout: Duration,
    marker_timeout: Duration,
) -> Result<C, NavigationFailure> {
    trace!(url, marker, "Navigating");
    let loaded = with_page_timeout(
        async {
            context.goto(url).await?;
            context.wait_for_selector(marker, marker_timeout).await
        },
        nav_timeout,
        "Navigation",
    )
    .await;

    match loaded {
        Ok(()) => {
            debug!(url, "Page loaded");
            Ok(context)
        }
        Err(source) => {
            if let Err(e) = context.close().await
                && !e.is_already_closed()
            {
                debug!("Failed to close context after navigation failure: {}", e);
            }
            Err(NavigationFailure {
                url: url.to_string(),
                source,
            })
        }
    }
}
