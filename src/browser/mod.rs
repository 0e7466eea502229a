//! Browser automation capability
//!
//! The harvester never talks to Chrome directly. Everything it needs from a
//! browser is expressed by three traits:
//!
//! - [`BrowserLauncher`] launches isolated instances with a fixed profile
//! - [`BrowserInstance`] opens contexts and reports contexts the site opens
//! - [`BrowsingContext`] is one page/tab: navigation, DOM waits, clicks,
//!   evaluation, init scripts, request interception and response observation
//!
//! [`chromium`] implements them over the Chrome DevTools Protocol. Tests drive
//! the same code paths with a scripted in-memory browser.

pub mod chromium;
mod error;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::time::Duration;

pub use chromium::{ChromiumBrowser, ChromiumContext, ChromiumLauncher};
pub use error::{BrowserError, BrowserResult};

/// A network response seen on a browsing context.
///
/// Redirect hops are reported as responses too, so a signed URL that only
/// ever appears as a `Location` target is still observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedResponse {
    pub url: String,
    pub status: i64,
}

impl ObservedResponse {
    #[must_use]
    pub fn new(url: impl Into<String>, status: i64) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }
}

/// Coarse classification of an outgoing request, used by interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Document,
    Script,
    Stylesheet,
    Image,
    Media,
    Font,
    Xhr,
    Other,
}

/// Verdict for one intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    Continue,
    Abort,
}

/// Per-request continue/abort policy installed on a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPolicy {
    blocked: Vec<ResourceClass>,
}

impl RequestPolicy {
    /// Let every request through.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Abort images, media and fonts; none of them are needed to read an
    /// article or to follow the download redirect chain.
    #[must_use]
    pub fn block_heavy_resources() -> Self {
        Self {
            blocked: vec![ResourceClass::Image, ResourceClass::Media, ResourceClass::Font],
        }
    }

    #[must_use]
    pub fn decide(&self, class: ResourceClass) -> InterceptDecision {
        if self.blocked.contains(&class) {
            InterceptDecision::Abort
        } else {
            InterceptDecision::Continue
        }
    }

    #[must_use]
    pub fn blocks_anything(&self) -> bool {
        !self.blocked.is_empty()
    }
}

/// One page/tab-like unit within a browser instance.
#[async_trait]
pub trait BrowsingContext: Send + Sync + Sized + 'static {
    /// Navigate and wait for the load event.
    async fn goto(&self, url: &str) -> BrowserResult<()>;

    /// Wait until `selector` matches at least one element, or fail after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Serialized DOM of the current document.
    async fn content(&self) -> BrowserResult<String>;

    /// Evaluate a script in the page and return its JSON value.
    async fn evaluate(&self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Register `script` to run in every document this context loads from
    /// now on, before any of the page's own scripts.
    async fn add_init_script(&self, script: &str) -> BrowserResult<()>;

    /// Route every outgoing request through `policy`.
    async fn intercept_requests(&self, policy: RequestPolicy) -> BrowserResult<()>;

    /// Subscribe to responses on this context.
    ///
    /// The subscription lives exactly as long as the returned stream.
    async fn responses(&self) -> BrowserResult<BoxStream<'static, ObservedResponse>>;

    /// Current URL, if the context has navigated anywhere.
    async fn url(&self) -> Option<String>;

    async fn close(self) -> BrowserResult<()>;
}

/// A running, isolated browser.
#[async_trait]
pub trait BrowserInstance: Send + Sync + 'static {
    type Context: BrowsingContext;

    /// Open a fresh blank context.
    async fn open_context(&self) -> BrowserResult<Self::Context>;

    /// Subscribe to contexts created on this instance from now on (popups,
    /// `target=_blank` forms, `window.open`).
    ///
    /// The event source is instance-scoped; the subscription is released when
    /// the returned stream is dropped.
    async fn watch_contexts(&self) -> BrowserResult<BoxStream<'static, Self::Context>>;

    /// Close the instance. Calling it on an already closed instance is not an error.
    async fn close(&mut self) -> BrowserResult<()>;
}

/// Factory for browser instances with a fixed capability profile.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Instance: BrowserInstance;

    async fn launch(&self) -> BrowserResult<Self::Instance>;
}
