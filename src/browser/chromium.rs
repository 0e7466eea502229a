//! Chrome DevTools Protocol implementation of the browser capability

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
    FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventRequestWillBeSent, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::browser_protocol::target::{EventTargetCreated, TargetId};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{
    BrowserError, BrowserInstance, BrowserLauncher, BrowserResult, BrowsingContext,
    InterceptDecision, ObservedResponse, RequestPolicy, ResourceClass,
};
use crate::browser_profile::{PROFILE_PREFIX, create_unique_profile_with_prefix};
use crate::browser_setup::launch_browser;

/// How often DOM waits re-check for their selector.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a freshly created target may take to become attachable.
const TARGET_ATTACH_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches [`ChromiumBrowser`] instances, each with a private profile.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Instance = ChromiumBrowser;

    async fn launch(&self) -> BrowserResult<ChromiumBrowser> {
        let profile = create_unique_profile_with_prefix(PROFILE_PREFIX)
            .map_err(|e| BrowserError::Launch(format!("{e:#}")))?;

        let (browser, handler) = launch_browser(self.headless, profile.path())
            .await
            .map_err(|e| BrowserError::Launch(format!("{e:#}")))?;

        info!("Browser launched with profile {}", profile.path().display());
        Ok(ChromiumBrowser::new(browser, handler, profile.into_path()))
    }
}

/// A running Chrome process plus the task driving its CDP connection.
///
/// The handler task MUST be aborted once the browser is gone, and the
/// profile directory removed after the process exited. `close()` does both;
/// `Drop` is the fallback for early exits.
pub struct ChromiumBrowser {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
    closed: bool,
}

impl ChromiumBrowser {
    fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser: Arc::new(browser),
            handler,
            user_data_dir: Some(user_data_dir),
            closed: false,
        }
    }

    /// Remove the profile directory (blocking; also used from `Drop`).
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up browser profile: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!("Failed to clean up profile {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("ChromiumBrowser dropped without close() - removing profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Find the `Page` handle for a target that was just announced.
///
/// `Target.targetCreated` fires before chromiumoxide has attached to the
/// target, so the page list is polled briefly.
async fn resolve_page(browser: &Browser, target_id: &TargetId) -> Option<Page> {
    let started = Instant::now();
    while started.elapsed() < TARGET_ATTACH_TIMEOUT {
        match browser.pages().await {
            Ok(pages) => {
                if let Some(page) = pages.into_iter().find(|p| p.target_id() == target_id) {
                    return Some(page);
                }
            }
            Err(e) => {
                trace!("Listing pages failed while resolving new target: {}", e);
                return None;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    debug!("New target {:?} never became attachable", target_id);
    None
}

#[async_trait]
impl BrowserInstance for ChromiumBrowser {
    type Context = ChromiumContext;

    async fn open_context(&self) -> BrowserResult<ChromiumContext> {
        if self.closed {
            return Err(BrowserError::Closed("browser".to_string()));
        }
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromiumContext::new(page))
    }

    async fn watch_contexts(&self) -> BrowserResult<BoxStream<'static, ChromiumContext>> {
        let created = self.browser.event_listener::<EventTargetCreated>().await?;
        let browser = Arc::clone(&self.browser);

        let contexts = created.filter_map(move |event| {
            let browser = Arc::clone(&browser);
            async move {
                if event.target_info.r#type != "page" {
                    return None;
                }
                debug!(url = %event.target_info.url, "Browser opened a new page target");
                resolve_page(&browser, &event.target_info.target_id)
                    .await
                    .map(ChromiumContext::new)
            }
        });

        Ok(contexts.boxed())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Watch streams hold clones of the Arc; they are all dropped by the
        // time a session releases its browser.
        if let Some(browser) = Arc::get_mut(&mut self.browser) {
            if let Err(e) = browser.close().await {
                let err = BrowserError::from(e);
                if !err.is_already_closed() {
                    warn!("Failed to close browser cleanly: {}", err);
                }
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        } else {
            warn!("Browser has outstanding references, leaving process shutdown to Drop");
        }

        self.handler.abort();
        self.cleanup_temp_dir();
        Ok(())
    }
}

/// One Chrome tab.
pub struct ChromiumContext {
    page: Page,
    interceptor: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumContext {
    fn new(page: Page) -> Self {
        Self {
            page,
            interceptor: Mutex::new(None),
        }
    }
}

impl Drop for ChromiumContext {
    fn drop(&mut self) {
        if let Some(task) = self.interceptor.lock().take() {
            task.abort();
        }
    }
}

fn classify(resource_type: &ResourceType) -> ResourceClass {
    match resource_type {
        ResourceType::Document => ResourceClass::Document,
        ResourceType::Script => ResourceClass::Script,
        ResourceType::Stylesheet => ResourceClass::Stylesheet,
        ResourceType::Image => ResourceClass::Image,
        ResourceType::Media => ResourceClass::Media,
        ResourceType::Font => ResourceClass::Font,
        ResourceType::Xhr | ResourceType::Fetch => ResourceClass::Xhr,
        _ => ResourceClass::Other,
    }
}

#[async_trait]
impl BrowsingContext for ChromiumContext {
    async fn goto(&self, url: &str) -> BrowserResult<()> {
        match self.page.goto(url).await {
            Ok(_) => Ok(()),
            Err(e) => match BrowserError::from(e) {
                // A crashed browser must not look like a bad page.
                lost if lost.is_connection_lost() => Err(lost),
                other => Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: other.to_string(),
                }),
            },
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let started = Instant::now();
        loop {
            match self.page.find_element(selector).await {
                Ok(_) => {
                    trace!(selector, elapsed = ?started.elapsed(), "Selector present");
                    return Ok(());
                }
                Err(_) if started.elapsed() >= timeout => {
                    return Err(BrowserError::timeout(format!("Waiting for '{selector}'"), timeout));
                }
                Err(_) => tokio::time::sleep(SELECTOR_POLL_INTERVAL).await,
            }
        }
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;
        Ok(())
    }

    async fn content(&self) -> BrowserResult<String> {
        Ok(self.page.content().await?)
    }

    async fn evaluate(&self, script: &str) -> BrowserResult<serde_json::Value> {
        let result = self.page.evaluate(script).await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn add_init_script(&self, script: &str) -> BrowserResult<()> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams {
                source: script.to_string(),
                include_command_line_api: None,
                world_name: None,
                run_immediately: None,
            })
            .await?;
        Ok(())
    }

    async fn intercept_requests(&self, policy: RequestPolicy) -> BrowserResult<()> {
        if !policy.blocks_anything() {
            return Ok(());
        }

        let mut paused = self.page.event_listener::<EventRequestPaused>().await?;
        self.page
            .execute(
                FetchEnableParams::builder()
                    .pattern(
                        RequestPattern::builder()
                            .url_pattern("*")
                            .request_stage(RequestStage::Request)
                            .build(),
                    )
                    .build(),
            )
            .await?;

        let page = self.page.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let outcome = match policy.decide(classify(&event.resource_type)) {
                    InterceptDecision::Continue => page
                        .execute(ContinueRequestParams::new(event.request_id.clone()))
                        .await
                        .map(|_| ()),
                    InterceptDecision::Abort => page
                        .execute(FailRequestParams::new(
                            event.request_id.clone(),
                            ErrorReason::BlockedByClient,
                        ))
                        .await
                        .map(|_| ()),
                };
                if let Err(e) = outcome {
                    trace!("Intercepted request could not be resolved: {}", e);
                }
            }
        });

        if let Some(previous) = self.interceptor.lock().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    async fn responses(&self) -> BrowserResult<BoxStream<'static, ObservedResponse>> {
        let received = self
            .page
            .event_listener::<EventResponseReceived>()
            .await?
            .map(|event| ObservedResponse::new(event.response.url.clone(), event.response.status));

        // Redirect hops never produce Network.responseReceived; their response
        // rides on the follow-up request instead.
        let redirects = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await?
            .filter_map(|event| async move {
                event
                    .redirect_response
                    .as_ref()
                    .map(|response| ObservedResponse::new(response.url.clone(), response.status))
            });

        Ok(stream::select(received, redirects).boxed())
    }

    async fn url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }

    async fn close(self) -> BrowserResult<()> {
        let page = self.page.clone();
        drop(self);
        match page.close().await {
            Ok(()) => Ok(()),
            Err(e) => {
                let err = BrowserError::from(e);
                if err.is_already_closed() { Ok(()) } else { Err(err) }
            }
        }
    }
}
