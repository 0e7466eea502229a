//! Scripted in-memory browser for the harvester test suite
//!
//! `FakeSite` maps URLs to canned HTML and, per article, to the popup the
//! download trigger opens. A popup emits its scripted responses once the
//! capture engine has subscribed to them.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::Mutex;
use scraper::{Html, Selector};
use signed_link_harvester::browser::{
    BrowserError, BrowserInstance, BrowserLauncher, BrowserResult, BrowsingContext,
    ObservedResponse, RequestPolicy,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

pub const SITE: &str = "https://catalog.test";

/// What the download trigger of one article opens.
#[derive(Debug, Clone)]
pub struct PopupScript {
    pub start_url: String,
    /// `(delay before emitting, response url)`, in order.
    pub responses: Vec<(Duration, String)>,
}

impl PopupScript {
    /// Intermediate page, a mirror redirect, then the signed URL.
    pub fn redirect_chain(signed_url: &str) -> Self {
        let step = Duration::from_millis(10);
        Self {
            start_url: format!("{SITE}/download/"),
            responses: vec![
                (step, format!("{SITE}/download/")),
                (step, "https://mirror.test/redirect".to_string()),
                (step, signed_url.to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    popups: HashMap<String, Vec<PopupScript>>,
    hanging: HashSet<String>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// The trigger of `article_url` opens exactly this popup.
    pub fn popup(mut self, article_url: impl Into<String>, script: PopupScript) -> Self {
        self.popups.insert(article_url.into(), vec![script]);
        self
    }

    /// The trigger of `article_url` opens one more popup, after the others.
    pub fn extra_popup(mut self, article_url: impl Into<String>, script: PopupScript) -> Self {
        self.popups.entry(article_url.into()).or_default().push(script);
        self
    }

    /// Navigation to `url` never completes.
    pub fn hanging(mut self, url: impl Into<String>) -> Self {
        self.hanging.insert(url.into());
        self
    }

    /// A catalog of `pages` list pages with `per_page` articles each; every
    /// article's trigger leads to [`signed_url_for`] its URL.
    pub fn catalog(pages: u32, per_page: usize) -> Self {
        let mut site = Self::new();
        for page in 1..=pages {
            let articles: Vec<(String, String)> = (1..=per_page)
                .map(|i| {
                    let slug = format!("tool-{page}-{i}");
                    (format!("Tool {page}-{i} Free Download"), format!("/{slug}/"))
                })
                .collect();
            site = site.page(list_page_url(page), list_page_html(&articles));

            for (title, path) in &articles {
                let url = format!("{SITE}{path}");
                let name = title.trim_end_matches(" Free Download");
                site = site
                    .page(url.clone(), article_html(name))
                    .popup(url.clone(), PopupScript::redirect_chain(&signed_url_for(&url)));
            }
        }
        site
    }
}

pub fn list_page_url(page: u32) -> String {
    format!("{SITE}/page/{page}/?0")
}

pub fn signed_url_for(article_url: &str) -> String {
    let slug = article_url.trim_end_matches('/').rsplit('/').next().unwrap_or("file");
    format!("https://files.test/{slug}.zip?md5=abc&expires=1700000000")
}

pub fn list_page_html(articles: &[(String, String)]) -> String {
    let posts: String = articles
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="post"><h2 class="title"><a href="{href}">{title}</a></h2>
                   <div class="post-info"><a href="/category/software/">Software</a></div></div>"#
            )
        })
        .collect();
    format!("<html><body>{posts}</body></html>")
}

pub fn article_html(name: &str) -> String {
    format!(
        r#"<html><body>
            <div class="post-content clear-block">
              <p>{name} Free Download</p>
              <p>{name} is a useful program.</p>
              <p><img src="/images/{name}.png"></p>
              <ul><li>Feature</li></ul>
              <ul>
                <li>Software Full Name: {name}</li>
                <li>Full Setup Size: 42 MB</li>
              </ul>
              <button class="btn">Download</button>
            </div>
        </body></html>"#
    )
}

/// Article page whose download button is missing.
pub fn article_html_without_trigger(name: &str) -> String {
    article_html(name).replace(r#"<button class="btn">Download</button>"#, "")
}

#[derive(Default)]
pub struct FakeStats {
    pub launches: AtomicUsize,
    pub browser_closes: AtomicUsize,
    pub contexts_opened: AtomicUsize,
    pub contexts_closed: AtomicUsize,
    /// Fail this many launches before succeeding.
    pub failing_launches: AtomicUsize,
    pub fail_all_launches: AtomicBool,
    /// Report "already closed" from every browser close.
    pub close_reports_closed: AtomicBool,
    /// `open_context` calls so far, across every browser.
    pub open_calls: AtomicUsize,
    /// The browser serving this (1-based) `open_context` call crashes; 0 never.
    pub crash_at_open: AtomicUsize,
    pub popups: Mutex<Vec<FakeContext>>,
    /// Contexts handed out by `open_context`, in order.
    pub opened: Mutex<Vec<FakeContext>>,
    pub visited: Mutex<Vec<String>>,
}

impl FakeStats {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn browser_closes(&self) -> usize {
        self.browser_closes.load(Ordering::SeqCst)
    }

    pub fn popups(&self) -> Vec<FakeContext> {
        self.popups.lock().clone()
    }

    pub fn opened(&self) -> Vec<FakeContext> {
        self.opened.lock().clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

#[derive(Clone)]
pub struct FakeLauncher {
    site: Arc<FakeSite>,
    pub stats: Arc<FakeStats>,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            stats: Arc::new(FakeStats::default()),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Instance = FakeBrowser;

    async fn launch(&self) -> BrowserResult<FakeBrowser> {
        if self.stats.fail_all_launches.load(Ordering::SeqCst) {
            return Err(BrowserError::Launch("no browser available".to_string()));
        }
        let pending_failures = self.stats.failing_launches.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.stats.failing_launches.store(pending_failures - 1, Ordering::SeqCst);
            return Err(BrowserError::Launch("transient launch failure".to_string()));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeBrowser::with_stats(Arc::clone(&self.site), Arc::clone(&self.stats)))
    }
}

pub struct FakeBrowser {
    site: Arc<FakeSite>,
    stats: Arc<FakeStats>,
    contexts: broadcast::Sender<FakeContext>,
    closed: bool,
    crashed: AtomicBool,
}

/// What chromiumoxide reports once the browser process is gone.
fn connection_lost() -> BrowserError {
    BrowserError::Protocol("channel closed: receiver dropped".to_string())
}

impl FakeBrowser {
    pub fn new(site: FakeSite) -> Self {
        Self::with_stats(Arc::new(site), Arc::new(FakeStats::default()))
    }

    fn with_stats(site: Arc<FakeSite>, stats: Arc<FakeStats>) -> Self {
        let (contexts, _) = broadcast::channel(16);
        Self {
            site,
            stats,
            contexts,
            closed: false,
            crashed: AtomicBool::new(false),
        }
    }

    pub fn stats(&self) -> &Arc<FakeStats> {
        &self.stats
    }

    /// Active new-context subscriptions.
    pub fn context_listeners(&self) -> usize {
        self.contexts.receiver_count()
    }
}

#[async_trait]
impl BrowserInstance for FakeBrowser {
    type Context = FakeContext;

    async fn open_context(&self) -> BrowserResult<FakeContext> {
        if self.closed {
            return Err(BrowserError::Closed("browser".to_string()));
        }
        let call = self.stats.open_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.stats.crash_at_open.load(Ordering::SeqCst) {
            self.crashed.store(true, Ordering::SeqCst);
        }
        if self.crashed.load(Ordering::SeqCst) {
            return Err(connection_lost());
        }
        self.stats.contexts_opened.fetch_add(1, Ordering::SeqCst);
        let context = FakeContext::new(
            Arc::clone(&self.site),
            Arc::clone(&self.stats),
            self.contexts.clone(),
            None,
        );
        self.stats.opened.lock().push(context.clone());
        Ok(context)
    }

    async fn watch_contexts(&self) -> BrowserResult<BoxStream<'static, FakeContext>> {
        if self.crashed.load(Ordering::SeqCst) {
            return Err(connection_lost());
        }
        let stream = BroadcastStream::new(self.contexts.subscribe())
            .filter_map(|event| async move { event.ok() });
        Ok(stream.boxed())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stats.browser_closes.fetch_add(1, Ordering::SeqCst);
        if self.crashed.load(Ordering::SeqCst) {
            return Err(connection_lost());
        }
        if self.stats.close_reports_closed.load(Ordering::SeqCst) {
            return Err(BrowserError::Closed("browser".to_string()));
        }
        Ok(())
    }
}

struct ContextInner {
    site: Arc<FakeSite>,
    stats: Arc<FakeStats>,
    browser_contexts: broadcast::Sender<FakeContext>,
    url: Mutex<Option<String>>,
    responses: broadcast::Sender<ObservedResponse>,
    policy: Mutex<Option<RequestPolicy>>,
    init_scripts: Mutex<Vec<String>>,
    /// `init_script` and `goto <url>` in call order.
    events: Mutex<Vec<String>>,
    closed: AtomicBool,
}

#[derive(Clone)]
pub struct FakeContext {
    inner: Arc<ContextInner>,
}

impl FakeContext {
    fn new(
        site: Arc<FakeSite>,
        stats: Arc<FakeStats>,
        browser_contexts: broadcast::Sender<FakeContext>,
        url: Option<String>,
    ) -> Self {
        let (responses, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(ContextInner {
                site,
                stats,
                browser_contexts,
                url: Mutex::new(url),
                responses,
                policy: Mutex::new(None),
                init_scripts: Mutex::new(Vec::new()),
                events: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Active response subscriptions on this context.
    pub fn response_listeners(&self) -> usize {
        self.inner.responses.receiver_count()
    }

    pub fn policy(&self) -> Option<RequestPolicy> {
        self.inner.policy.lock().clone()
    }

    pub fn init_scripts(&self) -> Vec<String> {
        self.inner.init_scripts.lock().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.inner.events.lock().clone()
    }

    fn current_html(&self) -> String {
        self.inner
            .url
            .lock()
            .as_ref()
            .and_then(|url| self.inner.site.pages.get(url).cloned())
            .unwrap_or_else(|| "<html><body></body></html>".to_string())
    }

    fn has_selector(&self, selector: &str) -> BrowserResult<bool> {
        let parsed = Selector::parse(selector)
            .map_err(|e| BrowserError::Protocol(format!("bad selector {selector}: {e:?}")))?;
        let document = Html::parse_document(&self.current_html());
        Ok(document.select(&parsed).next().is_some())
    }

    fn open_popup(&self, script: PopupScript) {
        let popup = FakeContext::new(
            Arc::clone(&self.inner.site),
            Arc::clone(&self.inner.stats),
            self.inner.browser_contexts.clone(),
            Some(script.start_url.clone()),
        );
        self.inner.stats.popups.lock().push(popup.clone());
        let _ = self.inner.browser_contexts.send(popup.clone());

        tokio::spawn(async move {
            // Responses are only emitted to an observer, as a real page would
            // only be observed after attaching.
            let mut waited = Duration::ZERO;
            while popup.response_listeners() == 0 && waited < Duration::from_secs(2) {
                tokio::time::sleep(Duration::from_millis(5)).await;
                waited += Duration::from_millis(5);
            }
            for (delay, url) in script.responses {
                tokio::time::sleep(delay).await;
                if popup.is_closed() {
                    break;
                }
                let _ = popup.inner.responses.send(ObservedResponse::new(url, 200));
            }
        });
    }
}

#[async_trait]
impl BrowsingContext for FakeContext {
    async fn goto(&self, url: &str) -> BrowserResult<()> {
        if self.is_closed() {
            return Err(BrowserError::Closed("context".to_string()));
        }
        self.inner.stats.visited.lock().push(url.to_string());
        self.inner.events.lock().push(format!("goto {url}"));
        if self.inner.site.hanging.contains(url) {
            futures::future::pending::<()>().await;
        }
        *self.inner.url.lock() = Some(url.to_string());
        let status = if self.inner.site.pages.contains_key(url) { 200 } else { 404 };
        let _ = self.inner.responses.send(ObservedResponse::new(url, status));
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        if self.has_selector(selector)? {
            Ok(())
        } else {
            Err(BrowserError::timeout(format!("Waiting for '{selector}'"), timeout))
        }
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        if !self.has_selector(selector)? {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        let scripts = self
            .inner
            .url
            .lock()
            .as_ref()
            .and_then(|url| self.inner.site.popups.get(url).cloned())
            .unwrap_or_default();
        for script in scripts {
            self.open_popup(script);
        }
        Ok(())
    }

    async fn content(&self) -> BrowserResult<String> {
        if self.is_closed() {
            return Err(BrowserError::Closed("context".to_string()));
        }
        Ok(self.current_html())
    }

    async fn evaluate(&self, _script: &str) -> BrowserResult<serde_json::Value> {
        Ok(serde_json::Value::Bool(true))
    }

    async fn add_init_script(&self, script: &str) -> BrowserResult<()> {
        self.inner.init_scripts.lock().push(script.to_string());
        self.inner.events.lock().push("init_script".to_string());
        Ok(())
    }

    async fn intercept_requests(&self, policy: RequestPolicy) -> BrowserResult<()> {
        *self.inner.policy.lock() = Some(policy);
        Ok(())
    }

    async fn responses(&self) -> BrowserResult<BoxStream<'static, ObservedResponse>> {
        let stream = BroadcastStream::new(self.inner.responses.subscribe())
            .filter_map(|event| async move { event.ok() });
        Ok(stream.boxed())
    }

    async fn url(&self) -> Option<String> {
        self.inner.url.lock().clone()
    }

    async fn close(self) -> BrowserResult<()> {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            self.inner.stats.contexts_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// A builder pointed at the fake catalog with every cooldown at zero.
pub fn test_builder(
    output_dir: &std::path::Path,
) -> signed_link_harvester::config::HarvestConfigBuilder<signed_link_harvester::config::WithSiteUrl>
{
    signed_link_harvester::HarvestConfig::builder()
        .output_dir(output_dir)
        .site_url(SITE)
        .all_cooldowns(Duration::ZERO)
        .supplementary_images(false)
        .navigation_timeout(Duration::from_secs(5))
        .marker_timeout(Duration::from_secs(2))
        .trigger_timeout(Duration::from_secs(2))
        .capture_deadline(Duration::from_secs(3))
        .retry_policy(signed_link_harvester::RetryPolicy {
            max_attempts: 2,
            delay: Duration::ZERO,
        })
}

pub fn test_config(output_dir: &std::path::Path) -> signed_link_harvester::HarvestConfig {
    test_builder(output_dir).build().expect("test config is valid")
}
