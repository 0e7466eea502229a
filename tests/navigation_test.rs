mod common;

use common::*;
use signed_link_harvester::browser::{BrowserInstance, RequestPolicy};
use signed_link_harvester::page_extractor::{STEALTH_SHIM, navigate, prepare_context};
use std::time::Duration;

fn article_url() -> String {
    format!("{SITE}/tool-1-1/")
}

#[tokio::test]
async fn stealth_shim_is_registered_before_the_first_navigation() {
    let browser = FakeBrowser::new(FakeSite::new().page(article_url(), article_html("Tool")));
    let context = browser.open_context().await.unwrap();

    prepare_context(&context, true, RequestPolicy::block_heavy_resources()).await;
    let context = navigate(
        context,
        &article_url(),
        "div.post-content",
        Duration::from_secs(5),
        Duration::from_secs(2),
    )
    .await
    .unwrap();

    assert_eq!(
        context.events(),
        vec!["init_script".to_string(), format!("goto {}", article_url())]
    );
    assert_eq!(context.init_scripts(), vec![STEALTH_SHIM.to_string()]);
    assert!(STEALTH_SHIM.contains("webdriver"));
    assert_eq!(context.policy(), Some(RequestPolicy::block_heavy_resources()));
}

#[tokio::test]
async fn without_stealth_only_the_policy_is_installed() {
    let browser = FakeBrowser::new(FakeSite::new());
    let context = browser.open_context().await.unwrap();

    prepare_context(&context, false, RequestPolicy::allow_all()).await;

    assert!(context.init_scripts().is_empty());
    assert_eq!(context.policy(), Some(RequestPolicy::allow_all()));
}

#[tokio::test]
async fn failed_navigation_closes_the_context() {
    let browser = FakeBrowser::new(FakeSite::new().page(article_url(), "<html><body></body></html>"));
    let context = browser.open_context().await.unwrap();
    let handle = context.clone();

    let failure = navigate(
        context,
        &article_url(),
        "div.post-content",
        Duration::from_secs(5),
        Duration::from_secs(2),
    )
    .await
    .err()
    .expect("marker is missing");

    assert!(failure.is_timeout());
    assert_eq!(failure.url, article_url());
    assert!(handle.is_closed());
}
