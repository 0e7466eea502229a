use signed_link_harvester::{HarvestConfig, RetryPolicy};
use std::path::Path;
use std::time::Duration;

fn base() -> signed_link_harvester::config::HarvestConfigBuilder<signed_link_harvester::config::WithSiteUrl> {
    HarvestConfig::builder()
        .output_dir("/tmp/harvest")
        .site_url("https://catalog.example.com")
}

#[test]
fn defaults_describe_a_polite_headless_run() {
    let config = base().build().unwrap();

    assert_eq!(config.output_dir(), Path::new("/tmp/harvest"));
    assert_eq!(config.list_pages(), 1);
    assert!(!config.resume());
    assert!(config.headless());
    assert!(config.stealth());
    assert!(config.block_heavy_resources());
    assert!(config.supplementary_images());
    assert_eq!(config.storage_batch_size(), 100);
    assert_eq!(config.work_batch_size(), 5);
    assert_eq!(config.session_page_budget(), 10);
    assert_eq!(config.capture_deadline(), Duration::from_secs(60));
    assert!(config.marker_timeout() < config.navigation_timeout());
    assert_eq!(config.signed_url_marker(), "expires");
    assert_eq!(config.trigger_selector(), "button.btn");
    assert_eq!(config.retry_policy(), RetryPolicy::default());
    assert_eq!(config.retry_policy().max_attempts, 3);
    assert_eq!(config.retry_policy().delay, Duration::from_secs(30));
}

#[test]
fn site_url_is_normalized() {
    let config = HarvestConfig::builder()
        .output_dir("out")
        .site_url("catalog.example.com///")
        .build()
        .unwrap();
    assert_eq!(config.site_url(), "https://catalog.example.com");

    let config = HarvestConfig::builder()
        .output_dir("out")
        .site_url("http://catalog.example.com/")
        .build()
        .unwrap();
    assert_eq!(config.site_url(), "http://catalog.example.com");
}

#[test]
fn list_page_urls_follow_catalog_pattern() {
    let config = base().build().unwrap();
    assert_eq!(
        config.list_page_url(1),
        "https://catalog.example.com/page/1/?0"
    );
    assert_eq!(
        config.list_page_url(12),
        "https://catalog.example.com/page/12/?0"
    );
}

#[test]
fn settings_can_be_given_before_required_fields() {
    let config = HarvestConfig::builder()
        .list_pages(7)
        .output_dir("out")
        .work_batch_size(3)
        .site_url("catalog.example.com")
        .all_cooldowns(Duration::from_millis(5))
        .build()
        .unwrap();

    assert_eq!(config.list_pages(), 7);
    assert_eq!(config.work_batch_size(), 3);
    assert_eq!(config.page_cooldown(), Duration::from_millis(5));
    assert_eq!(config.article_cooldown(), Duration::from_millis(5));
    assert_eq!(config.batch_cooldown(), Duration::from_millis(5));
    assert_eq!(config.session_cooldown(), Duration::from_millis(5));
}

#[test]
fn invalid_settings_are_rejected() {
    assert!(base().storage_batch_size(0).build().is_err());
    assert!(base().work_batch_size(0).build().is_err());
    assert!(base().session_page_budget(0).build().is_err());
    assert!(base().signed_url_marker("").build().is_err());
    assert!(
        base()
            .retry_policy(RetryPolicy {
                max_attempts: 0,
                delay: Duration::ZERO,
            })
            .build()
            .is_err()
    );

    let err = HarvestConfig::builder()
        .output_dir("out")
        .site_url("https://exa mple.com")
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("Invalid site URL"));
}

#[test]
fn config_round_trips_through_json() {
    let config = base().list_pages(3).resume(true).build().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let restored: HarvestConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.list_pages(), 3);
    assert!(restored.resume());
    assert_eq!(restored.site_url(), config.site_url());
}
