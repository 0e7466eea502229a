//! Processing of a single article: load, extract, capture, enrich

use std::time::Duration;
use tracing::debug;

use super::crawl_types::HarvestResult;
use crate::browser::{BrowserInstance, BrowsingContext, RequestPolicy};
use crate::config::HarvestConfig;
use crate::download_capture::{CaptureSettings, DownloadCaptureEngine};
use crate::page_extractor::{
    ArticleLink, ArticleRecord, extract_article_data, find_supplementary_image, navigate,
    prepare_context,
};

/// Everything needed to turn one [`ArticleLink`] into an [`ArticleRecord`].
#[derive(Debug, Clone)]
pub struct ArticleProcessor {
    engine: DownloadCaptureEngine,
    article_marker: String,
    navigation_timeout: Duration,
    marker_timeout: Duration,
    stealth: bool,
    request_policy: RequestPolicy,
    supplementary_images: bool,
}

impl ArticleProcessor {
    #[must_use]
    pub fn from_config(config: &HarvestConfig) -> Self {
        let request_policy = if config.block_heavy_resources() {
            RequestPolicy::block_heavy_resources()
        } else {
            RequestPolicy::allow_all()
        };

        Self {
            engine: DownloadCaptureEngine::new(CaptureSettings::from_config(config)),
            article_marker: config.article_marker().to_string(),
            navigation_timeout: config.navigation_timeout(),
            marker_timeout: config.marker_timeout(),
            stealth: config.stealth(),
            request_policy,
            supplementary_images: config.supplementary_images(),
        }
    }

    #[must_use]
    pub fn request_policy(&self) -> &RequestPolicy {
        &self.request_policy
    }

    #[must_use]
    pub fn stealth(&self) -> bool {
        self.stealth
    }

    /// Load the article, then extract its data while capturing the download link.
    ///
    /// A capture that times out or fails still yields a record, with
    /// `download_url = None`. Navigation or snapshot failures are errors and
    /// the link stays unprocessed.
    pub async fn process<B: BrowserInstance>(
        &self,
        instance: &B,
        link: &ArticleLink,
    ) -> HarvestResult<ArticleRecord> {
        let context = instance.open_context().await?;
        prepare_context(&context, self.stealth, self.request_policy.clone()).await;

        let context = navigate(
            context,
            &link.url,
            &self.article_marker,
            self.navigation_timeout,
            self.marker_timeout,
        )
        .await?;

        let (extracted, capture) = tokio::join!(
            async {
                context
                    .content()
                    .await
                    .map(|html| extract_article_data(&html, &link.url))
            },
            self.engine.capture(instance, &context),
        );

        if let Err(e) = context.close().await
            && !e.is_already_closed()
        {
            debug!("Failed to close article context: {}", e);
        }

        let mut data = extracted?;
        data.download_url = capture.into_url();

        // Runs only after the capture finished, so its context is never
        // mistaken for a download window.
        if self.supplementary_images {
            let name = data.software_name().unwrap_or(&link.title).to_string();
            data.image_supp =
                find_supplementary_image(instance, &name, self.navigation_timeout).await;
        }

        Ok(ArticleRecord::new(link, data))
    }
}
