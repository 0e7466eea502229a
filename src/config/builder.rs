//! Type-safe builder for `HarvestConfig` using the typestate pattern
//!
//! `build()` only exists once both the output directory and the site URL
//! have been supplied.

use anyhow::{Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{HarvestConfig, HarvestSettings};

// Type states for the builder
pub struct WithOutputDir;
pub struct WithSiteUrl;

pub struct HarvestConfigBuilder<State = ()> {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) site_url: Option<String>,
    pub(crate) settings: HarvestSettings,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for HarvestConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            site_url: None,
            settings: HarvestSettings::default(),
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfig {
    /// Create a builder for configuring a `HarvestConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> HarvestConfigBuilder<()> {
        HarvestConfigBuilder::default()
    }
}

impl HarvestConfigBuilder<()> {
    pub fn output_dir(self, dir: impl Into<PathBuf>) -> HarvestConfigBuilder<WithOutputDir> {
        HarvestConfigBuilder {
            output_dir: Some(dir.into()),
            site_url: self.site_url,
            settings: self.settings,
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfigBuilder<WithOutputDir> {
    pub fn site_url(self, url: impl Into<String>) -> HarvestConfigBuilder<WithSiteUrl> {
        let url_string = url.into();

        // Normalize URL: add https:// if no scheme is present, drop trailing slashes
        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };
        let normalized_url = normalized_url.trim_end_matches('/').to_string();

        HarvestConfigBuilder {
            output_dir: self.output_dir,
            site_url: Some(normalized_url),
            settings: self.settings,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl HarvestConfigBuilder<WithSiteUrl> {
    pub fn build(self) -> Result<HarvestConfig> {
        let site_url = self
            .site_url
            .ok_or_else(|| anyhow!("site_url is required"))?;
        url::Url::parse(&site_url).map_err(|e| anyhow!("Invalid site URL '{site_url}': {e}"))?;

        let settings = self.settings;
        if settings.storage_batch_size == 0 {
            bail!("storage_batch_size must be at least 1");
        }
        if settings.work_batch_size == 0 {
            bail!("work_batch_size must be at least 1");
        }
        if settings.session_page_budget == 0 {
            bail!("session_page_budget must be at least 1");
        }
        if settings.retry.max_attempts == 0 {
            bail!("run_attempts must be at least 1");
        }
        if settings.signed_url_marker.is_empty() {
            bail!("signed_url_marker must not be empty");
        }

        Ok(HarvestConfig {
            output_dir: self
                .output_dir
                .ok_or_else(|| anyhow!("output_dir is required"))?,
            site_url,
            settings,
        })
    }
}
