//! Command-line interface of the harvester binary

use clap::Parser;
use std::path::PathBuf;

use crate::config::HarvestConfig;
use crate::utils::{DEFAULT_LIST_PAGES, DEFAULT_SITE_URL};

#[derive(Debug, Parser)]
#[command(
    name = "signed-link-harvester",
    version,
    about = "Crawl a software catalog and capture its signed download links"
)]
pub struct Cli {
    /// Catalog base URL
    #[arg(long, default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Directory that holds the run_<timestamp> checkpoint directories
    #[arg(long, default_value = "harvest_output")]
    pub output_dir: PathBuf,

    /// Number of list pages to walk (pages 1..=N)
    #[arg(long, default_value_t = DEFAULT_LIST_PAGES)]
    pub pages: u32,

    /// Continue the most recent run in --output-dir
    #[arg(long)]
    pub resume: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Skip the supplementary icon lookup
    #[arg(long)]
    pub no_supplementary_images: bool,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<HarvestConfig> {
        HarvestConfig::builder()
            .output_dir(self.output_dir)
            .site_url(self.site_url)
            .list_pages(self.pages)
            .resume(self.resume)
            .headless(!self.headed)
            .supplementary_images(!self.no_supplementary_images)
            .build()
    }
}
