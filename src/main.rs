use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};

use signed_link_harvester::browser_profile::cleanup_stale_profiles;
use signed_link_harvester::cli::Cli;
use signed_link_harvester::logging::init_logging;
use signed_link_harvester::{HarvestError, harvest};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e:#}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = cleanup_stale_profiles() {
        warn!("Stale profile cleanup failed: {e:#}");
    }

    match harvest(config).await {
        Ok(summary) => {
            info!(
                "Done: {}/{} articles processed, {} download links captured. Results in {}",
                summary.processed,
                summary.discovered,
                summary.captured,
                summary.run_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e @ HarvestError::RetriesExhausted { .. }) => {
            error!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Harvest could not start: {e}");
            ExitCode::FAILURE
        }
    }
}
