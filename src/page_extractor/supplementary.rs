//! Best-effort icon lookup through an image search engine

use std::time::Duration;
use tracing::{debug, info};

use super::extractors::pick_supplementary_image;
use super::navigation::navigate;
use crate::browser::{BrowserInstance, BrowsingContext};

const IMAGE_SEARCH_URL: &str = "https://www.google.com/search?tbm=isch&q=";
const QUERY_SUFFIX: &str = "programme Icon 16:3";

/// Search query for `software_name`: its first two words, lower-cased, plus a fixed suffix.
#[must_use]
pub fn supplementary_query(software_name: &str) -> String {
    let lowered = software_name.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().take(2).collect();
    format!("{} {QUERY_SUFFIX}", words.join(" "))
}

#[must_use]
pub fn supplementary_search_url(software_name: &str) -> String {
    format!(
        "{IMAGE_SEARCH_URL}{}",
        urlencoding::encode(&supplementary_query(software_name))
    )
}

/// Look up an icon for `software_name` in a context of its own.
///
/// Returns `None` on any failure; the result never affects whether an
/// article counts as processed.
pub async fn find_supplementary_image<B: BrowserInstance>(
    instance: &B,
    software_name: &str,
    timeout: Duration,
) -> Option<String> {
    let context = match instance.open_context().await {
        Ok(context) => context,
        Err(e) => {
            debug!("No context for supplementary image search: {}", e);
            return None;
        }
    };

    let url = supplementary_search_url(software_name);
    let context = match navigate(context, &url, "img", timeout, timeout).await {
        Ok(context) => context,
        Err(e) => {
            debug!("Supplementary image search failed: {}", e);
            return None;
        }
    };

    let image = match context.content().await {
        Ok(html) => pick_supplementary_image(&html, software_name),
        Err(e) => {
            debug!("Could not read image search results: {}", e);
            None
        }
    };
    if let Err(e) = context.close().await {
        debug!("Failed to close image search context: {}", e);
    }

    if let Some(src) = &image {
        info!(software_name, "Supplementary image found: {}", src);
    }
    image
}
