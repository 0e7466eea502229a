//! Navigation and extraction for catalog pages
//!
//! Navigation is the only part that drives the browser. Extraction works on
//! HTML snapshots and is pure.

pub mod extractors;
pub mod navigation;
pub mod schema;
pub mod supplementary;

pub use extractors::{
    extract_article_data, extract_article_links, parse_detail_item, pick_supplementary_image,
    standardize_key,
};
pub use navigation::{NavigationFailure, STEALTH_SHIM, navigate, prepare_context};
pub use schema::{ArticleData, ArticleDetails, ArticleLink, ArticleRecord};
pub use supplementary::{find_supplementary_image, supplementary_query, supplementary_search_url};
