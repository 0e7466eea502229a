use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An article discovered on a catalog list page.
///
/// Unique by `url` within a run. Only `processed` ever changes after discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub page_num: u32,
    #[serde(default)]
    pub processed: bool,
}

impl ArticleLink {
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            categories,
            page_num: 0,
            processed: false,
        }
    }
}

/// Key/value facts listed on an article page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetails {
    /// Facts whose label maps onto a fixed key (`software_name`, `file_size`, ...).
    #[serde(default)]
    pub standardized: BTreeMap<String, String>,
    /// Every other fact, keyed by its lower-cased label with `_` for spaces.
    #[serde(default)]
    pub other_details: BTreeMap<String, String>,
}

/// Everything extracted from one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleData {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub details: ArticleDetails,
    #[serde(default)]
    pub image_supp: Option<String>,
    /// The captured signed URL; `None` when capture timed out or failed.
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ArticleData {
    /// Name used for the supplementary icon lookup.
    #[must_use]
    pub fn software_name(&self) -> Option<&str> {
        self.details
            .standardized
            .get("software_name")
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

/// One persisted article. Immutable once appended to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub data: ArticleData,
}

impl ArticleRecord {
    #[must_use]
    pub fn new(link: &ArticleLink, data: ArticleData) -> Self {
        Self {
            title: link.title.clone(),
            url: link.url.clone(),
            categories: link.categories.clone(),
            data,
        }
    }
}
