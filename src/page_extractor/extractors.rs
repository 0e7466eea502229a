//! Pure extraction functions over HTML snapshots
//!
//! Every function here takes the serialized DOM of a loaded page and never
//! touches the browser, so they are unit-testable against fixture HTML.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::schema::{ArticleData, ArticleDetails, ArticleLink};

static POST_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".post").expect("BUG: hardcoded CSS selector '.post' is invalid")
});

static POST_TITLE_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2.title a").expect("BUG: hardcoded CSS selector 'h2.title a' is invalid")
});

static POST_CATEGORY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".post-info a").expect("BUG: hardcoded CSS selector '.post-info a' is invalid")
});

static CONTENT_ROOT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".post-content.clear-block")
        .expect("BUG: hardcoded CSS selector '.post-content.clear-block' is invalid")
});

static CONTENT_FALLBACK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".post-content").expect("BUG: hardcoded CSS selector '.post-content' is invalid")
});

static P_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p").expect("BUG: hardcoded CSS selector 'p' is invalid")
});

static UL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("ul").expect("BUG: hardcoded CSS selector 'ul' is invalid")
});

static LI_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("li").expect("BUG: hardcoded CSS selector 'li' is invalid")
});

static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img").expect("BUG: hardcoded CSS selector 'img' is invalid")
});

/// Site label (lower-cased) to standardized detail key.
const DETAIL_KEY_MAPPING: &[(&str, &str)] = &[
    ("software full name", "software_name"),
    ("setup file name", "file_name"),
    ("full setup size", "file_size"),
    ("setup type", "installer_type"),
    ("compatibility architecture", "architecture"),
    ("compatibility mechanical", "architecture"),
    ("latest version release added on", "release_date"),
    ("developers", "developer"),
];

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolve `href` against `base`, leaving it untouched when `base` is not a URL.
fn resolve_href(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Some(href.to_string()),
    }
}

/// Extract article links from a catalog list page.
///
/// Entries missing either a title or a URL are dropped.
#[must_use]
pub fn extract_article_links(html: &str, page_url: &str, page_num: u32) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    document
        .select(&POST_SELECTOR)
        .filter_map(|post| {
            let title_link = post.select(&POST_TITLE_LINK_SELECTOR).next()?;
            let title = element_text(title_link);
            let url = resolve_href(base.as_ref(), title_link.value().attr("href")?)?;
            if title.is_empty() {
                return None;
            }

            let categories = post
                .select(&POST_CATEGORY_SELECTOR)
                .map(element_text)
                .filter(|c| !c.is_empty())
                .collect();

            let mut link = ArticleLink::new(title, url, categories);
            link.page_num = page_num;
            Some(link)
        })
        .collect()
}

/// Map a lower-cased site label onto its standardized key.
#[must_use]
pub fn standardize_key(label: &str) -> Option<&'static str> {
    DETAIL_KEY_MAPPING
        .iter()
        .find(|(site_label, _)| *site_label == label)
        .map(|(_, key)| *key)
}

/// Split a `Label: value` list item on its first colon.
///
/// Returns the lower-cased label and the trimmed value (which may itself
/// contain colons), or `None` when the item has no colon.
#[must_use]
pub fn parse_detail_item(text: &str) -> Option<(String, String)> {
    let (label, value) = text.trim().split_once(':')?;
    Some((label.trim().to_lowercase(), value.trim().to_string()))
}

fn extract_details(list: ElementRef<'_>) -> ArticleDetails {
    let mut details = ArticleDetails::default();
    for item in list.select(&LI_SELECTOR) {
        let Some((label, value)) = parse_detail_item(&element_text(item)) else {
            continue;
        };
        match standardize_key(&label) {
            Some(key) => {
                details.standardized.insert(key.to_string(), value);
            }
            None => {
                details.other_details.insert(label.replace(' ', "_"), value);
            }
        }
    }
    details
}

/// Extract overview, lead image and the facts list from an article page.
///
/// Missing pieces are left empty; a page without a content root yields
/// `ArticleData::default()`.
#[must_use]
pub fn extract_article_data(html: &str, page_url: &str) -> ArticleData {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let Some(root) = document
        .select(&CONTENT_ROOT_SELECTOR)
        .next()
        .or_else(|| document.select(&CONTENT_FALLBACK_SELECTOR).next())
    else {
        return ArticleData::default();
    };

    let paragraphs: Vec<ElementRef<'_>> = root.select(&P_SELECTOR).collect();
    let overview = paragraphs.get(1).map(|p| element_text(*p)).unwrap_or_default();
    let image = paragraphs
        .get(2)
        .and_then(|p| p.select(&IMG_SELECTOR).next())
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve_href(base.as_ref(), src))
        .unwrap_or_default();

    let details = root
        .select(&UL_SELECTOR)
        .nth(1)
        .map(extract_details)
        .unwrap_or_default();

    ArticleData {
        overview,
        image,
        details,
        image_supp: None,
        download_url: None,
    }
}

/// Choose an icon from an image search result page.
///
/// Prefers the first image whose alt text mentions the first word of
/// `software_name`, then the first image with any `src`.
#[must_use]
pub fn pick_supplementary_image(html: &str, software_name: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let first_word = software_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let with_src: Vec<(String, String)> = document
        .select(&IMG_SELECTOR)
        .filter_map(|img| {
            let src = img.value().attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            let alt = img.value().attr("alt").unwrap_or_default().to_lowercase();
            Some((alt, src.to_string()))
        })
        .collect();

    with_src
        .iter()
        .find(|(alt, _)| !first_word.is_empty() && alt.contains(&first_word))
        .or_else(|| with_src.first())
        .map(|(_, src)| src.clone())
}
