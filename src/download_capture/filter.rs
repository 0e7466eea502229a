/// Recognises the site's signed download URLs among observed responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlFilter {
    marker: String,
}

impl SignedUrlFilter {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Only http(s) URLs can carry a downloadable payload; `data:` and
    /// `blob:` responses are never matched even if they contain the marker.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        (url.starts_with("https://") || url.starts_with("http://")) && url.contains(&self.marker)
    }
}
