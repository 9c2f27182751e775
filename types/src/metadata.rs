//! Scraped link metadata.

/// Default the origin scheme to `https` when a bare domain/path is given.
#[must_use]
pub fn ensure_https(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Normalized metadata record for one resolved URL.
///
/// Constructed fresh per conversion request, never mutated afterwards, and
/// discarded once the HTML fragment is produced.
///
/// Invariant: every optional field is either a non-empty trimmed string or
/// absent - never an empty-string placeholder. The setters enforce this, so a
/// renderer can key "omit this element" off plain `Option` checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMetadata {
    link: String,
    title: Option<String>,
    description: Option<String>,
    icon: Option<String>,
    author: Option<String>,
    thumbnail: Option<String>,
    publisher: Option<String>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LinkMetadata {
    /// Create a record for `link`, defaulting a missing scheme to `https`.
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: ensure_https(&link.into()),
            title: None,
            description: None,
            icon: None,
            author: None,
            thumbnail: None,
            publisher: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, value: Option<String>) -> Self {
        self.title = normalize(value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, value: Option<String>) -> Self {
        self.description = normalize(value);
        self
    }

    /// Icon URL; callers must pass an absolute URL.
    #[must_use]
    pub fn with_icon(mut self, value: Option<String>) -> Self {
        self.icon = normalize(value);
        self
    }

    #[must_use]
    pub fn with_author(mut self, value: Option<String>) -> Self {
        self.author = normalize(value);
        self
    }

    /// Thumbnail URL; callers must pass an absolute URL.
    #[must_use]
    pub fn with_thumbnail(mut self, value: Option<String>) -> Self {
        self.thumbnail = normalize(value);
        self
    }

    #[must_use]
    pub fn with_publisher(mut self, value: Option<String>) -> Self {
        self.publisher = normalize(value);
        self
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    #[must_use]
    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{LinkMetadata, ensure_https};

    #[test]
    fn ensure_https_prepends_scheme_for_bare_domains() {
        assert_eq!(ensure_https("example.com/a"), "https://example.com/a");
        assert_eq!(ensure_https("https://example.com"), "https://example.com");
        assert_eq!(ensure_https("http://example.com"), "http://example.com");
    }

    #[test]
    fn setters_normalize_blank_values_to_absent() {
        let metadata = LinkMetadata::new("example.com")
            .with_title(Some("  Example  ".to_string()))
            .with_description(Some("   ".to_string()))
            .with_author(None);

        assert_eq!(metadata.link(), "https://example.com");
        assert_eq!(metadata.title(), Some("Example"));
        assert_eq!(metadata.description(), None);
        assert_eq!(metadata.author(), None);
    }
}
