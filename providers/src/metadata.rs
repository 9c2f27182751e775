//! Page metadata scraping with ordered per-field fallback chains.
//!
//! The first pass reads the structured sources, preferring Open Graph, then
//! Dublin Core / article metadata, then Twitter card tags. Whatever is still
//! missing falls back to direct document queries, per field, in a fixed
//! precedence. The result is a fully normalized [`LinkMetadata`]: no field is
//! ever an empty placeholder, and icon/thumbnail URLs are always absolute.

use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use linkcard_types::{LinkMetadata, ensure_https};

use crate::proxy::{FetchOptions, ProxyFetch, ProxyRequest};

/// Fallback icon used when a page offers no favicon link at all.
const DEFAULT_ICON_URL: &str = "https://static.ghost.org/v5.0.0/images/link-icon.svg";

/// Placeholder for title/description when a page offers no source at all.
const NOT_AVAILABLE: &str = "N/A";

/// Fetches a page through the proxy contract and scrapes link metadata.
pub struct MetadataResolver {
    proxy: Arc<dyn ProxyFetch>,
    options: FetchOptions,
}

impl MetadataResolver {
    pub fn new(proxy: Arc<dyn ProxyFetch>) -> Self {
        Self {
            proxy,
            options: FetchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve `url` to a normalized metadata record.
    ///
    /// A missing scheme defaults to `https`. Transport failures and non-200
    /// responses are logged and come back as `None`, never as errors.
    pub async fn metadata(&self, url: &str) -> Option<LinkMetadata> {
        let link = ensure_https(url);
        let page = match Url::parse(&link) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %link, error = %e, "metadata target is not a URL");
                return None;
            }
        };

        let response = self
            .proxy
            .fetch(ProxyRequest::page_with(&link, &self.options))
            .await?;
        if !response.ok() {
            tracing::debug!(url = %link, status = response.status, "metadata fetch missed");
            return None;
        }

        Some(extract_metadata(&response.body, &link, &page))
    }

    /// Best-effort page title for reconstructing a markdown link on revert.
    ///
    /// Returns the empty string on any failure.
    pub async fn page_title(&self, url: &str) -> String {
        let link = ensure_https(url);
        let Some(response) = self
            .proxy
            .fetch(ProxyRequest::page_with(&link, &self.options))
            .await
        else {
            return String::new();
        };
        if !response.ok() {
            return String::new();
        }
        extract_title(&response.body)
    }
}

/// Scrape one fetched document into a normalized metadata record.
pub fn extract_metadata(html: &str, link: &str, page: &Url) -> LinkMetadata {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, r#"meta[property="og:title"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="dc.title"]"#))
        .or_else(|| element_attr(&doc, "title", "value"))
        .or_else(|| element_attr(&doc, "title", "no-title"))
        .or_else(|| title_text(&doc))
        .or_else(|| Some(NOT_AVAILABLE.to_string()));

    let description = meta_content(&doc, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="dc.description"]"#))
        .or_else(|| meta_content(&doc, r#"meta[name="description"]"#))
        .or_else(|| Some(NOT_AVAILABLE.to_string()));

    let icon = element_attr(&doc, r#"link[rel="icon"]"#, "href")
        .or_else(|| element_attr(&doc, r#"link[rel="shortcut icon"]"#, "href"))
        .or_else(|| element_attr(&doc, r#"link[rel="alternate icon"]"#, "href"))
        .or_else(|| element_attr(&doc, r#"link[rel="apple-touch-icon"]"#, "href"))
        .unwrap_or_else(|| DEFAULT_ICON_URL.to_string());
    let icon = resolve_against_origin(&icon, page);

    let author = meta_content(&doc, r#"meta[name="author"]"#);

    let thumbnail = meta_content(&doc, r#"meta[property="og:image"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="twitter:image"]"#))
        .and_then(|value| resolve_against_origin(&value, page));

    let publisher = meta_content(&doc, r#"meta[property="article:publisher"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="dc.publisher"]"#))
        .or_else(|| meta_content(&doc, r#"meta[property="og:site_name"]"#))
        .or_else(|| meta_content(&doc, r#"meta[name="publisher"]"#))
        .or_else(|| Some(page.origin().ascii_serialization()));

    LinkMetadata::new(link)
        .with_title(title)
        .with_description(description)
        .with_icon(icon)
        .with_author(author)
        .with_thumbnail(thumbnail)
        .with_publisher(publisher)
}

/// Document title text for a markdown link, newlines stripped.
///
/// Falls back to the `no-title` attribute some script-rendered sites leave on
/// the unloaded `<title>` element; empty when neither exists.
pub fn extract_title(html: &str) -> String {
    let doc = Html::parse_document(html);
    match title_text(&doc) {
        Some(text) => text.replace(['\r', '\n'], "").trim().to_string(),
        None => element_attr(&doc, "title", "no-title").unwrap_or_default(),
    }
}

fn meta_content(doc: &Html, css: &str) -> Option<String> {
    element_attr(doc, css, "content")
}

fn element_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn title_text(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let text: String = doc.select(&selector).next()?.text().collect();
    let text = text.trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Resolve a possibly relative URL against the page origin.
///
/// Already-absolute (`http`-prefixed) values pass through untouched; a value
/// that cannot be resolved is dropped rather than kept relative.
fn resolve_against_origin(value: &str, page: &Url) -> Option<String> {
    if value.starts_with("http") {
        return Some(value.to_string());
    }
    let origin = Url::parse(&page.origin().ascii_serialization()).ok()?;
    origin.join(value).ok().map(|resolved| resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::{extract_metadata, extract_title};
    use url::Url;

    fn page() -> Url {
        Url::parse("https://site.example/page").unwrap()
    }

    #[test]
    fn og_title_wins_over_document_title() {
        let html = r#"<html><head>
            <meta property="og:title" content="Example">
            <title>Ignored</title>
        </head><body></body></html>"#;
        let metadata = extract_metadata(html, "https://site.example/page", &page());
        assert_eq!(metadata.title(), Some("Example"));
    }

    #[test]
    fn missing_title_sources_yield_the_placeholder() {
        let metadata = extract_metadata("<html><head></head></html>", "https://site.example", &page());
        assert_eq!(metadata.title(), Some("N/A"));
        assert_eq!(metadata.description(), Some("N/A"));
    }

    #[test]
    fn relative_icon_resolves_against_page_origin() {
        let html = r#"<html><head><link rel="icon" href="/favicon.ico"></head></html>"#;
        let metadata = extract_metadata(html, "https://site.example/page", &page());
        assert_eq!(metadata.icon(), Some("https://site.example/favicon.ico"));
    }

    #[test]
    fn absent_favicon_falls_back_to_the_default_icon() {
        let metadata = extract_metadata("<html></html>", "https://site.example", &page());
        assert_eq!(
            metadata.icon(),
            Some("https://static.ghost.org/v5.0.0/images/link-icon.svg")
        );
    }

    #[test]
    fn icon_rel_chain_is_ordered() {
        let html = r#"<html><head>
            <link rel="apple-touch-icon" href="/touch.png">
            <link rel="shortcut icon" href="/shortcut.ico">
        </head></html>"#;
        let metadata = extract_metadata(html, "https://site.example", &page());
        assert_eq!(metadata.icon(), Some("https://site.example/shortcut.ico"));
    }

    #[test]
    fn relative_thumbnail_resolves_and_absolute_passes_through() {
        let html = r#"<meta property="og:image" content="/img/cover.png">"#;
        let metadata = extract_metadata(html, "https://site.example/post", &page());
        assert_eq!(metadata.thumbnail(), Some("https://site.example/img/cover.png"));

        let html = r#"<meta property="og:image" content="https://cdn.example/cover.png">"#;
        let metadata = extract_metadata(html, "https://site.example/post", &page());
        assert_eq!(metadata.thumbnail(), Some("https://cdn.example/cover.png"));
    }

    #[test]
    fn publisher_defaults_to_page_origin() {
        let metadata = extract_metadata("<html></html>", "https://site.example/page", &page());
        assert_eq!(metadata.publisher(), Some("https://site.example"));

        let html = r#"<meta property="og:site_name" content="Site Name">"#;
        let metadata = extract_metadata(html, "https://site.example/page", &page());
        assert_eq!(metadata.publisher(), Some("Site Name"));
    }

    #[test]
    fn author_is_absent_without_a_source() {
        let metadata = extract_metadata("<html></html>", "https://site.example", &page());
        assert_eq!(metadata.author(), None);

        let html = r#"<meta name="author" content="A. Writer">"#;
        let metadata = extract_metadata(html, "https://site.example", &page());
        assert_eq!(metadata.author(), Some("A. Writer"));
    }

    #[test]
    fn title_extraction_strips_newlines_and_trims() {
        assert_eq!(extract_title("<title>\nFancy\nTitle\n</title>"), "FancyTitle");
        assert_eq!(extract_title("<html><body>no title</body></html>"), "");
        assert_eq!(
            extract_title(r#"<title no-title="Unloaded"></title>"#),
            "Unloaded"
        );
    }
}
