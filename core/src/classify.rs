//! Block classification and the URL grammar.
//!
//! Everything here is a pure read over a [`BlockSnapshot`] value; the host
//! adapter is responsible for serializing its UI tree into snapshots.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use linkcard_types::{BlockKind, BlockSnapshot, BlockState, ORIGINAL_LINK_ATTRIBUTE};

// Permissive URL grammar: scheme://host or a www./user@ host, with optional
// port, path, query, and fragment. Full match; bare domains without a scheme
// or www. prefix are rejected.
const URL_GRAMMAR: &str = concat!(
    r"^(?:[A-Za-z]{3,9}:(?://)?(?:[-;:&=+$,\w]+@)?[A-Za-z0-9.\-]+(?::[0-9]+)?",
    r"|(?:www\.|[-;:&=+$,\w]+@)[A-Za-z0-9.\-]+)",
    r"(?:/[+~%/.\w\-]*)?(?:\?[-+=&;%@.\w]*)?(?:#[\w\-]*)?$",
);

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(URL_GRAMMAR).expect("URL grammar must compile"))
}

/// Whether `text`, trimmed, matches the URL grammar.
///
/// Grammar-only: no network validation, no normalization.
#[must_use]
pub fn is_url(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && url_pattern().is_match(text)
}

/// Whether an attribute map marks its block as converted: the original-link
/// key is present and non-blank.
#[must_use]
pub fn is_converted(attributes: &BTreeMap<String, String>) -> bool {
    attributes
        .get(ORIGINAL_LINK_ATTRIBUTE)
        .is_some_and(|value| !value.trim().is_empty())
}

/// Derive the conversion state of a block.
///
/// The emptiness check runs before the converted check: an empty paragraph
/// still carrying a stale original-link attribute is `Empty`, so the user is
/// prompted for a fresh URL instead of the stale one being "reverted".
#[must_use]
pub fn classify(block: &BlockSnapshot) -> BlockState {
    if block.kind == BlockKind::Paragraph && block.text.trim().is_empty() {
        return BlockState::Empty;
    }
    if let Some(original) = block.original_link() {
        return BlockState::Converted {
            original_url: original.to_string(),
        };
    }
    BlockState::Plain {
        link: block.leading_link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, is_converted, is_url};
    use linkcard_types::{BlockKind, BlockSnapshot, BlockState, ORIGINAL_LINK_ATTRIBUTE};
    use std::collections::BTreeMap;

    #[test]
    fn urls_matching_the_grammar_are_accepted() {
        for url in [
            "https://example.com",
            "http://example.com/path/to/page",
            "https://example.com:8080/a?b=c&d=e#frag",
            "www.example.com",
            "ftp://files.example.com",
            "  https://example.com/a  ",
        ] {
            assert!(is_url(url), "{url:?} should be a URL");
        }
    }

    #[test]
    fn non_urls_are_rejected() {
        for text in ["", "   ", "hello", "ht!tp://x", "example.com", "just some words"] {
            assert!(!is_url(text), "{text:?} should not be a URL");
        }
    }

    #[test]
    fn converted_requires_a_non_blank_attribute() {
        let mut attributes = BTreeMap::new();
        assert!(!is_converted(&attributes));

        attributes.insert(ORIGINAL_LINK_ATTRIBUTE.to_string(), "  ".to_string());
        assert!(!is_converted(&attributes));

        attributes.insert(
            ORIGINAL_LINK_ATTRIBUTE.to_string(),
            "https://example.com".to_string(),
        );
        assert!(is_converted(&attributes));
    }

    #[test]
    fn empty_paragraph_is_empty() {
        let block = BlockSnapshot::paragraph("b1", "   \n ");
        assert_eq!(classify(&block), BlockState::Empty);
    }

    #[test]
    fn emptiness_takes_precedence_over_a_stale_attribute() {
        let block = BlockSnapshot::paragraph("b1", "")
            .with_attribute(ORIGINAL_LINK_ATTRIBUTE, "https://stale.example");
        assert_eq!(classify(&block), BlockState::Empty);
    }

    #[test]
    fn non_paragraph_blocks_are_never_empty() {
        let block = BlockSnapshot::new("b1", BlockKind::Html);
        assert_eq!(classify(&block), BlockState::Plain { link: None });
    }

    #[test]
    fn converted_block_carries_its_original_url() {
        let block = BlockSnapshot::paragraph("b1", "rendered card")
            .with_attribute(ORIGINAL_LINK_ATTRIBUTE, "https://example.com/a");
        assert_eq!(
            classify(&block),
            BlockState::Converted {
                original_url: "https://example.com/a".to_string()
            }
        );
    }

    #[test]
    fn plain_block_surfaces_its_leading_link() {
        let block = BlockSnapshot::paragraph("b1", "check this out")
            .with_leading_link("https://example.com");
        assert_eq!(
            classify(&block),
            BlockState::Plain {
                link: Some("https://example.com".to_string())
            }
        );

        let block = BlockSnapshot::paragraph("b1", "no link here");
        assert_eq!(classify(&block), BlockState::Plain { link: None });
    }
}
