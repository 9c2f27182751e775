//! Routing for URLs pasted from the clipboard.
//!
//! The paste hook itself is a host concern; this module only answers the
//! policy question: given the pasted text and the user's settings, which
//! converter (if any) should handle it?

use linkcard_config::ClipboardConfig;
use linkcard_types::ConvertKind;

use crate::classify::is_url;

/// Decide how a clipboard paste should be converted.
///
/// Returns the converter to invoke and the trimmed URL, or `None` when the
/// feature is disabled, the text is not a URL, or every converter's blacklist
/// rules the URL out. A URL blacklisted for the preferred converter falls
/// through to the alternate one.
#[must_use]
pub fn route_clipboard(text: &str, config: &ClipboardConfig) -> Option<(ConvertKind, String)> {
    if !config.enabled {
        return None;
    }
    let candidate = text.trim();
    if !is_url(candidate) {
        return None;
    }

    let preferred = config.converter;
    for kind in [preferred, preferred.alternate()] {
        if !is_blacklisted(candidate, config.blacklist(kind)) {
            return Some((kind, candidate.to_string()));
        }
        tracing::debug!(url = candidate, ?kind, "converter blacklisted for pasted URL");
    }
    None
}

// Loose containment match, as the blacklists hold bare domains.
fn is_blacklisted(url: &str, blacklist: &[String]) -> bool {
    blacklist
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .any(|entry| url.contains(entry))
}

#[cfg(test)]
mod tests {
    use super::route_clipboard;
    use linkcard_config::ClipboardConfig;
    use linkcard_types::ConvertKind;

    fn enabled_config() -> ClipboardConfig {
        ClipboardConfig {
            enabled: true,
            ..ClipboardConfig::default()
        }
    }

    #[test]
    fn disabled_feature_routes_nothing() {
        let config = ClipboardConfig::default();
        assert_eq!(route_clipboard("https://example.com", &config), None);
    }

    #[test]
    fn non_urls_route_nothing() {
        assert_eq!(route_clipboard("plain words", &enabled_config()), None);
    }

    #[test]
    fn url_routes_to_the_configured_converter() {
        let mut config = enabled_config();
        config.converter = ConvertKind::Embed;
        assert_eq!(
            route_clipboard("  https://example.com/a  ", &config),
            Some((ConvertKind::Embed, "https://example.com/a".to_string()))
        );
    }

    #[test]
    fn blacklisted_preferred_converter_falls_through_to_the_alternate() {
        let mut config = enabled_config();
        config.converter = ConvertKind::BookmarkCard;
        config.bookmark_blacklist = vec!["example.com".to_string()];
        assert_eq!(
            route_clipboard("https://example.com/a", &config),
            Some((ConvertKind::Embed, "https://example.com/a".to_string()))
        );
    }

    #[test]
    fn url_blacklisted_for_both_converters_routes_nothing() {
        let mut config = enabled_config();
        config.bookmark_blacklist = vec!["example.com".to_string()];
        config.embed_blacklist = vec!["example.com".to_string()];
        assert_eq!(route_clipboard("https://example.com/a", &config), None);
    }
}
