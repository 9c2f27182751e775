//! Bookmark-card rendering and embed wrapping.
//!
//! Pure string construction: no network access, no side effects, and
//! byte-identical output for identical input.

use std::fmt::Write;

use linkcard_types::LinkMetadata;

/// Inline styling carried inside every rendered card, so the card survives
/// being pasted into documents that do not load the plugin stylesheet.
const DEFAULT_CARD_STYLE: &str = "<style>\
.kg-card-main{display:flex;justify-content:center;padding:0;width:100%;}\
.kg-card{width:100%;}\
.kg-bookmark-container{display:flex;flex-direction:row-reverse;text-decoration:none;\
border-radius:6px;border:1px solid rgb(124 139 154/25%);overflow:hidden;color:inherit;}\
.kg-bookmark-content{flex-grow:999;flex-basis:0;display:flex;flex-direction:column;\
justify-content:flex-start;align-items:flex-start;padding:20px;}\
.kg-bookmark-title{font-size:15px;line-height:1.4em;font-weight:600;}\
.kg-bookmark-description{display:-webkit-box;font-size:14px;line-height:1.5em;\
margin-top:3px;max-height:44px;overflow:hidden;opacity:.7;}\
.kg-bookmark-metadata{display:flex;align-items:center;flex-wrap:wrap;\
margin-top:22px;font-size:14px;}\
.kg-bookmark-icon{width:20px;height:20px;margin-right:6px;}\
.kg-bookmark-author:after{content:\"\\2022\";margin:0 6px;}\
.kg-bookmark-thumbnail{flex-grow:1;flex-basis:24rem;min-width:33%;position:relative;}\
.kg-bookmark-thumbnail img{position:absolute;top:0;left:0;width:100%;height:100%;\
object-fit:cover;}\
</style>";

/// Escape a string for use as HTML text or an attribute value.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a bookmark card for `metadata`.
///
/// Author and publisher spans are emitted only when present, never as empty
/// elements, and the thumbnail section only when a thumbnail URL exists.
#[must_use]
pub fn render_bookmark_card(metadata: &LinkMetadata) -> String {
    let link = escape_html(metadata.link());
    let title = escape_html(metadata.title().unwrap_or_default());
    let icon = escape_html(metadata.icon().unwrap_or_default());

    let mut card = String::new();
    card.push_str("<div>");
    card.push_str(DEFAULT_CARD_STYLE);
    card.push_str("<main class=\"kg-card-main\"><div class=\"w-full\">");
    card.push_str("<div class=\"kg-card kg-bookmark-card\">");
    let _ = write!(card, "<a class=\"kg-bookmark-container\" href=\"{link}\">");
    card.push_str("<div class=\"kg-bookmark-content\">");
    let _ = write!(card, "<div class=\"kg-bookmark-title\">{title}</div>");
    if let Some(description) = metadata.description() {
        let _ = write!(
            card,
            "<div class=\"kg-bookmark-description\">{}</div>",
            escape_html(description)
        );
    }
    card.push_str("<div class=\"kg-bookmark-metadata\">");
    let _ = write!(
        card,
        "<img class=\"kg-bookmark-icon\" src=\"{icon}\" alt=\"Link icon\" />"
    );
    if let Some(author) = metadata.author() {
        let _ = write!(
            card,
            "<span class=\"kg-bookmark-author\">{}</span>",
            escape_html(author)
        );
    }
    if let Some(publisher) = metadata.publisher() {
        let _ = write!(
            card,
            "<span class=\"kg-bookmark-publisher\">{}</span>",
            escape_html(publisher)
        );
    }
    card.push_str("</div></div>");
    if let Some(thumbnail) = metadata.thumbnail() {
        let _ = write!(
            card,
            "<div class=\"kg-bookmark-thumbnail\">\
             <img src=\"{}\" alt=\"Link thumbnail\" /></div>",
            escape_html(thumbnail)
        );
    }
    card.push_str("</a></div></div></main></div>");
    card
}

/// Wrap provider embed HTML in a container element for block insertion.
#[must_use]
pub fn wrap_embed(html: &str) -> String {
    format!("<div>{html}</div>")
}
