//! Core domain types for linkcard.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the plugin.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`block`] | Block snapshots and the derived conversion state |
//! | [`metadata`] | Scraped link metadata with its field invariant |
//! | [`outcome`] | Per-block conversion outcomes and the aggregate report |

mod block;
mod metadata;
mod outcome;

pub use block::{BlockId, BlockKind, BlockSnapshot, BlockState};
pub use metadata::{LinkMetadata, ensure_https};
pub use outcome::{BlockOutcome, ConversionReport, ConvertError, OutcomeStatus, SkipReason};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Custom attribute key persisted on a converted block.
///
/// Its value is the pre-conversion URL; presence of a non-blank value is what
/// marks a block as converted, and clearing it is part of every revert.
pub const ORIGINAL_LINK_ATTRIBUTE: &str = "custom-original-link";

/// Which processor a conversion command invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvertKind {
    /// Provider-hosted embed HTML obtained over oEmbed.
    Embed,
    /// Locally rendered preview card built from scraped page metadata.
    #[default]
    BookmarkCard,
}

impl ConvertKind {
    /// The other converter, used when a blacklist rules the preferred one out.
    #[must_use]
    pub const fn alternate(self) -> Self {
        match self {
            Self::Embed => Self::BookmarkCard,
            Self::BookmarkCard => Self::Embed,
        }
    }
}

/// Content format accepted by the block store's update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Dom,
    Markdown,
}

impl ContentFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dom => "dom",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentFormat, ConvertKind};

    #[test]
    fn convert_kind_alternate_is_involutive() {
        assert_eq!(ConvertKind::Embed.alternate(), ConvertKind::BookmarkCard);
        assert_eq!(ConvertKind::BookmarkCard.alternate(), ConvertKind::Embed);
        assert_eq!(ConvertKind::Embed.alternate().alternate(), ConvertKind::Embed);
    }

    #[test]
    fn content_format_wire_strings() {
        assert_eq!(ContentFormat::Dom.as_str(), "dom");
        assert_eq!(ContentFormat::Markdown.as_str(), "markdown");
    }
}
