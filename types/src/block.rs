//! Block snapshots and the conversion state derived from them.
//!
//! The host adapter serializes each target block into a [`BlockSnapshot`]
//! value before handing it to the core, so classification never walks a live
//! UI tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ORIGINAL_LINK_ATTRIBUTE;

/// Opaque block identifier assigned by the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The host editor's block kind, reduced to what classification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    Heading,
    Html,
    Other,
}

/// Serializable view of one editable block, supplied by the host adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Trimmable editable text content of the block.
    pub text: String,
    /// Persisted custom attributes, including ours when present.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Href of the block's first inline element, if that element is an anchor.
    #[serde(default)]
    pub leading_link: Option<String>,
}

impl BlockSnapshot {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            text: String::new(),
            attributes: BTreeMap::new(),
            leading_link: None,
        }
    }

    /// Shorthand for the most common case, an editable paragraph.
    pub fn paragraph(id: impl Into<BlockId>, text: impl Into<String>) -> Self {
        let mut snapshot = Self::new(id, BlockKind::Paragraph);
        snapshot.text = text.into();
        snapshot
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_leading_link(mut self, href: impl Into<String>) -> Self {
        self.leading_link = Some(href.into());
        self
    }

    /// The persisted original-link attribute value, if non-blank.
    #[must_use]
    pub fn original_link(&self) -> Option<&str> {
        self.attributes
            .get(ORIGINAL_LINK_ATTRIBUTE)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Conversion state of a block, derived from a snapshot and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    /// Empty paragraph; the controller prompts for a URL.
    Empty,
    /// Previously converted; carries the persisted pre-conversion URL.
    Converted { original_url: String },
    /// Ordinary content, possibly opening with a single extractable link.
    Plain { link: Option<String> },
}
