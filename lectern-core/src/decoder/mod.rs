//! Format detection and parsing of stored chapter content
//!
//! Stored chapters arrive as one of three representations. [`classify`] tries
//! them in a fixed order and returns the first that matches:
//!
//! 1. a structured document tree (JSON with a root `content` list),
//! 2. markup (starts with a tag and closes at least one block element),
//! 3. plain text with blank-line paragraph breaks.
//!
//! Detection never fails; anything unrecognized is plain text.

mod markup;
mod plain;
mod tree;

pub use markup::looks_like_markup;
pub use plain::split_paragraphs;
pub use tree::{Mark, MarkKind, NodeAttrs, NodeKind, TreeNode};

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// The detected representation of a stored chapter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    StructuredTree,
    Markup,
    PlainText,
}

impl ContentFormat {
    /// Parse a format name as accepted on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tree" | "json" | "structured" | "structured_tree" => Some(Self::StructuredTree),
            "markup" | "html" => Some(Self::Markup),
            "text" | "plain" | "plain_text" | "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Stored content parsed into its native shape
#[derive(Debug)]
pub enum RawContent {
    /// Rich-document tree rooted at a `doc` node
    StructuredTree(TreeNode),

    /// Parsed markup document
    Markup(scraper::Html),

    /// Paragraph strings split on blank lines
    PlainText(Vec<String>),
}

impl RawContent {
    pub fn format(&self) -> ContentFormat {
        match self {
            RawContent::StructuredTree(_) => ContentFormat::StructuredTree,
            RawContent::Markup(_) => ContentFormat::Markup,
            RawContent::PlainText(_) => ContentFormat::PlainText,
        }
    }
}

/// Detect the format of `raw` and parse it
pub fn classify(raw: &str) -> RawContent {
    match tree::parse_tree(raw) {
        Ok(root) => return RawContent::StructuredTree(root),
        Err(e) => tracing::trace!("not a document tree: {}", e),
    }

    if looks_like_markup(raw) {
        return RawContent::Markup(markup::parse_markup(raw));
    }

    RawContent::PlainText(split_paragraphs(raw))
}

/// Parse `raw` as the given format without detection.
///
/// Only a forced tree parse can fail; markup and plain text always parse.
pub fn parse_as(raw: &str, format: ContentFormat) -> Result<RawContent, ParseError> {
    Ok(match format {
        ContentFormat::StructuredTree => RawContent::StructuredTree(tree::parse_tree(raw)?),
        ContentFormat::Markup => RawContent::Markup(markup::parse_markup(raw)),
        ContentFormat::PlainText => RawContent::PlainText(split_paragraphs(raw)),
    })
}
