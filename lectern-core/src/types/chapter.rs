//! Chapter type holding the canonical blocks of one content load

use super::{Block, Page};
use crate::builder::build_blocks;
use crate::decoder::{self, ContentFormat};
use crate::error::ParseError;
use crate::paginate::Paginator;
use crate::render::{RenderedChapter, Renderer};
use serde::{Deserialize, Serialize};

/// Message shown by display surfaces when a chapter yields no blocks
pub const NO_CONTENT_MESSAGE: &str = "No content available for this chapter.";

/// A single chapter, canonicalized from its stored content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Optional chapter ID supplied by the host
    pub id: Option<String>,

    /// Format the raw content was detected as
    pub format: ContentFormat,

    /// The content blocks, indexed `0..n`
    pub blocks: Vec<Block>,
}

impl Chapter {
    /// Detect the format of `raw` and canonicalize it
    pub fn from_raw(raw: &str) -> Self {
        let content = decoder::classify(raw);
        let format = content.format();
        let blocks = build_blocks(&content);

        tracing::debug!(?format, blocks = blocks.len(), "canonicalized chapter content");

        Self {
            id: None,
            format,
            blocks,
        }
    }

    /// Canonicalize `raw` as a specific format, skipping detection
    pub fn from_raw_as(raw: &str, format: ContentFormat) -> Result<Self, ParseError> {
        let content = decoder::parse_as(raw, format)?;
        Ok(Self {
            id: None,
            format,
            blocks: build_blocks(&content),
        })
    }

    /// Set the chapter ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// True when canonicalization produced no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by index
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Total words across all blocks
    pub fn word_count(&self) -> usize {
        self.blocks.iter().map(Block::word_count).sum()
    }

    /// Render for scroll mode with the default renderer
    pub fn render(&self) -> RenderedChapter {
        Renderer::new().render(&self.blocks)
    }

    /// Split into pages for page-flip mode
    pub fn paginate(&self, paginator: &Paginator) -> Vec<Page> {
        paginator.paginate(&self.blocks)
    }
}
