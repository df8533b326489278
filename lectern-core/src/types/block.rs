//! Canonical block model for chapter content

use crate::text;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single block-level unit of chapter content.
///
/// `index` is dense: the blocks of one chapter are numbered `0..n` in document
/// order. Renderer identifiers and narration cursors both address blocks by it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Position within the chapter
    pub index: usize,

    /// Semantic kind of the block
    pub kind: BlockKind,

    /// Plain text; `\n` marks an explicit line break
    pub text: String,

    /// Inline emphasis ranges over `text`, in character offsets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,

    /// Horizontal alignment inherited from the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

/// Block kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,

    /// Heading (h1-h6)
    Heading { level: u8 },

    /// One item of a bullet or numbered list
    ListItem { ordered: bool },

    /// Paragraph inside a block quote
    Quote,

    /// Body cell; `table` is the table's ordinal within the chapter
    TableCell { table: usize, row: usize },

    /// Header cell
    TableHeader { table: usize, row: usize },
}

impl BlockKind {
    /// Create a heading kind, clamping the level to 1-6
    pub fn heading(level: u8) -> Self {
        BlockKind::Heading {
            level: level.clamp(1, 6),
        }
    }

    /// Element tag used when rendering this kind
    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading { level } => match level {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            },
            BlockKind::ListItem { .. } => "li",
            BlockKind::Quote => "blockquote",
            BlockKind::TableCell { .. } => "td",
            BlockKind::TableHeader { .. } => "th",
        }
    }

    /// Short kind name, e.g. `heading-2` or `list-item`
    pub fn name(&self) -> String {
        match self {
            BlockKind::Paragraph => "paragraph".to_string(),
            BlockKind::Heading { level } => format!("heading-{}", level),
            BlockKind::ListItem { .. } => "list-item".to_string(),
            BlockKind::Quote => "quote".to_string(),
            BlockKind::TableCell { .. } => "table-cell".to_string(),
            BlockKind::TableHeader { .. } => "table-header".to_string(),
        }
    }

    /// Table position for cell kinds
    pub fn table_position(&self) -> Option<(usize, usize)> {
        match *self {
            BlockKind::TableCell { table, row } | BlockKind::TableHeader { table, row } => {
                Some((table, row))
            }
            _ => None,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a CSS `text-align` value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Inline emphasis kinds.
///
/// Declaration order is the nesting order used when rendering overlapping spans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl SpanKind {
    pub fn tag(&self) -> &'static str {
        match self {
            SpanKind::Bold => "strong",
            SpanKind::Italic => "em",
            SpanKind::Underline => "u",
            SpanKind::Strikethrough => "s",
            SpanKind::Code => "code",
        }
    }
}

/// Emphasis range over a block's text, `start..end` in characters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Block {
    /// Create a block with no spans or alignment
    pub fn new(index: usize, kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            text: text.into(),
            spans: Vec::new(),
            alignment: None,
        }
    }

    /// Create a paragraph block
    pub fn paragraph(index: usize, text: impl Into<String>) -> Self {
        Self::new(index, BlockKind::Paragraph, text)
    }

    /// Add an emphasis span
    pub fn with_span(mut self, kind: SpanKind, range: Range<usize>) -> Self {
        self.spans.push(Span::new(kind, range.start, range.end));
        self
    }

    /// Set the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Number of whitespace-separated words
    pub fn word_count(&self) -> usize {
        text::word_count(&self.text)
    }

    /// Character ranges of each word
    pub fn word_ranges(&self) -> Vec<Range<usize>> {
        text::word_ranges(&self.text)
    }

    /// Copy of this block restricted to the character range `chars`.
    ///
    /// Spans are clipped to the range and rebased to its start.
    pub fn slice_chars(&self, chars: Range<usize>) -> Block {
        let spans = self
            .spans
            .iter()
            .filter_map(|span| {
                let start = span.start.max(chars.start);
                let end = span.end.min(chars.end);
                (start < end).then(|| Span::new(span.kind, start - chars.start, end - chars.start))
            })
            .collect();

        Block {
            index: self.index,
            kind: self.kind,
            text: text::char_slice(&self.text, chars).to_string(),
            spans,
            alignment: self.alignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(BlockKind::heading(0), BlockKind::Heading { level: 1 });
        assert_eq!(BlockKind::heading(9), BlockKind::Heading { level: 6 });
        assert_eq!(BlockKind::heading(2).tag(), "h2");
        assert_eq!(BlockKind::heading(2).name(), "heading-2");
    }

    #[test]
    fn test_slice_chars_rebases_spans() {
        let block = Block::paragraph(3, "one two three")
            .with_span(SpanKind::Bold, 0..7)
            .with_span(SpanKind::Italic, 8..13);

        let slice = block.slice_chars(4..13);
        assert_eq!(slice.index, 3);
        assert_eq!(slice.text, "two three");
        assert_eq!(
            slice.spans,
            vec![
                Span::new(SpanKind::Bold, 0, 3),
                Span::new(SpanKind::Italic, 4, 9)
            ]
        );
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse(" Center "), Some(Alignment::Center));
        assert_eq!(Alignment::parse("start"), Some(Alignment::Left));
        assert_eq!(Alignment::parse("middle"), None);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&BlockKind::ListItem { ordered: true }).unwrap();
        assert_eq!(json, r#"{"type":"list_item","ordered":true}"#);
    }
}
