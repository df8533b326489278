//! Markup renderer
//!
//! Serializes canonical blocks into addressable markup. Every block element
//! carries `id="para-{index}"` and `data-paragraph-index="{index}"`; the
//! highlighter and click handling rely on these, so they depend only on the
//! block index and never change between renders of the same chapter.

use crate::error::ParseError;
use crate::highlight::{self, ActiveHighlight};
use crate::text;
use crate::types::{Block, BlockKind, HighlightCursor, SpanKind};
use scraper::Html;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

/// Class applied to the narration highlight marker
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "narration-highlight";

const BLOCK_RULES: &str = "\
.block { scroll-margin-top: 4rem; }
.block[data-paragraph-index] { cursor: pointer; }
";

const HIGHLIGHT_DECLARATIONS: &str =
    "background-color: #fde68a; color: inherit; border-radius: 2px;";

/// Stylesheet shipped alongside chapters rendered with the default class.
///
/// [`Renderer::stylesheet`] gives the matching sheet for any other class.
pub const READER_STYLESHEET: &str = "\
.block { scroll-margin-top: 4rem; }
.block[data-paragraph-index] { cursor: pointer; }
mark.narration-highlight { background-color: #fde68a; color: inherit; border-radius: 2px; }
";

/// Element identifier of a rendered block, `para-{index}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl BlockId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "para-{}", self.0)
    }
}

impl FromStr for BlockId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidBlockId(s.to_string());
        let digits = s.strip_prefix("para-").ok_or_else(invalid)?;

        // Only the canonical spelling produced by Display is accepted
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        if !canonical {
            return Err(invalid());
        }

        digits.parse().map(BlockId).map_err(|_| invalid())
    }
}

/// Renders blocks to markup
#[derive(Debug, Clone)]
pub struct Renderer {
    highlight_class: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
        }
    }

    /// Set the class used on the highlight marker
    pub fn with_highlight_class(mut self, class: impl Into<String>) -> Self {
        self.highlight_class = class.into();
        self
    }

    pub fn highlight_class(&self) -> &str {
        &self.highlight_class
    }

    /// Reader stylesheet whose highlight rule targets this renderer's marker
    pub fn stylesheet(&self) -> String {
        if self.highlight_class == DEFAULT_HIGHLIGHT_CLASS {
            return READER_STYLESHEET.to_string();
        }

        let selector: Vec<&str> = self.highlight_class.split_whitespace().collect();
        format!(
            "{}mark.{} {{ {} }}\n",
            BLOCK_RULES,
            selector.join("."),
            HIGHLIGHT_DECLARATIONS
        )
    }

    /// Render blocks into an addressable chapter model
    pub fn render(&self, blocks: &[Block]) -> RenderedChapter {
        let element_ids = blocks
            .iter()
            .map(|b| (b.index, BlockId(b.index).to_string()))
            .collect();

        RenderedChapter {
            blocks: Arc::new(blocks.to_vec()),
            element_ids: Arc::new(element_ids),
            highlight: None,
            highlight_class: self.highlight_class.clone(),
        }
    }

    /// Render blocks straight to a markup string
    pub fn render_html(&self, blocks: &[Block]) -> String {
        self.render(blocks).html()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A rendered chapter: its blocks, their element ids and the active highlight.
///
/// The model is immutable; highlighting produces a new model and the host
/// patches its display from [`RenderedChapter::element_html`]. Clones share
/// the block list.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChapter {
    blocks: Arc<Vec<Block>>,
    element_ids: Arc<BTreeMap<usize, String>>,
    highlight: Option<ActiveHighlight>,
    highlight_class: String,
}

impl RenderedChapter {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by index
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks
            .get(index)
            .filter(|b| b.index == index)
            .or_else(|| self.blocks.iter().find(|b| b.index == index))
    }

    /// Map from block index to element id
    pub fn element_ids(&self) -> &BTreeMap<usize, String> {
        &self.element_ids
    }

    pub fn element_id(&self, index: usize) -> Option<&str> {
        self.element_ids.get(&index).map(String::as_str)
    }

    pub fn highlight(&self) -> Option<&ActiveHighlight> {
        self.highlight.as_ref()
    }

    pub fn highlight_class(&self) -> &str {
        &self.highlight_class
    }

    /// Full markup, with list and table wrappers
    pub fn html(&self) -> String {
        let fragments: Vec<Fragment> = self
            .blocks
            .iter()
            .map(|block| Fragment {
                block,
                word_offset: None,
                highlight: self.highlight_range(block.index),
            })
            .collect();

        let mut out = String::new();
        write_fragments(&mut out, &fragments, &self.highlight_class);
        out
    }

    /// Markup of a single block element, without wrappers
    pub fn element_html(&self, index: usize) -> Option<String> {
        let block = self.block(index)?;
        let mut out = String::new();
        write_element(
            &mut out,
            &Fragment {
                block,
                word_offset: None,
                highlight: self.highlight_range(index),
            },
            &self.highlight_class,
        );
        Some(out)
    }

    /// Copy of this chapter with `cursor` as the only highlight.
    ///
    /// Any previous highlight is gone. Cursors that do not resolve to a word
    /// range of an existing block leave the copy unhighlighted.
    pub fn with_highlight(&self, cursor: HighlightCursor) -> Self {
        let highlight = self
            .block(cursor.block_index)
            .and_then(|block| highlight::resolve(block, cursor));

        Self {
            highlight,
            ..self.clone()
        }
    }

    /// Copy of this chapter without any highlight
    pub fn without_highlight(&self) -> Self {
        Self {
            highlight: None,
            ..self.clone()
        }
    }

    /// The currently highlighted text, if any
    pub fn highlighted_text(&self) -> Option<&str> {
        let active = self.highlight.as_ref()?;
        let block = self.block(active.cursor.block_index)?;
        Some(text::char_slice(&block.text, active.chars.clone()))
    }

    /// Block index of a rendered element id, if that block exists
    pub fn resolve_element(&self, element_id: &str) -> Option<usize> {
        let id: BlockId = element_id.parse().ok()?;
        self.element_ids.contains_key(&id.index()).then_some(id.index())
    }

    fn highlight_range(&self, index: usize) -> Option<Range<usize>> {
        self.highlight
            .as_ref()
            .filter(|h| h.cursor.block_index == index)
            .map(|h| h.chars.clone())
    }
}

/// Paragraph index reported by an activated element's markup.
///
/// Reads the first `data-paragraph-index` attribute found; returns `None` when
/// there is none or it is not a number.
pub fn activated_paragraph(markup: &str) -> Option<usize> {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .find_map(|el| el.attr("data-paragraph-index"))
        .and_then(|value| value.trim().parse().ok())
}

/// A block, or a slice of one, ready to be written
pub(crate) struct Fragment<'a> {
    pub block: &'a Block,
    /// First word of the source block, for chunks of split blocks
    pub word_offset: Option<usize>,
    pub highlight: Option<Range<usize>>,
}

/// Synthesized wrapper around runs of list items or table cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrapper {
    List { ordered: bool },
    Table { table: usize, row: usize },
}

impl Wrapper {
    fn for_kind(kind: &BlockKind) -> Option<Self> {
        match *kind {
            BlockKind::ListItem { ordered } => Some(Wrapper::List { ordered }),
            BlockKind::TableCell { table, row } | BlockKind::TableHeader { table, row } => {
                Some(Wrapper::Table { table, row })
            }
            _ => None,
        }
    }

    fn open(&self, out: &mut String) {
        match self {
            Wrapper::List { ordered: false } => out.push_str("<ul>\n"),
            Wrapper::List { ordered: true } => out.push_str("<ol>\n"),
            Wrapper::Table { .. } => out.push_str("<table>\n<tbody>\n<tr>\n"),
        }
    }

    fn close(&self, out: &mut String) {
        match self {
            Wrapper::List { ordered: false } => out.push_str("</ul>\n"),
            Wrapper::List { ordered: true } => out.push_str("</ol>\n"),
            Wrapper::Table { .. } => out.push_str("</tr>\n</tbody>\n</table>\n"),
        }
    }
}

/// Write fragments, grouping contiguous list items and table cells
pub(crate) fn write_fragments(out: &mut String, fragments: &[Fragment], highlight_class: &str) {
    let mut open: Option<Wrapper> = None;

    for fragment in fragments {
        let next = Wrapper::for_kind(&fragment.block.kind);

        match (open, next) {
            (
                Some(Wrapper::Table { table: a, row: r1 }),
                Some(Wrapper::Table { table: b, row: r2 }),
            ) if a == b && r1 != r2 => out.push_str("</tr>\n<tr>\n"),
            (current, next) if current == next => {}
            (current, next) => {
                if let Some(wrapper) = current {
                    wrapper.close(out);
                }
                if let Some(wrapper) = next {
                    wrapper.open(out);
                }
            }
        }
        open = next;

        write_element(out, fragment, highlight_class);
    }

    if let Some(wrapper) = open {
        wrapper.close(out);
    }
}

fn write_element(out: &mut String, fragment: &Fragment, highlight_class: &str) {
    let block = fragment.block;
    let tag = block.kind.tag();

    out.push_str(&format!(
        "<{tag} id=\"{}\" class=\"block block-{}\" data-paragraph-index=\"{}\"",
        BlockId(block.index),
        block.kind.name(),
        block.index
    ));
    if let Some(offset) = fragment.word_offset {
        out.push_str(&format!(" data-word-offset=\"{}\"", offset));
    }
    if let Some(alignment) = block.alignment {
        out.push_str(&format!(" style=\"text-align: {}\"", alignment.as_css()));
    }
    out.push('>');

    write_inline(out, block, fragment.highlight.clone(), highlight_class);

    out.push_str(&format!("</{tag}>\n"));
}

/// Inline layers, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    Highlight,
    Emphasis(SpanKind),
}

/// Write block text with emphasis spans and the highlight as nested tags.
///
/// The text is cut at every span boundary; for each piece the open tags are
/// adjusted to the active layer set, closing only what no longer applies.
fn write_inline(
    out: &mut String,
    block: &Block,
    highlight: Option<Range<usize>>,
    highlight_class: &str,
) {
    let chars: Vec<char> = block.text.chars().collect();
    let len = chars.len();

    let mut bounds = vec![0, len];
    for span in &block.spans {
        bounds.push(span.start.min(len));
        bounds.push(span.end.min(len));
    }
    if let Some(range) = &highlight {
        bounds.push(range.start.min(len));
        bounds.push(range.end.min(len));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut stack: Vec<Layer> = Vec::new();

    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);

        let mut active: Vec<Layer> = block
            .spans
            .iter()
            .filter(|s| s.start <= start && end <= s.end)
            .map(|s| Layer::Emphasis(s.kind))
            .collect();
        if highlight
            .as_ref()
            .is_some_and(|h| h.start <= start && end <= h.end)
        {
            active.push(Layer::Highlight);
        }
        active.sort();
        active.dedup();

        let keep = stack
            .iter()
            .zip(&active)
            .take_while(|(open, wanted)| open == wanted)
            .count();
        for layer in stack.drain(keep..).rev() {
            close_layer(out, layer);
        }
        for &layer in &active[keep..] {
            open_layer(out, layer, highlight_class);
            stack.push(layer);
        }

        let segment: String = chars[start..end].iter().collect();
        out.push_str(&escape_html(&segment).replace('\n', "<br>"));
    }

    for layer in stack.into_iter().rev() {
        close_layer(out, layer);
    }
}

fn open_layer(out: &mut String, layer: Layer, highlight_class: &str) {
    match layer {
        Layer::Highlight => {
            out.push_str(&format!("<mark class=\"{}\">", escape_html(highlight_class)))
        }
        Layer::Emphasis(kind) => out.push_str(&format!("<{}>", kind.tag())),
    }
}

fn close_layer(out: &mut String, layer: Layer) {
    match layer {
        Layer::Highlight => out.push_str("</mark>"),
        Layer::Emphasis(kind) => out.push_str(&format!("</{}>", kind.tag())),
    }
}

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
