//! Canonical model builder
//!
//! Flattens every parsed content shape into one ordered list of [`Block`]s.
//! Containers (lists, quotes, tables) never produce blocks themselves; their
//! children become sibling blocks. Inline emphasis is recorded as character
//! spans rather than nested markup. Blocks whose trimmed text is empty are
//! dropped and the rest are numbered densely from 0.

use crate::decoder::{MarkKind, NodeKind, RawContent, TreeNode};
use crate::text;
use crate::types::{Alignment, Block, BlockKind, Span, SpanKind};
use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Node};
use std::sync::LazyLock;

static TEXT_ALIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)text-align\s*:\s*([a-z-]+)").unwrap());

/// Build the canonical block list for parsed content
pub fn build_blocks(content: &RawContent) -> Vec<Block> {
    let drafts = match content {
        RawContent::StructuredTree(root) => TreeWalker::default().walk_document(root),
        RawContent::Markup(html) => MarkupWalker::default().walk_document(html),
        RawContent::PlainText(paragraphs) => paragraphs
            .iter()
            .map(|p| {
                let mut draft = Draft::new(BlockKind::Paragraph, TextBuffer::verbatim(), None);
                draft.text.push_str(p, &[]);
                draft
            })
            .collect(),
    };

    finalize(drafts)
}

/// Drop empty drafts and assign dense indices
fn finalize(drafts: Vec<Draft>) -> Vec<Block> {
    drafts
        .into_iter()
        .filter_map(|draft| {
            let (text, spans) = draft.text.finish();
            (!text.is_empty()).then_some((draft.kind, text, spans, draft.alignment))
        })
        .enumerate()
        .map(|(index, (kind, text, spans, alignment))| Block {
            index,
            kind,
            text,
            spans,
            alignment,
        })
        .collect()
}

/// A block under construction
struct Draft {
    kind: BlockKind,
    text: TextBuffer,
    alignment: Option<Alignment>,
}

impl Draft {
    fn new(kind: BlockKind, text: TextBuffer, alignment: Option<Alignment>) -> Self {
        Self {
            kind,
            text,
            alignment,
        }
    }
}

fn paragraph_kind(quoted: bool) -> BlockKind {
    if quoted {
        BlockKind::Quote
    } else {
        BlockKind::Paragraph
    }
}

/// Text accumulator that records emphasis spans as it goes
#[derive(Default)]
struct TextBuffer {
    text: String,
    /// Length of `text` in chars
    len: usize,
    spans: Vec<Span>,
    /// Collapse whitespace runs the way markup rendering does
    collapse: bool,
    pending_space: bool,
}

impl TextBuffer {
    fn collapsing() -> Self {
        Self {
            collapse: true,
            ..Self::default()
        }
    }

    fn verbatim() -> Self {
        Self::default()
    }

    fn push_char(&mut self, c: char) {
        self.text.push(c);
        self.len += 1;
    }

    fn push_str(&mut self, s: &str, marks: &[SpanKind]) {
        let mut start = None;

        for c in s.chars() {
            if self.collapse {
                if c.is_whitespace() {
                    self.pending_space = true;
                    continue;
                }
                if self.pending_space {
                    if self.len > 0 && !self.text.ends_with('\n') {
                        self.push_char(' ');
                    }
                    self.pending_space = false;
                }
            }
            start.get_or_insert(self.len);
            self.push_char(c);
        }

        if let Some(start) = start {
            for &kind in marks {
                self.spans.push(Span::new(kind, start, self.len));
            }
        }
    }

    /// Explicit line break
    fn push_break(&mut self) {
        self.pending_space = false;
        self.push_char('\n');
    }

    /// Word boundary between block-level pieces flattened into one block
    fn push_separator(&mut self) {
        if self.collapse {
            self.pending_space = true;
        } else if self.text.chars().last().is_some_and(|c| !c.is_whitespace()) {
            self.push_char(' ');
        }
    }

    /// Trim surrounding whitespace and return the text with normalized spans
    fn finish(self) -> (String, Vec<Span>) {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return (String::new(), Vec::new());
        }

        let lead = self.text.chars().take_while(|c| c.is_whitespace()).count();
        let len = text::char_len(trimmed);

        let mut spans: Vec<Span> = self
            .spans
            .iter()
            .filter_map(|span| {
                let start = span.start.saturating_sub(lead).min(len);
                let end = span.end.saturating_sub(lead).min(len);
                (start < end).then(|| Span::new(span.kind, start, end))
            })
            .collect();

        // Merge touching or overlapping spans of the same kind
        spans.sort_by_key(|s| (s.kind, s.start));
        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if last.kind == span.kind && span.start <= last.end => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        merged.sort_by_key(|s| (s.start, s.kind));

        (trimmed.to_string(), merged)
    }
}

// =============================================================================
// Structured tree
// =============================================================================

#[derive(Default)]
struct TreeWalker {
    drafts: Vec<Draft>,
    tables: usize,
}

impl TreeWalker {
    fn walk_document(mut self, root: &TreeNode) -> Vec<Draft> {
        self.walk(root, false);
        self.drafts
    }

    fn walk(&mut self, node: &TreeNode, quoted: bool) {
        match node.kind {
            NodeKind::Doc => self.walk_children(node, quoted),
            NodeKind::Paragraph => self.inline_block(node, paragraph_kind(quoted)),
            NodeKind::Heading => {
                self.inline_block(node, BlockKind::heading(node.level().unwrap_or(1)))
            }
            NodeKind::BulletList | NodeKind::OrderedList => {
                let ordered = node.kind == NodeKind::OrderedList;
                for item in &node.content {
                    if item.kind == NodeKind::ListItem {
                        self.list_item(item, ordered, quoted);
                    } else {
                        self.walk(item, quoted);
                    }
                }
            }
            NodeKind::ListItem => self.list_item(node, false, quoted),
            NodeKind::Blockquote => self.walk_children(node, true),
            NodeKind::Table => self.table(&node.content, quoted),
            NodeKind::TableRow => self.table(std::slice::from_ref(node), quoted),
            NodeKind::TableCell | NodeKind::TableHeader => {
                let table = self.next_table();
                self.cell(node, table, 0);
            }
            NodeKind::Text | NodeKind::HardBreak => {
                let mut draft = Draft::new(paragraph_kind(quoted), TextBuffer::verbatim(), None);
                tree_inline(node, &mut draft.text, None);
                self.drafts.push(draft);
            }
            NodeKind::Unknown => {
                if node.content.iter().any(|c| c.kind.is_inline()) {
                    self.inline_block(node, paragraph_kind(quoted));
                } else {
                    self.walk_children(node, quoted);
                }
            }
        }
    }

    /// Walk block children; consecutive loose inline nodes form one paragraph
    fn walk_children(&mut self, node: &TreeNode, quoted: bool) {
        let mut loose: Option<Draft> = None;

        for child in &node.content {
            if child.kind.is_inline() {
                let draft = loose.get_or_insert_with(|| {
                    Draft::new(paragraph_kind(quoted), TextBuffer::verbatim(), None)
                });
                tree_inline(child, &mut draft.text, None);
            } else {
                self.drafts.extend(loose.take());
                self.walk(child, quoted);
            }
        }

        self.drafts.extend(loose.take());
    }

    fn inline_block(&mut self, node: &TreeNode, kind: BlockKind) {
        let mut draft = Draft::new(kind, TextBuffer::verbatim(), tree_alignment(node));
        for child in &node.content {
            tree_inline(child, &mut draft.text, None);
        }
        self.drafts.push(draft);
    }

    /// One list item; nested lists follow it as sibling items
    fn list_item(&mut self, node: &TreeNode, ordered: bool, quoted: bool) {
        let mut draft = Draft::new(
            BlockKind::ListItem { ordered },
            TextBuffer::verbatim(),
            tree_alignment(node),
        );
        let mut nested = Vec::new();
        for child in &node.content {
            tree_inline(child, &mut draft.text, Some(&mut nested));
        }
        self.drafts.push(draft);

        for list in nested {
            self.walk(list, quoted);
        }
    }

    fn table(&mut self, rows: &[TreeNode], quoted: bool) {
        let table = self.next_table();
        let mut row = 0;

        for node in rows {
            if node.kind == NodeKind::TableRow {
                for cell in &node.content {
                    self.cell(cell, table, row);
                }
                row += 1;
            } else {
                self.walk(node, quoted);
            }
        }
    }

    fn cell(&mut self, node: &TreeNode, table: usize, row: usize) {
        let kind = if node.kind == NodeKind::TableHeader {
            BlockKind::TableHeader { table, row }
        } else {
            BlockKind::TableCell { table, row }
        };

        let mut draft = Draft::new(kind, TextBuffer::verbatim(), tree_alignment(node));
        if node.kind.is_inline() {
            tree_inline(node, &mut draft.text, None);
        } else {
            for child in &node.content {
                tree_inline(child, &mut draft.text, None);
            }
        }
        self.drafts.push(draft);
    }

    fn next_table(&mut self) -> usize {
        self.tables += 1;
        self.tables - 1
    }
}

/// Append the inline content of `node` to `buf`.
///
/// Block nodes met on the way are flattened with a word separator. When
/// `nested` is given, nested lists are collected there instead.
fn tree_inline<'a>(
    node: &'a TreeNode,
    buf: &mut TextBuffer,
    mut nested: Option<&mut Vec<&'a TreeNode>>,
) {
    match node.kind {
        NodeKind::Text => {
            let marks: Vec<SpanKind> =
                node.marks.iter().filter_map(|m| span_kind(m.kind)).collect();
            buf.push_str(node.text.as_deref().unwrap_or_default(), &marks);
        }
        NodeKind::HardBreak => buf.push_break(),
        NodeKind::BulletList | NodeKind::OrderedList if nested.is_some() => {
            if let Some(nested) = nested {
                nested.push(node);
            }
        }
        _ => {
            buf.push_separator();
            for child in &node.content {
                tree_inline(child, buf, nested.as_deref_mut());
            }
            buf.push_separator();
        }
    }
}

fn span_kind(mark: MarkKind) -> Option<SpanKind> {
    match mark {
        MarkKind::Bold => Some(SpanKind::Bold),
        MarkKind::Italic => Some(SpanKind::Italic),
        MarkKind::Underline => Some(SpanKind::Underline),
        MarkKind::Strike => Some(SpanKind::Strikethrough),
        MarkKind::Code => Some(SpanKind::Code),
        MarkKind::Other => None,
    }
}

fn tree_alignment(node: &TreeNode) -> Option<Alignment> {
    node.text_align().and_then(Alignment::parse)
}

// =============================================================================
// Markup
// =============================================================================

/// How an element participates in block flattening
#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Paragraph,
    Heading(u8),
    List { ordered: bool },
    ListItem,
    Quote,
    Table,
    Container,
    Preformatted,
    Skip,
    Inline,
}

fn role(name: &str) -> Role {
    match name {
        "p" => Role::Paragraph,
        "h1" => Role::Heading(1),
        "h2" => Role::Heading(2),
        "h3" => Role::Heading(3),
        "h4" => Role::Heading(4),
        "h5" => Role::Heading(5),
        "h6" => Role::Heading(6),
        "ul" => Role::List { ordered: false },
        "ol" => Role::List { ordered: true },
        "li" => Role::ListItem,
        "blockquote" => Role::Quote,
        "table" => Role::Table,
        "body" | "div" | "section" | "article" | "main" | "header" | "footer" | "aside"
        | "nav" | "figure" | "figcaption" | "center" => Role::Container,
        "pre" => Role::Preformatted,
        "head" | "title" | "meta" | "link" | "script" | "style" | "template" | "noscript"
        | "hr" | "img" => Role::Skip,
        _ => Role::Inline,
    }
}

fn inline_mark(name: &str) -> Option<SpanKind> {
    match name {
        "b" | "strong" => Some(SpanKind::Bold),
        "i" | "em" | "cite" | "dfn" => Some(SpanKind::Italic),
        "u" | "ins" => Some(SpanKind::Underline),
        "s" | "strike" | "del" => Some(SpanKind::Strikethrough),
        "code" | "kbd" | "samp" | "tt" => Some(SpanKind::Code),
        _ => None,
    }
}

fn markup_alignment(element: &Element) -> Option<Alignment> {
    element
        .attr("style")
        .and_then(|style| TEXT_ALIGN.captures(style))
        .and_then(|caps| Alignment::parse(&caps[1]))
        .or_else(|| element.attr("align").and_then(Alignment::parse))
        .or_else(|| (element.name() == "center").then_some(Alignment::Center))
}

fn is_block_role(role: Role) -> bool {
    !matches!(role, Role::Inline | Role::Skip)
}

/// Whether any element below `node` starts a block of its own
fn has_block_descendant(node: NodeRef<Node>) -> bool {
    node.descendants().skip(1).any(|n| {
        n.value()
            .as_element()
            .is_some_and(|el| is_block_role(role(el.name())))
    })
}

/// Block flow context inherited from enclosing containers
#[derive(Debug, Clone, Default)]
struct Flow {
    quoted: bool,
    /// Keep inline content that sits directly in the container
    keep_loose: bool,
    alignment: Option<Alignment>,
    /// Emphasis from inline wrappers around whole blocks
    marks: Vec<SpanKind>,
}

impl Flow {
    /// Flow inside an inline element that wraps blocks
    fn wrapped(&self, element: &Element) -> Flow {
        let mut flow = self.clone();
        flow.alignment = markup_alignment(element).or(self.alignment);
        flow.marks.extend(inline_mark(element.name()));
        flow
    }
}

#[derive(Default)]
struct MarkupWalker {
    drafts: Vec<Draft>,
    tables: usize,
}

impl MarkupWalker {
    fn walk_document(mut self, html: &Html) -> Vec<Draft> {
        let root = html.tree.root();
        let body = root
            .descendants()
            .find(|n| n.value().as_element().is_some_and(|e| e.name() == "body"))
            .unwrap_or(root);

        // Text loose in <body> is not inside any recognized block
        self.walk_flow(body, &Flow::default());
        self.drafts
    }

    fn walk_flow(&mut self, node: NodeRef<Node>, flow: &Flow) {
        let mut loose: Option<Draft> = None;
        let mut nested = Vec::new();

        for child in node.children() {
            match child.value().as_element() {
                Some(el) if is_block_role(role(el.name())) => {
                    self.flush_loose(&mut loose, &mut nested, flow);
                    self.walk_block(child, el, flow);
                }
                // Editors wrap whole paragraphs in <span>, <b>, <font>...
                Some(el) if role(el.name()) == Role::Inline && has_block_descendant(child) => {
                    self.flush_loose(&mut loose, &mut nested, flow);
                    self.walk_flow(child, &flow.wrapped(el));
                }
                _ if flow.keep_loose => {
                    let draft = loose.get_or_insert_with(|| {
                        Draft::new(
                            paragraph_kind(flow.quoted),
                            TextBuffer::collapsing(),
                            flow.alignment,
                        )
                    });
                    let mut marks = flow.marks.clone();
                    markup_inline(child, &mut draft.text, &mut marks, Some(&mut nested));
                }
                _ => {}
            }
        }

        self.flush_loose(&mut loose, &mut nested, flow);
    }

    fn flush_loose<'a>(
        &mut self,
        loose: &mut Option<Draft>,
        nested: &mut Vec<NodeRef<'a, Node>>,
        flow: &Flow,
    ) {
        self.drafts.extend(loose.take());
        for list in std::mem::take(nested) {
            if let Some(el) = list.value().as_element() {
                self.walk_block(list, el, flow);
            }
        }
    }

    fn walk_block(&mut self, node: NodeRef<Node>, element: &Element, flow: &Flow) {
        let alignment = markup_alignment(element).or(flow.alignment);

        match role(element.name()) {
            Role::Paragraph => {
                self.inline_block(node, paragraph_kind(flow.quoted), alignment, flow)
            }
            Role::Heading(level) => {
                self.inline_block(node, BlockKind::heading(level), alignment, flow)
            }
            Role::ListItem => {
                self.inline_block(node, BlockKind::ListItem { ordered: false }, alignment, flow)
            }
            Role::List { ordered } => {
                for child in node.children() {
                    let Some(el) = child.value().as_element() else {
                        continue;
                    };
                    match role(el.name()) {
                        Role::ListItem => {
                            let alignment = markup_alignment(el).or(alignment);
                            self.inline_block(
                                child,
                                BlockKind::ListItem { ordered },
                                alignment,
                                flow,
                            );
                        }
                        Role::Inline | Role::Skip => {}
                        _ => self.walk_block(child, el, flow),
                    }
                }
            }
            Role::Quote => self.walk_flow(
                node,
                &Flow {
                    quoted: true,
                    keep_loose: true,
                    alignment,
                    marks: flow.marks.clone(),
                },
            ),
            Role::Table => self.table(node),
            Role::Container => self.walk_flow(
                node,
                &Flow {
                    keep_loose: true,
                    alignment,
                    ..flow.clone()
                },
            ),
            Role::Preformatted => {
                let mut draft =
                    Draft::new(paragraph_kind(flow.quoted), TextBuffer::verbatim(), alignment);
                markup_inline_children(node, &mut draft.text, &mut flow.marks.clone(), None);
                self.drafts.push(draft);
            }
            Role::Skip | Role::Inline => {}
        }
    }

    /// A block whose content is inline; nested lists follow it as siblings
    fn inline_block(
        &mut self,
        node: NodeRef<Node>,
        kind: BlockKind,
        alignment: Option<Alignment>,
        flow: &Flow,
    ) {
        let mut draft = Draft::new(kind, TextBuffer::collapsing(), alignment);
        let mut nested = Vec::new();
        let mut marks = flow.marks.clone();
        markup_inline_children(node, &mut draft.text, &mut marks, Some(&mut nested));
        self.drafts.push(draft);

        for list in nested {
            if let Some(el) = list.value().as_element() {
                self.walk_block(list, el, flow);
            }
        }
    }

    fn table(&mut self, node: NodeRef<Node>) {
        let table = self.tables;
        self.tables += 1;
        let mut row = 0;
        self.table_rows(node, table, &mut row);
    }

    /// Visit `tr` elements below `node`, descending through row groups only
    fn table_rows(&mut self, node: NodeRef<Node>, table: usize, row: &mut usize) {
        for child in node.children() {
            let Some(el) = child.value().as_element() else {
                continue;
            };
            match el.name() {
                "thead" | "tbody" | "tfoot" => self.table_rows(child, table, row),
                "tr" => {
                    for cell in child.children() {
                        let Some(cell_el) = cell.value().as_element() else {
                            continue;
                        };
                        let kind = match cell_el.name() {
                            "td" => BlockKind::TableCell { table, row: *row },
                            "th" => BlockKind::TableHeader { table, row: *row },
                            _ => continue,
                        };
                        let mut draft =
                            Draft::new(kind, TextBuffer::collapsing(), markup_alignment(cell_el));
                        markup_inline_children(cell, &mut draft.text, &mut Vec::new(), None);
                        self.drafts.push(draft);
                    }
                    *row += 1;
                }
                _ => {}
            }
        }
    }
}

fn markup_inline_children<'a>(
    node: NodeRef<'a, Node>,
    buf: &mut TextBuffer,
    marks: &mut Vec<SpanKind>,
    mut nested: Option<&mut Vec<NodeRef<'a, Node>>>,
) {
    for child in node.children() {
        markup_inline(child, buf, marks, nested.as_deref_mut());
    }
}

/// Append the inline content of `node` to `buf`.
///
/// Block elements met on the way are flattened with a word separator. When
/// `nested` is given, nested lists are collected there instead.
fn markup_inline<'a>(
    node: NodeRef<'a, Node>,
    buf: &mut TextBuffer,
    marks: &mut Vec<SpanKind>,
    mut nested: Option<&mut Vec<NodeRef<'a, Node>>>,
) {
    match node.value() {
        Node::Text(text) => buf.push_str(text, marks),
        Node::Element(el) => {
            let name = el.name();
            if name == "br" {
                buf.push_break();
                return;
            }

            let kind = role(name);
            match kind {
                Role::Skip => return,
                Role::List { .. } => {
                    if let Some(nested) = nested.as_deref_mut() {
                        nested.push(node);
                        return;
                    }
                }
                _ => {}
            }

            let block_like = kind != Role::Inline;
            let mark = inline_mark(name);

            if block_like {
                buf.push_separator();
            }
            if let Some(mark) = mark {
                marks.push(mark);
            }
            markup_inline_children(node, buf, marks, nested);
            if mark.is_some() {
                marks.pop();
            }
            if block_like {
                buf.push_separator();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::classify;

    fn blocks(raw: &str) -> Vec<Block> {
        build_blocks(&classify(raw))
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_plain_text_paragraphs() {
        let blocks = blocks("Hello world.\n\nSecond paragraph here.");
        assert_eq!(texts(&blocks), vec!["Hello world.", "Second paragraph here."]);
        assert_eq!(blocks[1].index, 1);
        assert!(blocks.iter().all(|b| b.spans.is_empty()));
    }

    #[test]
    fn test_plain_text_soft_breaks() {
        let blocks = blocks("Line one\nline two");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Line one\nline two");
    }

    #[test]
    fn test_markup_blocks_and_spans() {
        let blocks = blocks("<h1>Title</h1>\n<p>This is <strong>very bold</strong> text.</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading { level: 1 });
        assert_eq!(blocks[1].text, "This is very bold text.");
        assert_eq!(blocks[1].spans, vec![Span::new(SpanKind::Bold, 8, 17)]);
    }

    #[test]
    fn test_markup_whitespace_collapse_and_breaks() {
        let blocks = blocks("<p>\n  Roses   are red,<br/>\n  violets <em>are</em> blue\n</p>");
        assert_eq!(blocks[0].text, "Roses are red,\nviolets are blue");
        assert_eq!(blocks[0].spans, vec![Span::new(SpanKind::Italic, 23, 26)]);
    }

    #[test]
    fn test_markup_lists_flatten() {
        let blocks = blocks("<ul><li>One</li><li>Two<ol><li>Two.a</li></ol></li><li>Three</li></ul>");
        assert_eq!(texts(&blocks), vec!["One", "Two", "Two.a", "Three"]);
        assert_eq!(blocks[0].kind, BlockKind::ListItem { ordered: false });
        assert_eq!(blocks[2].kind, BlockKind::ListItem { ordered: true });
        assert_eq!(blocks[3].kind, BlockKind::ListItem { ordered: false });
    }

    #[test]
    fn test_markup_quote_and_alignment() {
        let blocks = blocks(
            r#"<blockquote><p>Quoted</p>loose words</blockquote><p style="text-align: center">Mid</p>"#,
        );
        assert_eq!(texts(&blocks), vec!["Quoted", "loose words", "Mid"]);
        assert_eq!(blocks[0].kind, BlockKind::Quote);
        assert_eq!(blocks[1].kind, BlockKind::Quote);
        assert_eq!(blocks[2].alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_markup_table_cells_row_major() {
        let blocks = blocks(
            "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table>",
        );
        assert_eq!(texts(&blocks), vec!["A", "B", "1", "2"]);
        assert_eq!(blocks[0].kind, BlockKind::TableHeader { table: 0, row: 0 });
        assert_eq!(blocks[3].kind, BlockKind::TableCell { table: 0, row: 1 });
    }

    #[test]
    fn test_markup_without_blocks_is_empty() {
        assert!(blocks("<div></div>").is_empty());
        assert!(blocks("<table></table>").is_empty());
    }

    #[test]
    fn test_markup_empty_blocks_dropped_and_reindexed() {
        let blocks = blocks("<p>First</p><p>   </p><p><br></p><p>Second</p>");
        assert_eq!(texts(&blocks), vec!["First", "Second"]);
        assert_eq!(blocks[1].index, 1);
    }

    #[test]
    fn test_tree_flattening() {
        let raw = r#"{"type":"doc","content":[
            {"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Chapter"}]},
            {"type":"bulletList","content":[
                {"type":"listItem","content":[{"type":"paragraph","content":[{"type":"text","text":"a"}]}]},
                {"type":"listItem","content":[{"type":"paragraph","content":[{"type":"text","text":"b"}]}]},
                {"type":"listItem","content":[{"type":"paragraph","content":[{"type":"text","text":"c"}]}]}
            ]},
            {"type":"blockquote","content":[{"type":"paragraph","content":[{"type":"text","text":"quoted"}]}]},
            {"type":"paragraph","content":[]}
        ]}"#;

        let blocks = blocks(raw);
        assert_eq!(texts(&blocks), vec!["Chapter", "a", "b", "c", "quoted"]);
        assert_eq!(blocks[0].kind, BlockKind::Heading { level: 2 });
        assert!(blocks[1..4]
            .iter()
            .all(|b| b.kind == BlockKind::ListItem { ordered: false }));
        assert_eq!(blocks[4].kind, BlockKind::Quote);
    }

    #[test]
    fn test_tree_marks_become_spans() {
        let raw = r#"{"type":"doc","content":[{"type":"paragraph","attrs":{"textAlign":"right"},"content":[
            {"type":"text","text":"Plain "},
            {"type":"text","text":"loud","marks":[{"type":"bold"},{"type":"italic"}]},
            {"type":"hardBreak"},
            {"type":"text","text":"code","marks":[{"type":"code"}]}
        ]}]}"#;

        let blocks = blocks(raw);
        assert_eq!(blocks[0].text, "Plain loud\ncode");
        assert_eq!(blocks[0].alignment, Some(Alignment::Right));
        assert_eq!(
            blocks[0].spans,
            vec![
                Span::new(SpanKind::Bold, 6, 10),
                Span::new(SpanKind::Italic, 6, 10),
                Span::new(SpanKind::Code, 11, 15),
            ]
        );
    }

    #[test]
    fn test_tree_table() {
        let raw = r#"{"type":"doc","content":[{"type":"table","content":[
            {"type":"tableRow","content":[
                {"type":"tableHeader","content":[{"type":"paragraph","content":[{"type":"text","text":"H1"}]}]},
                {"type":"tableHeader","content":[{"type":"paragraph","content":[{"type":"text","text":"H2"}]}]}
            ]},
            {"type":"tableRow","content":[
                {"type":"tableCell","content":[{"type":"paragraph","content":[{"type":"text","text":"x"}]}]},
                {"type":"tableCell","content":[{"type":"paragraph","content":[{"type":"text","text":"y"}]}]}
            ]}
        ]}]}"#;

        let blocks = blocks(raw);
        assert_eq!(texts(&blocks), vec!["H1", "H2", "x", "y"]);
        assert_eq!(blocks[1].kind, BlockKind::TableHeader { table: 0, row: 0 });
        assert_eq!(blocks[2].kind, BlockKind::TableCell { table: 0, row: 1 });
    }

    #[test]
    fn test_adjacent_spans_merge() {
        let blocks = blocks("<p><b>ab</b><b>cd</b> ef</p>");
        assert_eq!(blocks[0].spans, vec![Span::new(SpanKind::Bold, 0, 4)]);
    }

    #[test]
    fn test_markup_inline_wrappers_around_blocks() {
        let blocks = self::blocks("<span><p>Hello world</p></span>");
        assert_eq!(texts(&blocks), vec!["Hello world"]);

        let blocks = self::blocks(r#"<font face="x"><p>Old editor</p><p>Two</p></font>"#);
        assert_eq!(texts(&blocks), vec!["Old editor", "Two"]);
        assert_eq!(blocks[1].index, 1);

        let blocks = self::blocks("<a href=\"#\"><h2>Linked heading</h2></a>");
        assert_eq!(blocks[0].kind, BlockKind::Heading { level: 2 });
    }

    #[test]
    fn test_markup_emphasis_wrapper_marks_whole_block() {
        let blocks = self::blocks("<b><p>Bold paragraph</p></b>");
        assert_eq!(texts(&blocks), vec!["Bold paragraph"]);
        assert_eq!(blocks[0].spans, vec![Span::new(SpanKind::Bold, 0, 14)]);
    }

    #[test]
    fn test_markup_center_is_aligned_container() {
        let blocks = self::blocks("<center><p>Centered</p></center>");
        assert_eq!(texts(&blocks), vec!["Centered"]);
        assert_eq!(blocks[0].alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_markup_loose_text_kept_only_inside_containers() {
        // Loose text directly in <body> belongs to no block
        let blocks = self::blocks("<p>a</p>tail text");
        assert_eq!(texts(&blocks), vec!["a"]);

        let blocks = self::blocks("<div><p>a</p>tail text</div>");
        assert_eq!(texts(&blocks), vec!["a", "tail text"]);

        let blocks = self::blocks("<span>Intro<p>Body</p></span>");
        assert_eq!(texts(&blocks), vec!["Body"]);

        let blocks = self::blocks("<div><span>Intro<p>Body</p></span></div>");
        assert_eq!(texts(&blocks), vec!["Intro", "Body"]);
    }

    #[test]
    fn test_tree_with_string_heading_level() {
        let raw = r#"{"type":"doc","content":[
            {"type":"heading","attrs":{"level":"2"},"content":[{"type":"text","text":"Title"}]},
            {"type":"heading","attrs":{"level":900},"content":[{"type":"text","text":"Deep"}]},
            {"type":"paragraph","content":[{"type":"text","text":"Body"}]}
        ]}"#;

        assert_eq!(classify(raw).format(), crate::decoder::ContentFormat::StructuredTree);
        let blocks = blocks(raw);
        assert_eq!(texts(&blocks), vec!["Title", "Deep", "Body"]);
        assert_eq!(blocks[0].kind, BlockKind::Heading { level: 2 });
        assert_eq!(blocks[1].kind, BlockKind::Heading { level: 1 });
    }
}
