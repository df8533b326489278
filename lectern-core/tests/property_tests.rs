//! Property tests for canonicalization, rendering, pagination and highlighting

use lectern_core::types::{Block, Chapter, HighlightCursor};
use lectern_core::{ContentFormat, Paginator, Renderer};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use scraper::{Html, Selector};
use serde_json::{json, Value};

/// Paragraphs of words; words may contain characters that need escaping
fn paragraphs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec("[a-z&<>\"]{1,8}", 1..40).prop_map(|words| words.join(" ")),
        0..10,
    )
}

fn to_blocks(paragraphs: &[String]) -> Vec<Block> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(i, text)| Block::paragraph(i, text.clone()))
        .collect()
}

/// Inline markup, including pieces that leave a block empty
fn inline_markup() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}( [a-z]{1,6}){0,3}",
        Just(String::new()),
        Just("  \n ".to_string()),
        Just("<br>".to_string()),
        "[a-z]{1,6}".prop_map(|w| format!("<b>{}</b>", w)),
        "[a-z]{1,6}".prop_map(|w| format!("<em> {} </em>", w)),
    ]
}

/// Nested markup: containers, lists, tables, quotes and inline wrappers
fn markup_block() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        prop::collection::vec(inline_markup(), 0..4).prop_map(|c| format!("<p>{}</p>", c.concat())),
        (1u8..=6, inline_markup()).prop_map(|(level, c)| format!("<h{0}>{1}</h{0}>", level, c)),
        inline_markup(),
    ];

    leaf.prop_recursive(3, 32, 4, |inner| {
        let children = prop::collection::vec(inner, 0..4).prop_map(|c| c.concat());
        prop_oneof![
            children.clone().prop_map(|c| format!("<div>{}</div>", c)),
            children.clone().prop_map(|c| format!("<blockquote>{}</blockquote>", c)),
            children.clone().prop_map(|c| format!("<span>{}</span>", c)),
            children.clone().prop_map(|c| format!("<b>{}</b>", c)),
            prop::collection::vec(children.clone(), 0..4).prop_map(|items| {
                let items: String = items.iter().map(|i| format!("<li>{}</li>", i)).collect();
                format!("<ul>{}</ul>", items)
            }),
            prop::collection::vec(prop::collection::vec(children, 0..3), 0..3).prop_map(|rows| {
                let rows: String = rows
                    .iter()
                    .map(|cells| {
                        let cells: String =
                            cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
                        format!("<tr>{}</tr>", cells)
                    })
                    .collect();
                format!("<table>{}</table>", rows)
            }),
        ]
    })
}

fn markup_document() -> impl Strategy<Value = String> {
    prop::collection::vec(markup_block(), 0..6).prop_map(|blocks| blocks.concat())
}

/// Inline tree nodes, including blank text and bare hard breaks
fn tree_inline() -> impl Strategy<Value = Value> {
    prop_oneof![
        (
            "[a-z]{1,6}( [a-z]{1,6}){0,3}|[ ]{0,3}",
            prop::sample::subsequence(vec!["bold", "italic", "code", "link"], 0..3),
        )
            .prop_map(|(text, marks)| {
                let marks: Vec<Value> = marks.iter().map(|m| json!({ "type": m })).collect();
                json!({ "type": "text", "text": text, "marks": marks })
            }),
        Just(json!({ "type": "hardBreak" })),
    ]
}

fn tree_block() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        prop::collection::vec(tree_inline(), 0..4)
            .prop_map(|c| json!({ "type": "paragraph", "content": c })),
        (1u8..=6, prop::collection::vec(tree_inline(), 0..3)).prop_map(|(level, c)| {
            json!({ "type": "heading", "attrs": { "level": level }, "content": c })
        }),
    ];

    leaf.prop_recursive(3, 32, 4, |inner| {
        let children = prop::collection::vec(inner, 0..4);
        prop_oneof![
            (any::<bool>(), prop::collection::vec(children.clone(), 0..4)).prop_map(
                |(ordered, items)| {
                    let kind = if ordered { "orderedList" } else { "bulletList" };
                    let items: Vec<Value> = items
                        .into_iter()
                        .map(|c| json!({ "type": "listItem", "content": c }))
                        .collect();
                    json!({ "type": kind, "content": items })
                }
            ),
            children
                .clone()
                .prop_map(|c| json!({ "type": "blockquote", "content": c })),
            prop::collection::vec(prop::collection::vec(children.clone(), 0..3), 0..3).prop_map(
                |rows| {
                    let rows: Vec<Value> = rows
                        .into_iter()
                        .map(|cells| {
                            let cells: Vec<Value> = cells
                                .into_iter()
                                .map(|c| json!({ "type": "tableCell", "content": c }))
                                .collect();
                            json!({ "type": "tableRow", "content": cells })
                        })
                        .collect();
                    json!({ "type": "table", "content": rows })
                }
            ),
            children.prop_map(|c| json!({ "type": "callout", "content": c })),
        ]
    })
}

fn tree_document() -> impl Strategy<Value = String> {
    prop::collection::vec(tree_block(), 0..6)
        .prop_map(|c| json!({ "type": "doc", "content": c }).to_string())
}

/// Indices run 0..n-1, no block is blank and every span lies inside its text
fn check_canonical(blocks: &[Block]) -> Result<(), TestCaseError> {
    for (i, block) in blocks.iter().enumerate() {
        prop_assert_eq!(block.index, i);
        prop_assert!(!block.text.trim().is_empty());
        prop_assert_eq!(block.text.trim(), block.text.as_str());

        let len = block.text.chars().count();
        for span in &block.spans {
            prop_assert!(span.start < span.end && span.end <= len);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_markup_indices_are_dense(raw in markup_document()) {
        check_canonical(&Chapter::from_raw(&raw).blocks)?;
    }

    #[test]
    fn prop_tree_indices_are_dense(raw in tree_document()) {
        let chapter = Chapter::from_raw(&raw);
        prop_assert_eq!(chapter.format, ContentFormat::StructuredTree);
        check_canonical(&chapter.blocks)?;
    }

    #[test]
    fn prop_any_input_is_canonical(raw in "(?s).{0,200}") {
        check_canonical(&Chapter::from_raw(&raw).blocks)?;
    }

    #[test]
    fn prop_plain_text_indices_are_dense(paragraphs in paragraphs()) {
        let chapter = Chapter::from_raw(&paragraphs.join("\n\n"));

        prop_assert_eq!(chapter.blocks.len(), paragraphs.len());
        for (i, block) in chapter.blocks.iter().enumerate() {
            prop_assert_eq!(block.index, i);
            prop_assert_eq!(&block.text, &paragraphs[i]);
        }
    }

    #[test]
    fn prop_rendered_elements_match_blocks(paragraphs in paragraphs()) {
        let blocks = to_blocks(&paragraphs);
        let html = Renderer::new().render_html(&blocks);

        let document = Html::parse_fragment(&html);
        let selector = Selector::parse("[data-paragraph-index]").unwrap();
        let elements: Vec<_> = document.select(&selector).collect();

        prop_assert_eq!(elements.len(), blocks.len());
        for (element, block) in elements.iter().zip(&blocks) {
            let index = block.index.to_string();
            let id = format!("para-{}", block.index);
            prop_assert_eq!(element.value().attr("data-paragraph-index"), Some(index.as_str()));
            prop_assert_eq!(element.value().attr("id"), Some(id.as_str()));
            prop_assert_eq!(element.text().collect::<String>(), block.text.replace('\n', ""));
        }
    }

    #[test]
    fn prop_rendered_markup_reparses_to_same_blocks(paragraphs in paragraphs()) {
        let blocks = to_blocks(&paragraphs);
        prop_assume!(!blocks.is_empty());

        let html = Renderer::new().render_html(&blocks);
        let reparsed = Chapter::from_raw(&html);
        prop_assert_eq!(reparsed.blocks, blocks);
    }

    #[test]
    fn prop_pagination_is_lossless_and_bounded(
        paragraphs in paragraphs(),
        budget in 1usize..20,
    ) {
        let blocks = to_blocks(&paragraphs);
        let pages = Paginator::new().with_word_budget(budget).paginate(&blocks);

        let mut covered = vec![0usize; blocks.len()];
        let mut last_block = 0;
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.number, i + 1);
            prop_assert!(page.word_count <= budget);
            prop_assert!(!page.fragments.is_empty());

            for fragment in &page.fragments {
                prop_assert!(fragment.block_index >= last_block);
                last_block = fragment.block_index;
                prop_assert_eq!(fragment.words.start, covered[fragment.block_index]);
                covered[fragment.block_index] = fragment.words.end;
            }
        }

        for block in &blocks {
            prop_assert_eq!(covered[block.index], block.word_count());

            let pieces = pages
                .iter()
                .flat_map(|p| &p.fragments)
                .filter(|f| f.block_index == block.index)
                .count();
            if block.word_count() <= budget {
                prop_assert_eq!(pieces, 1);
            }
        }
    }

    #[test]
    fn prop_pagination_is_deterministic(paragraphs in paragraphs(), budget in 1usize..50) {
        let blocks = to_blocks(&paragraphs);
        let paginator = Paginator::new().with_word_budget(budget);
        prop_assert_eq!(paginator.paginate(&blocks), paginator.paginate(&blocks));
    }

    #[test]
    fn prop_highlight_is_idempotent_and_exclusive(
        paragraphs in paragraphs(),
        cursors in prop::collection::vec((0usize..12, 0usize..45, 0usize..50), 1..6),
    ) {
        let rendered = Renderer::new().render(&to_blocks(&paragraphs));

        let mut current = rendered.clone();
        for (block_index, word_start, word_end) in cursors {
            let cursor = HighlightCursor::new(block_index, word_start, word_end);
            let once = current.with_highlight(cursor);
            let twice = once.with_highlight(cursor);

            prop_assert_eq!(&once, &twice);
            prop_assert!(once.html().matches("<mark").count() <= 1);

            if let Some(text) = once.highlighted_text() {
                let words = rendered.blocks()[block_index].word_count();
                prop_assert_eq!(
                    text.split_whitespace().count(),
                    word_end.min(words) - word_start
                );
            }

            current = once;
        }
    }
}
