//! Page-flip pagination
//!
//! Blocks are packed greedily onto pages of at most `word_budget` words. A
//! block that fits on no page by itself is split at word boundaries into
//! chunks, each on its own page; every other block is kept whole.

use crate::render::{write_fragments, Fragment, DEFAULT_HIGHLIGHT_CLASS};
use crate::types::{Block, Page, PageFragment};
use std::ops::Range;

/// Default maximum words per page
pub const DEFAULT_WORD_BUDGET: usize = 250;

/// Splits blocks into pages under a word budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    word_budget: usize,
}

/// A block, or a word chunk of one, waiting to be placed
struct Piece {
    block: Block,
    words: Range<usize>,
    split: bool,
}

impl Paginator {
    pub fn new() -> Self {
        Self {
            word_budget: DEFAULT_WORD_BUDGET,
        }
    }

    /// Set the word budget; values below 1 are raised to 1
    pub fn with_word_budget(mut self, budget: usize) -> Self {
        self.word_budget = budget.max(1);
        self
    }

    pub fn word_budget(&self) -> usize {
        self.word_budget
    }

    /// Split `blocks` into pages
    pub fn paginate(&self, blocks: &[Block]) -> Vec<Page> {
        let budget = self.word_budget;
        let mut pages: Vec<Page> = Vec::new();
        let mut current: Vec<Piece> = Vec::new();
        let mut acc = 0;

        for block in blocks {
            let words = block.word_count();

            if words > budget {
                if !current.is_empty() {
                    pages.push(make_page(pages.len() + 1, std::mem::take(&mut current)));
                    acc = 0;
                }
                for chunk in split_block(block, budget) {
                    pages.push(make_page(pages.len() + 1, vec![chunk]));
                }
                continue;
            }

            if !current.is_empty() && acc + words > budget {
                pages.push(make_page(pages.len() + 1, std::mem::take(&mut current)));
                acc = 0;
            }

            current.push(Piece {
                block: block.clone(),
                words: 0..words,
                split: false,
            });
            acc += words;
        }

        if !current.is_empty() {
            pages.push(make_page(pages.len() + 1, current));
        }

        tracing::debug!(
            blocks = blocks.len(),
            pages = pages.len(),
            budget,
            "paginated chapter"
        );

        pages
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut an oversized block into chunks of at most `budget` words
fn split_block(block: &Block, budget: usize) -> Vec<Piece> {
    let ranges = block.word_ranges();
    let mut chunks = Vec::new();
    let mut first = 0;

    while first < ranges.len() {
        let last = (first + budget).min(ranges.len());
        let chars = ranges[first].start..ranges[last - 1].end;

        chunks.push(Piece {
            block: block.slice_chars(chars),
            words: first..last,
            split: true,
        });
        first = last;
    }

    chunks
}

fn make_page(number: usize, pieces: Vec<Piece>) -> Page {
    let fragments: Vec<Fragment> = pieces
        .iter()
        .map(|piece| Fragment {
            block: &piece.block,
            word_offset: piece.split.then_some(piece.words.start),
            highlight: None,
        })
        .collect();

    let mut html = String::new();
    write_fragments(&mut html, &fragments, DEFAULT_HIGHLIGHT_CLASS);

    Page {
        number,
        word_count: pieces.iter().map(|p| p.words.len()).sum(),
        fragments: pieces
            .iter()
            .map(|p| PageFragment {
                block_index: p.block.index,
                words: p.words.clone(),
            })
            .collect(),
        html,
    }
}

/// 1-based number of the first page holding `block_index`
pub fn page_for_block(pages: &[Page], block_index: usize) -> Option<usize> {
    pages
        .iter()
        .find(|page| page.contains_block(block_index))
        .map(|page| page.number)
}
