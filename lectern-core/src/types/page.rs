//! Page type produced by the paginator

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One page of the page-flip reading mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// 1-based display page number
    pub number: usize,

    /// Total words on this page
    pub word_count: usize,

    /// Block pieces on this page, in document order
    pub fragments: Vec<PageFragment>,

    /// Rendered markup for the whole page
    pub html: String,
}

/// A whole block, or one chunk of an oversized block, placed on a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageFragment {
    /// Index of the source block
    pub block_index: usize,

    /// Word range of the source block covered by this fragment
    pub words: Range<usize>,
}

impl PageFragment {
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

impl Page {
    /// Whether any fragment of `block_index` lies on this page
    pub fn contains_block(&self, block_index: usize) -> bool {
        self.fragments.iter().any(|f| f.block_index == block_index)
    }

    /// Indices of the blocks on this page
    pub fn block_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.fragments.iter().map(|f| f.block_index)
    }
}
