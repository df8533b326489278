//! Markup sniffing and parsing

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

/// Closing tag of a block element the builder knows how to canonicalize
static CLOSING_BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</\s*(p|h[1-6]|ul|ol|li|table|tr|td|th|blockquote|div)\s*>").unwrap()
});

/// Whether `raw` should be treated as markup.
///
/// The trimmed text must open with a tag and close at least one block element.
pub fn looks_like_markup(raw: &str) -> bool {
    raw.trim_start().starts_with('<') && CLOSING_BLOCK_TAG.is_match(raw)
}

/// Parse markup into a document tree.
///
/// Fragments are parsed as documents so that they always end up under `body`.
pub(crate) fn parse_markup(raw: &str) -> Html {
    Html::parse_document(raw)
}
