//! Plain text paragraph splitting

use regex::Regex;
use std::sync::LazyLock;

/// A line break followed by one or more blank (whitespace-only) lines
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*").unwrap());

/// Split plain text into paragraph strings on runs of blank lines.
///
/// Single newlines stay inside their paragraph as soft line breaks. Windows
/// line endings are normalized first.
pub fn split_paragraphs(raw: &str) -> Vec<String> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    BLANK_LINES
        .split(&normalized)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
