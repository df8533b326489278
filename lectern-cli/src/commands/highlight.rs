//! Highlight command implementation

use super::read_chapter;
use crate::ChapterArgs;
use anyhow::{Context, Result};
use lectern_core::{ChapterSession, HighlightCursor, NarrationEvent, ReaderConfig};

/// Highlight words `start..end` of one block and print the result
pub async fn highlight(
    args: &ChapterArgs,
    block: usize,
    start: usize,
    end: usize,
    full: bool,
    config: ReaderConfig,
) -> Result<()> {
    let chapter = read_chapter(args).await?;
    let mut session = ChapterSession::new(config);
    session.load_chapter(chapter);

    let cursor = HighlightCursor::new(block, start, end);
    let update = session.handle_narration(NarrationEvent::Cursor(cursor));
    if let Some(scroll) = &update.scroll {
        tracing::debug!("Scroll to {} ({:?})", scroll.element_id, scroll.behavior);
    }

    let rendered = session.rendered().context("No chapter loaded")?;

    match rendered.highlighted_text() {
        Some(text) => tracing::info!("Highlighted \"{}\"", text),
        None => tracing::warn!(
            "Words {}..{} of block {} do not resolve to any text",
            start,
            end,
            block
        ),
    }

    if full {
        print!("{}", rendered.html());
    } else {
        let element = rendered
            .element_html(block)
            .with_context(|| format!("Block {} not found in {}", block, args.input))?;
        print!("{}", element);
    }

    Ok(())
}
