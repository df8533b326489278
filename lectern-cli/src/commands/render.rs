//! Render command implementation

use super::{read_chapter, standalone_document};
use crate::ChapterArgs;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lectern_core::ReaderConfig;
use std::time::Duration;

/// Render a chapter to addressable markup
pub async fn render(
    args: &ChapterArgs,
    output: Option<&str>,
    standalone: bool,
    config: &ReaderConfig,
) -> Result<()> {
    let chapter = read_chapter(args).await?;

    if chapter.is_empty() {
        tracing::warn!("{} has no content", args.input);
    }

    let renderer = config.renderer();
    let body = renderer.render_html(&chapter.blocks);
    let html = if standalone {
        let title = chapter.id.as_deref().unwrap_or("Chapter");
        standalone_document(title, &body, &renderer.stylesheet())
    } else {
        body
    };

    let Some(output) = output else {
        print!("{}", html);
        return Ok(());
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Writing {}...", output));

    tokio::fs::write(output, &html)
        .await
        .with_context(|| format!("Failed to create output file: {}", output))?;

    pb.finish_with_message(format!(
        "Rendered {} blocks -> {}",
        chapter.blocks.len(),
        output
    ));

    Ok(())
}
