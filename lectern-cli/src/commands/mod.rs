//! CLI command implementations

mod batch;
mod highlight;
mod inspect;
mod paginate;
mod render;

pub use batch::batch;
pub use highlight::highlight;
pub use inspect::inspect;
pub use paginate::paginate;
pub use render::render;

use crate::ChapterArgs;
use anyhow::{Context, Result};
use lectern_core::render::escape_html;
use lectern_core::types::{Chapter, NO_CONTENT_MESSAGE};
use lectern_core::{ChapterLoader, ContentFormat};
use std::path::Path;

/// Read and canonicalize the chapter named by `args`
async fn read_chapter(args: &ChapterArgs) -> Result<Chapter> {
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to open input file: {}", args.input))?;

    let chapter = match &args.format {
        Some(name) => {
            let format = ContentFormat::from_name(name)
                .with_context(|| format!("Unknown content format: {}", name))?;
            Chapter::from_raw_as(&raw, format)
                .with_context(|| format!("Failed to parse {} as {:?}", args.input, format))?
        }
        None => ChapterLoader::new().load(raw).await?.chapter,
    };

    let id = Path::new(&args.input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&args.input)
        .to_string();

    tracing::debug!(
        "Loaded {} as {:?} with {} blocks",
        args.input,
        chapter.format,
        chapter.blocks.len()
    );

    Ok(chapter.with_id(id))
}

/// Wrap chapter markup in a complete document carrying the reader stylesheet
fn standalone_document(title: &str, body: &str, stylesheet: &str) -> String {
    let body = if body.is_empty() {
        format!("<p class=\"no-content\">{}</p>\n", NO_CONTENT_MESSAGE)
    } else {
        body.to_string()
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        stylesheet,
        body
    )
}
