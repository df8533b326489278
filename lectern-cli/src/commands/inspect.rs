//! Inspect command implementation

use super::read_chapter;
use crate::ChapterArgs;
use anyhow::Result;
use lectern_core::types::NO_CONTENT_MESSAGE;
use lectern_core::{ContentFormat, ReaderConfig};
use serde::Serialize;

/// Longest block preview, in characters
const PREVIEW_CHARS: usize = 60;

/// Chapter info output
#[derive(Serialize)]
struct ChapterInfo {
    id: Option<String>,
    format: ContentFormat,
    blocks: usize,
    words: usize,
    pages: usize,
    block_list: Vec<BlockInfo>,
}

#[derive(Serialize)]
struct BlockInfo {
    index: usize,
    id: String,
    kind: String,
    words: usize,
    preview: String,
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

/// Display the detected format and canonical blocks of a chapter
pub async fn inspect(args: &ChapterArgs, json: bool, config: &ReaderConfig) -> Result<()> {
    let chapter = read_chapter(args).await?;
    let rendered = config.renderer().render(&chapter.blocks);

    let info = ChapterInfo {
        id: chapter.id.clone(),
        format: chapter.format,
        blocks: chapter.blocks.len(),
        words: chapter.word_count(),
        pages: chapter.paginate(&config.paginator()).len(),
        block_list: chapter
            .blocks
            .iter()
            .map(|block| BlockInfo {
                index: block.index,
                id: rendered
                    .element_id(block.index)
                    .unwrap_or_default()
                    .to_string(),
                kind: block.kind.name(),
                words: block.word_count(),
                preview: preview(&block.text),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    if let Some(id) = &info.id {
        println!("Chapter:     {}", id);
    }
    println!("Format:      {:?}", info.format);
    println!("Blocks:      {}", info.blocks);
    println!("Words:       {}", info.words);
    println!("Pages:       {}", info.pages);

    if info.block_list.is_empty() {
        println!("\n{}", NO_CONTENT_MESSAGE);
        return Ok(());
    }

    println!();
    for block in &info.block_list {
        println!(
            "{:>8}  {:<14} {:>4}w  {}",
            block.id, block.kind, block.words, block.preview
        );
    }

    Ok(())
}
