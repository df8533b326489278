//! Paginate command implementation

use super::read_chapter;
use crate::ChapterArgs;
use anyhow::Result;
use lectern_core::types::NO_CONTENT_MESSAGE;
use lectern_core::{ChapterSession, ReaderConfig};

/// Split a chapter into pages and print them
pub async fn paginate(
    args: &ChapterArgs,
    budget: Option<usize>,
    json: bool,
    mut config: ReaderConfig,
) -> Result<()> {
    if let Some(budget) = budget {
        config = config.with_word_budget(budget);
    }
    config.validate()?;

    let chapter = read_chapter(args).await?;
    let mut session = ChapterSession::new(config);
    session.load_chapter(chapter);

    let budget = session.config().page_word_budget;
    let pages = session.pages();
    tracing::info!(
        "Paginated {} into {} pages of at most {} words",
        args.input,
        pages.len(),
        budget
    );

    if json {
        println!("{}", serde_json::to_string_pretty(pages)?);
        return Ok(());
    }

    if pages.is_empty() {
        println!("{}", NO_CONTENT_MESSAGE);
        return Ok(());
    }

    let total = pages.len();
    for page in pages {
        println!(
            "<!-- page {} of {}, {} words -->",
            page.number, total, page.word_count
        );
        print!("{}", page.html);
    }

    Ok(())
}
