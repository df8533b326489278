//! Lectern Core Library
//!
//! This crate is the content engine behind the Lectern reader. Stored chapter
//! content, whichever of the supported representations it arrives in, is
//! canonicalized into an indexed list of [`Block`]s. Everything downstream
//! (scroll-mode markup, page-flip pagination, narration highlighting) works on
//! those blocks and addresses them by index.

pub mod builder;
pub mod config;
pub mod decoder;
pub mod error;
pub mod highlight;
pub mod paginate;
pub mod render;
pub mod session;
pub mod source;
pub mod text;
pub mod types;

pub use config::ReaderConfig;
pub use decoder::ContentFormat;
pub use error::{ConfigError, LecternError, ParseError, Result, SourceError};
pub use highlight::{HighlightSynchronizer, HighlightUpdate, ScrollBehavior, ScrollRequest};
pub use paginate::{page_for_block, Paginator};
pub use render::{BlockId, RenderedChapter, Renderer};
pub use session::{ChapterLoader, ChapterSession, LoadOutcome};
pub use source::{ChapterSource, DirectorySource, MemorySource};
pub use types::{
    Alignment, Block, BlockKind, Chapter, HighlightCursor, NarrationEvent, Page, PageFragment,
    PlaybackState, Span, SpanKind, NO_CONTENT_MESSAGE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_pipeline() {
        let chapter = Chapter::from_raw("Hello world.\n\nSecond paragraph here.");
        assert_eq!(chapter.blocks.len(), 2);

        let rendered = chapter.render().with_highlight(HighlightCursor::new(1, 0, 1));
        assert_eq!(rendered.highlighted_text(), Some("Second"));

        let pages = chapter.paginate(&Paginator::new());
        assert_eq!(pages.len(), 1);
        assert_eq!(page_for_block(&pages, 1), Some(1));
    }
}
