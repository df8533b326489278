//! Core types for the canonical chapter model

mod block;
mod chapter;
mod cursor;
mod page;

pub use block::{Alignment, Block, BlockKind, Span, SpanKind};
pub use chapter::{Chapter, NO_CONTENT_MESSAGE};
pub use cursor::{HighlightCursor, NarrationEvent, PlaybackState};
pub use page::{Page, PageFragment};
