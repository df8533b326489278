//! Narration highlighting
//!
//! A cursor names a word range of one block. Resolving it against the block
//! text gives the character range to mark; applying it to a rendered chapter
//! gives a new chapter in which that range is the only highlight.
//!
//! [`HighlightSynchronizer`] follows a stream of narration events and reports
//! which elements need repainting and when the view should scroll.

use crate::render::RenderedChapter;
use crate::types::{Block, HighlightCursor, NarrationEvent, PlaybackState};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A cursor resolved against its block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHighlight {
    pub cursor: HighlightCursor,

    /// Character range of the block text covered by the highlight
    pub chars: Range<usize>,
}

/// Resolve `cursor` to a character range of `block`.
///
/// An end past the last word is clamped; an empty range or a start past the
/// last word resolves to nothing.
pub fn resolve(block: &Block, cursor: HighlightCursor) -> Option<ActiveHighlight> {
    if !cursor.is_well_formed() || cursor.block_index != block.index {
        return None;
    }

    let words = block.word_ranges();
    if cursor.word_start >= words.len() {
        return None;
    }
    let last = cursor.word_end.min(words.len()) - 1;

    Some(ActiveHighlight {
        cursor,
        chars: words[cursor.word_start].start..words[last].end,
    })
}

/// Highlight `cursor` in `chapter`, clearing any previous highlight
pub fn apply_highlight(chapter: &RenderedChapter, cursor: HighlightCursor) -> RenderedChapter {
    chapter.with_highlight(cursor)
}

/// How the view scrolls to the highlighted element
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Auto,
}

/// Ask the host to bring an element into view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrollRequest {
    pub element_id: String,
    pub behavior: ScrollBehavior,
}

/// Result of feeding one event to the synchronizer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighlightUpdate {
    /// Blocks whose markup changed and must be repainted
    pub changed: Vec<usize>,

    pub scroll: Option<ScrollRequest>,
}

impl HighlightUpdate {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.scroll.is_none()
    }
}

/// Keeps a rendered chapter in step with narration
#[derive(Debug, Clone)]
pub struct HighlightSynchronizer {
    rendered: RenderedChapter,
    last_scrolled: Option<usize>,
    playback: PlaybackState,
    scroll_behavior: ScrollBehavior,
}

impl HighlightSynchronizer {
    pub fn new(rendered: RenderedChapter) -> Self {
        Self {
            rendered,
            last_scrolled: None,
            playback: PlaybackState::Stopped,
            scroll_behavior: ScrollBehavior::default(),
        }
    }

    pub fn with_scroll_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = behavior;
        self
    }

    pub fn rendered(&self) -> &RenderedChapter {
        &self.rendered
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback
    }

    /// Swap in a newly rendered chapter; highlight and scroll state reset
    pub fn replace_rendered(&mut self, rendered: RenderedChapter) {
        self.rendered = rendered;
        self.last_scrolled = None;
    }

    /// Move the highlight to `cursor`
    pub fn apply(&mut self, cursor: HighlightCursor) -> HighlightUpdate {
        let previous = self.rendered.highlight().map(|h| h.cursor.block_index);
        let next = self.rendered.with_highlight(cursor);

        if next.highlight() == self.rendered.highlight() {
            return HighlightUpdate::default();
        }

        let current = next.highlight().map(|h| h.cursor.block_index);
        self.rendered = next;

        let mut changed: Vec<usize> = previous.into_iter().chain(current).collect();
        changed.dedup();

        let scroll = match current {
            Some(index) if self.last_scrolled != Some(index) => {
                self.last_scrolled = Some(index);
                self.rendered.element_id(index).map(|id| ScrollRequest {
                    element_id: id.to_string(),
                    behavior: self.scroll_behavior,
                })
            }
            _ => None,
        };

        HighlightUpdate { changed, scroll }
    }

    /// Remove the highlight
    pub fn clear(&mut self) -> HighlightUpdate {
        match self.rendered.highlight().map(|h| h.cursor.block_index) {
            Some(index) => {
                self.rendered = self.rendered.without_highlight();
                HighlightUpdate {
                    changed: vec![index],
                    scroll: None,
                }
            }
            None => HighlightUpdate::default(),
        }
    }

    /// Feed one narration event
    pub fn handle_event(&mut self, event: NarrationEvent) -> HighlightUpdate {
        tracing::trace!("narration event {:?}", event);

        match event {
            NarrationEvent::Cursor(cursor) => {
                self.playback = PlaybackState::Playing;
                self.apply(cursor)
            }
            NarrationEvent::Play => {
                self.playback = PlaybackState::Playing;
                self.last_scrolled = None;
                HighlightUpdate::default()
            }
            NarrationEvent::Pause => {
                self.playback = PlaybackState::Paused;
                HighlightUpdate::default()
            }
            NarrationEvent::Resume => {
                self.playback = PlaybackState::Playing;
                HighlightUpdate::default()
            }
            NarrationEvent::Stop => {
                self.playback = PlaybackState::Stopped;
                self.last_scrolled = None;
                self.clear()
            }
        }
    }
}
