//! Narration cursor and playback signal types

use serde::{Deserialize, Serialize};

/// Current narration position: words `word_start..word_end` of one block
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HighlightCursor {
    pub block_index: usize,
    pub word_start: usize,
    pub word_end: usize,
}

impl HighlightCursor {
    pub fn new(block_index: usize, word_start: usize, word_end: usize) -> Self {
        Self {
            block_index,
            word_start,
            word_end,
        }
    }

    /// Whether the word range is non-empty
    pub fn is_well_formed(&self) -> bool {
        self.word_start < self.word_end
    }
}

/// Events emitted by the narration engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NarrationEvent {
    Cursor(HighlightCursor),
    Play,
    Pause,
    Resume,
    Stop,
}

/// Playback state as seen by the highlighter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}
