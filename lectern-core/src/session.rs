//! Chapter session: load, render, paginate and follow narration
//!
//! Loads are stamped with a generation number when they start. Starting a
//! newer load, or unloading, makes every older in-flight result stale; stale
//! results are dropped instead of applied, so the displayed chapter is always
//! the most recently requested one.

use crate::config::ReaderConfig;
use crate::error::Result;
use crate::highlight::{HighlightSynchronizer, HighlightUpdate};
use crate::render::{activated_paragraph, RenderedChapter};
use crate::source::ChapterSource;
use crate::types::{Chapter, NarrationEvent, Page};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Issues generation-stamped loads; clones share one counter
#[derive(Debug, Clone, Default)]
pub struct ChapterLoader {
    generation: Arc<AtomicU64>,
}

/// Generation stamp of one load
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer load has started since this one
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

/// A canonicalized chapter waiting to be applied
#[derive(Debug)]
pub struct Loaded {
    pub ticket: LoadTicket,
    pub chapter: Chapter,
}

/// What happened to a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The chapter is now displayed
    Applied { blocks: usize },

    /// A newer load started first; the result was discarded
    Superseded,
}

impl ChapterLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, making all earlier ones stale
    pub fn begin(&self) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            generation,
            counter: Arc::clone(&self.generation),
        }
    }

    /// Make every in-flight load stale without starting a new one
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Canonicalize `raw` on the blocking pool.
    ///
    /// The ticket is taken when this is called, not when the future is first
    /// polled, so call order decides which load is newest.
    pub fn load(&self, raw: impl Into<String>) -> impl Future<Output = Result<Loaded>> + Send {
        let ticket = self.begin();
        let raw = raw.into();
        async move { canonicalize(ticket, raw, None).await }
    }
}

async fn canonicalize(ticket: LoadTicket, raw: String, id: Option<String>) -> Result<Loaded> {
    let chapter = tokio::task::spawn_blocking(move || {
        let chapter = Chapter::from_raw(&raw);
        match id {
            Some(id) => chapter.with_id(id),
            None => chapter,
        }
    })
    .await?;

    Ok(Loaded { ticket, chapter })
}

/// Display state for one reader surface
#[derive(Debug)]
pub struct ChapterSession {
    config: ReaderConfig,
    loader: ChapterLoader,
    chapter: Option<Chapter>,
    sync: Option<HighlightSynchronizer>,
    pages: Option<Vec<Page>>,
}

impl ChapterSession {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            loader: ChapterLoader::new(),
            chapter: None,
            sync: None,
            pages: None,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Handle for starting loads outside the session
    pub fn loader(&self) -> ChapterLoader {
        self.loader.clone()
    }

    /// Apply a finished load unless a newer one has started
    pub fn apply(&mut self, loaded: Loaded) -> LoadOutcome {
        if !loaded.ticket.is_current() {
            tracing::debug!(
                generation = loaded.ticket.generation(),
                "discarding superseded chapter load"
            );
            return LoadOutcome::Superseded;
        }

        let chapter = loaded.chapter;
        let blocks = chapter.blocks.len();
        if chapter.is_empty() {
            tracing::debug!("chapter has no content");
        }

        let rendered = self.config.renderer().render(&chapter.blocks);
        self.sync = Some(
            HighlightSynchronizer::new(rendered).with_scroll_behavior(self.config.scroll_behavior),
        );
        self.chapter = Some(chapter);
        self.pages = None;

        LoadOutcome::Applied { blocks }
    }

    /// Load raw content, canonicalizing off the async runtime
    pub async fn load(&mut self, raw: impl Into<String>) -> Result<LoadOutcome> {
        let loaded = self.loader.load(raw).await?;
        Ok(self.apply(loaded))
    }

    /// Fetch a chapter from `source` and load it
    pub async fn load_from<S>(&mut self, source: &S, chapter_id: &str) -> Result<LoadOutcome>
    where
        S: ChapterSource + ?Sized,
    {
        let ticket = self.loader.begin();
        let raw = source.chapter_content(chapter_id).await?;
        let loaded = canonicalize(ticket, raw, Some(chapter_id.to_string())).await?;
        Ok(self.apply(loaded))
    }

    /// Load raw content on the current thread
    pub fn load_now(&mut self, raw: &str) -> LoadOutcome {
        self.load_chapter(Chapter::from_raw(raw))
    }

    /// Display an already canonicalized chapter
    pub fn load_chapter(&mut self, chapter: Chapter) -> LoadOutcome {
        let ticket = self.loader.begin();
        self.apply(Loaded { ticket, chapter })
    }

    /// Drop the displayed chapter and any in-flight loads
    pub fn unload(&mut self) {
        self.loader.invalidate();
        self.chapter = None;
        self.sync = None;
        self.pages = None;
    }

    pub fn chapter(&self) -> Option<&Chapter> {
        self.chapter.as_ref()
    }

    pub fn rendered(&self) -> Option<&RenderedChapter> {
        self.sync.as_ref().map(HighlightSynchronizer::rendered)
    }

    /// Pages of the current chapter, built on first use
    pub fn pages(&mut self) -> &[Page] {
        if self.pages.is_none() {
            let pages = match &self.chapter {
                Some(chapter) => chapter.paginate(&self.config.paginator()),
                None => Vec::new(),
            };
            self.pages = Some(pages);
        }
        self.pages.as_deref().unwrap_or_default()
    }

    /// Change the page word budget; pages are rebuilt on next use
    pub fn set_word_budget(&mut self, budget: usize) {
        if budget != self.config.page_word_budget {
            self.config.page_word_budget = budget;
            self.pages = None;
        }
    }

    /// Feed a narration event to the highlighter
    pub fn handle_narration(&mut self, event: NarrationEvent) -> HighlightUpdate {
        match &mut self.sync {
            Some(sync) => sync.handle_event(event),
            None => HighlightUpdate::default(),
        }
    }

    /// Block index reported by an activated element, if it exists in the
    /// current chapter
    pub fn activate(&self, element_markup: &str) -> Option<usize> {
        let index = activated_paragraph(element_markup)?;
        self.chapter
            .as_ref()
            .and_then(|chapter| chapter.block(index))
            .map(|block| block.index)
    }
}

impl Default for ChapterSession {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::types::HighlightCursor;

    #[tokio::test]
    async fn test_load_applies_chapter() {
        let mut session = ChapterSession::default();
        let outcome = session
            .load("Hello world.\n\nSecond paragraph here.")
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Applied { blocks: 2 });
        assert_eq!(session.chapter().unwrap().blocks.len(), 2);
        assert_eq!(session.rendered().unwrap().element_id(1), Some("para-1"));
    }

    #[tokio::test]
    async fn test_older_load_is_superseded() {
        let mut session = ChapterSession::default();
        let loader = session.loader();

        let first = loader.load("<p>Old chapter</p>");
        let second = loader.load("<p>New</p><p>chapter</p>");

        let second = second.await.unwrap();
        let first = first.await.unwrap();

        assert_eq!(session.apply(second), LoadOutcome::Applied { blocks: 2 });
        assert_eq!(session.apply(first), LoadOutcome::Superseded);
        assert_eq!(session.chapter().unwrap().blocks[0].text, "New");
    }

    #[tokio::test]
    async fn test_unload_discards_in_flight_load() {
        let mut session = ChapterSession::default();
        let pending = session.loader().load("Some text");
        session.unload();

        let loaded = pending.await.unwrap();
        assert_eq!(session.apply(loaded), LoadOutcome::Superseded);
        assert!(session.chapter().is_none());
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = MemorySource::new();
        source.insert(
            "ch-1",
            r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"Tree"}]}]}"#,
        );

        let mut session = ChapterSession::default();
        let outcome = session.load_from(&source, "ch-1").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied { blocks: 1 });
        assert_eq!(session.chapter().unwrap().id.as_deref(), Some("ch-1"));

        assert!(session.load_from(&source, "missing").await.is_err());
        assert_eq!(session.chapter().unwrap().id.as_deref(), Some("ch-1"));
    }

    #[test]
    fn test_pages_rebuilt_on_budget_change() {
        let mut session = ChapterSession::new(ReaderConfig::default().with_word_budget(3));
        session.load_now("one two three four five\n\nsix seven");
        assert_eq!(session.pages().len(), 3);

        session.set_word_budget(10);
        assert_eq!(session.pages().len(), 1);
    }

    #[test]
    fn test_narration_and_activation() {
        let mut session = ChapterSession::default();
        assert!(session
            .handle_narration(NarrationEvent::Cursor(HighlightCursor::new(0, 0, 1)))
            .is_empty());

        session.load_now("The quick brown fox");
        let update =
            session.handle_narration(NarrationEvent::Cursor(HighlightCursor::new(0, 1, 3)));
        assert_eq!(update.changed, vec![0]);
        assert_eq!(
            session.rendered().unwrap().highlighted_text(),
            Some("quick brown")
        );

        assert_eq!(
            session.activate(r#"<p id="para-0" data-paragraph-index="0">x</p>"#),
            Some(0)
        );
        assert_eq!(session.activate(r#"<p data-paragraph-index="4">x</p>"#), None);
    }

    #[test]
    fn test_empty_chapter() {
        let mut session = ChapterSession::default();
        assert_eq!(session.load_now("   "), LoadOutcome::Applied { blocks: 0 });
        assert!(session.chapter().unwrap().is_empty());
        assert!(session.pages().is_empty());
    }
}
