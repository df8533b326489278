//! Chapter content sources
//!
//! A [`ChapterSource`] hands out the stored content of a chapter by id. The
//! engine does not care where it lives; the session asks for it and
//! canonicalizes whatever comes back.

use crate::error::SourceError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

/// Result type for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// File extensions probed by [`DirectorySource`], in order
pub const CHAPTER_EXTENSIONS: [&str; 4] = ["json", "html", "htm", "txt"];

/// Provider of stored chapter content
#[async_trait]
pub trait ChapterSource: Send + Sync {
    /// Raw stored content of the chapter
    async fn chapter_content(&self, chapter_id: &str) -> SourceResult<String>;

    /// Ids of the chapters this source can provide
    async fn chapter_ids(&self) -> SourceResult<Vec<String>>;
}

/// Chapters stored as files in one directory, named `{id}.{ext}`
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Candidate file paths for a chapter id, rejecting ids that would leave
    /// the root
    fn chapter_paths(&self, chapter_id: &str) -> SourceResult<Vec<PathBuf>> {
        let mut components = Path::new(chapter_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(CHAPTER_EXTENSIONS
                .iter()
                .map(|ext| self.root.join(format!("{}.{}", chapter_id, ext)))
                .collect()),
            _ => Err(SourceError::InvalidChapterId(chapter_id.to_string())),
        }
    }
}

#[async_trait]
impl ChapterSource for DirectorySource {
    async fn chapter_content(&self, chapter_id: &str) -> SourceResult<String> {
        for path in self.chapter_paths(chapter_id)? {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    tracing::debug!("read chapter {} from {}", chapter_id, path.display());
                    return Ok(content);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(SourceError::Backend(e.to_string())),
            }
        }

        Err(SourceError::NotFound(chapter_id.to_string()))
    }

    async fn chapter_ids(&self) -> SourceResult<Vec<String>> {
        let mut read_dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| SourceError::NotFound(e.to_string()))?;

        let mut ids = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| SourceError::Backend(e.to_string()))?
        {
            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| CHAPTER_EXTENSIONS.contains(&e.to_lowercase().as_str()));
            if !supported {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

/// In-memory chapter source (for testing)
#[derive(Default)]
pub struct MemorySource {
    chapters: RwLock<HashMap<String, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store content for a chapter, replacing any previous content
    pub fn insert(&self, chapter_id: impl Into<String>, content: impl Into<String>) {
        if let Ok(mut chapters) = self.chapters.write() {
            chapters.insert(chapter_id.into(), content.into());
        }
    }
}

#[async_trait]
impl ChapterSource for MemorySource {
    async fn chapter_content(&self, chapter_id: &str) -> SourceResult<String> {
        self.chapters
            .read()
            .map_err(|e| SourceError::Backend(e.to_string()))?
            .get(chapter_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(chapter_id.to_string()))
    }

    async fn chapter_ids(&self) -> SourceResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .chapters
            .read()
            .map_err(|e| SourceError::Backend(e.to_string()))?
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new();
        source.insert("ch-2", "Second");
        source.insert("ch-1", "First");

        assert_eq!(source.chapter_content("ch-1").await.unwrap(), "First");
        assert_eq!(source.chapter_ids().await.unwrap(), vec!["ch-1", "ch-2"]);
        assert!(matches!(
            source.chapter_content("ch-3").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("intro.html"), "<p>Hi</p>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Plain").unwrap();
        std::fs::write(dir.path().join("cover.png"), [0u8; 4]).unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.chapter_content("intro").await.unwrap(), "<p>Hi</p>");
        assert_eq!(source.chapter_content("notes").await.unwrap(), "Plain");
        assert_eq!(source.chapter_ids().await.unwrap(), vec!["intro", "notes"]);
        assert!(matches!(
            source.chapter_content("cover").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_source_rejects_traversal() {
        let source = DirectorySource::new("/tmp/chapters");
        for id in ["../secret", "/etc/passwd", "a/b", ""] {
            assert!(
                matches!(
                    source.chapter_content(id).await,
                    Err(SourceError::InvalidChapterId(_))
                ),
                "{id} should be rejected"
            );
        }
    }
}
