//! Chapter list and the active-chapter pointer.
//!
//! All content edits go through [`Manuscript`] and target the active chapter.

use crate::converter::ImportedDocument;
use crate::splice::{self, Spliced};
use crate::stats::{self, Statistics};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManuscriptError {
    #[error("No chapter is selected")]
    NoActiveChapter,

    #[error("Chapter not found: {0}")]
    ChapterNotFound(String),

    #[error("Chapter index {index} is out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ManuscriptError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    id: String,
    pub title: String,
    pub content: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Markdown export: title heading followed by the body.
    pub fn to_markdown(&self) -> String {
        let body = self.content.trim();
        if body.is_empty() {
            format!("# {}\n", self.title)
        } else {
            format!("# {}\n\n{}\n", self.title, body)
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Manuscript {
    chapters: Vec<Chapter>,
    active: Option<String>,
}

impl Manuscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from restored chapters; the first one becomes active.
    pub fn from_chapters(chapters: Vec<Chapter>) -> Self {
        let active = chapters.first().map(|c| c.id.clone());
        Self { chapters, active }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter(&self, id: &str) -> Result<&Chapter> {
        self.chapters
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ManuscriptError::ChapterNotFound(id.to_string()))
    }

    fn chapter_mut(&mut self, id: &str) -> Result<&mut Chapter> {
        self.chapters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ManuscriptError::ChapterNotFound(id.to_string()))
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.chapters
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ManuscriptError::ChapterNotFound(id.to_string()))
    }

    /// Append a chapter and make it active. `None` picks "Chapter N".
    pub fn new_chapter(&mut self, title: Option<&str>) -> &Chapter {
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Chapter {}", self.chapters.len() + 1),
        };

        let chapter = Chapter::new(title);
        log::debug!("created chapter {} ({})", chapter.title, chapter.id);
        self.active = Some(chapter.id.clone());
        self.chapters.push(chapter);
        &self.chapters[self.chapters.len() - 1]
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        self.position(id)?;
        self.active = Some(id.to_string());
        Ok(())
    }

    pub fn active(&self) -> Option<&Chapter> {
        let id = self.active.as_deref()?;
        self.chapters.iter().find(|c| c.id == id)
    }

    fn active_mut(&mut self) -> Result<&mut Chapter> {
        let id = self.active.clone().ok_or(ManuscriptError::NoActiveChapter)?;
        self.chapter_mut(&id)
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Result<()> {
        self.chapter_mut(id)?.title = title.trim().to_string();
        Ok(())
    }

    /// Remove a chapter. If it was active, the chapter that takes its place
    /// (or the new last one) becomes active.
    pub fn delete(&mut self, id: &str) -> Result<Chapter> {
        let index = self.position(id)?;
        let removed = self.chapters.remove(index);

        if self.active.as_deref() == Some(id) {
            self.active = self
                .chapters
                .get(index)
                .or_else(|| self.chapters.last())
                .map(|c| c.id.clone());
        }

        Ok(removed)
    }

    /// Move the chapter at `from` so it ends up at index `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.chapters.len();
        for index in [from, to] {
            if index >= len {
                return Err(ManuscriptError::IndexOutOfRange { index, len });
            }
        }

        let chapter = self.chapters.remove(from);
        self.chapters.insert(to, chapter);
        Ok(())
    }

    /// Replace the active chapter's text (live typing).
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.active_mut()?.content = content.into();
        Ok(())
    }

    /// Replace any chapter's text, e.g. with an accepted rewrite.
    pub fn replace_content(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        self.chapter_mut(id)?.content = content.into();
        Ok(())
    }

    /// Insert a finalized transcript fragment at `cursor` in the active chapter.
    pub fn insert_transcript(&mut self, fragment: &str, cursor: usize) -> Result<usize> {
        let chapter = self.active_mut()?;
        let Spliced { buffer, cursor } = splice::splice_spaced(&chapter.content, cursor, fragment);
        chapter.content = buffer;
        Ok(cursor)
    }

    /// Insert an imported document's content at `cursor` in the active chapter.
    pub fn import_at_cursor(&mut self, document: &ImportedDocument, cursor: usize) -> Result<usize> {
        let chapter = self.active_mut()?;
        let Spliced { buffer, cursor } =
            splice::splice_raw(&chapter.content, cursor, &document.content);
        chapter.content = buffer;
        Ok(cursor)
    }

    pub fn export_chapter(&self, id: &str) -> Result<String> {
        Ok(self.chapter(id)?.to_markdown())
    }

    pub fn statistics(&self, id: &str) -> Result<Statistics> {
        Ok(stats::calculate_statistics(&self.chapter(id)?.content))
    }

    /// Resolve a chapter by full id, unique id prefix, or 1-based position.
    pub fn resolve(&self, key: &str) -> Result<&Chapter> {
        if let Ok(chapter) = self.chapter(key) {
            return Ok(chapter);
        }

        if let Ok(n) = key.parse::<usize>() {
            if let Some(chapter) = n.checked_sub(1).and_then(|i| self.chapters.get(i)) {
                return Ok(chapter);
            }
        }

        let mut matches = self.chapters.iter().filter(|c| c.id.starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(chapter), None) if !key.is_empty() => Ok(chapter),
            _ => Err(ManuscriptError::ChapterNotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{import_document, ImportOptions, SourceFile};

    fn manuscript_with(titles: &[&str]) -> Manuscript {
        let mut m = Manuscript::new();
        for t in titles {
            m.new_chapter(Some(t));
        }
        m
    }

    #[test]
    fn new_chapter_becomes_active_with_default_title() {
        let mut m = Manuscript::new();
        let id = m.new_chapter(None).id().to_string();
        assert_eq!(m.active().unwrap().id(), id);
        assert_eq!(m.active().unwrap().title, "Chapter 1");

        m.new_chapter(Some("  "));
        assert_eq!(m.active().unwrap().title, "Chapter 2");
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let mut m = manuscript_with(&["a", "b"]);
        let ids: Vec<String> = m.chapters().iter().map(|c| c.id().to_string()).collect();
        assert_ne!(ids[0], ids[1]);

        m.rename(&ids[0], "renamed").unwrap();
        m.reorder(0, 1).unwrap();
        assert_eq!(m.chapters()[1].id(), ids[0]);
        assert_eq!(m.chapters()[1].title, "renamed");
    }

    #[test]
    fn content_edits_require_active_chapter() {
        let mut m = Manuscript::new();
        assert_eq!(m.set_content("x"), Err(ManuscriptError::NoActiveChapter));
        assert_eq!(
            m.insert_transcript("hi", 0),
            Err(ManuscriptError::NoActiveChapter)
        );
    }

    #[test]
    fn replace_content_targets_the_named_chapter() {
        let mut m = manuscript_with(&["one", "two"]);
        let first = m.chapters()[0].id().to_string();

        m.replace_content(&first, "rewritten").unwrap();
        assert_eq!(m.chapters()[0].content, "rewritten");
        assert_eq!(m.active().unwrap().title, "two");
        assert_eq!(m.active().unwrap().content, "");

        assert_eq!(
            m.replace_content("missing", "x"),
            Err(ManuscriptError::ChapterNotFound("missing".into()))
        );
    }

    #[test]
    fn dictation_goes_to_active_chapter_only() {
        let mut m = manuscript_with(&["one", "two"]);
        let first = m.chapters()[0].id().to_string();
        m.select(&first).unwrap();
        m.set_content("Hello").unwrap();

        let cursor = m.insert_transcript("world", 5).unwrap();
        assert_eq!(cursor, 11);
        assert_eq!(m.chapter(&first).unwrap().content, "Hello world");
        assert_eq!(m.chapters()[1].content, "");
    }

    #[test]
    fn import_splices_without_spacing() {
        let mut m = manuscript_with(&["one"]);
        m.set_content("AB").unwrap();

        let file = SourceFile::new("mid.txt", "xyz".as_bytes());
        let doc = import_document(&file, &ImportOptions::default())
            .into_result()
            .unwrap();
        let cursor = m.import_at_cursor(&doc, 1).unwrap();

        assert_eq!(m.active().unwrap().content, "AxyzB");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn deleting_active_moves_selection_to_neighbour() {
        let mut m = manuscript_with(&["a", "b", "c"]);
        let ids: Vec<String> = m.chapters().iter().map(|c| c.id().to_string()).collect();

        m.select(&ids[1]).unwrap();
        m.delete(&ids[1]).unwrap();
        assert_eq!(m.active().unwrap().id(), ids[2]);

        m.delete(&ids[2]).unwrap();
        assert_eq!(m.active().unwrap().id(), ids[0]);

        m.delete(&ids[0]).unwrap();
        assert!(m.active().is_none());
        assert!(m.is_empty());
    }

    #[test]
    fn deleting_inactive_keeps_selection() {
        let mut m = manuscript_with(&["a", "b"]);
        let ids: Vec<String> = m.chapters().iter().map(|c| c.id().to_string()).collect();
        m.delete(&ids[0]).unwrap();
        assert_eq!(m.active().unwrap().id(), ids[1]);
    }

    #[test]
    fn reorder_rejects_out_of_range() {
        let mut m = manuscript_with(&["a"]);
        assert_eq!(
            m.reorder(0, 3),
            Err(ManuscriptError::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn reorder_moves_forward_and_back() {
        let mut m = manuscript_with(&["a", "b", "c"]);
        m.reorder(0, 2).unwrap();
        let titles: Vec<&str> = m.chapters().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["b", "c", "a"]);

        m.reorder(2, 0).unwrap();
        let titles: Vec<&str> = m.chapters().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn export_prefixes_title_heading() {
        let mut m = manuscript_with(&["Opening"]);
        m.set_content("\nFirst line.\n\n").unwrap();
        let id = m.chapters()[0].id().to_string();
        assert_eq!(m.export_chapter(&id).unwrap(), "# Opening\n\nFirst line.\n");
    }

    #[test]
    fn resolve_by_position_and_prefix() {
        let m = manuscript_with(&["a", "b"]);
        let second = m.chapters()[1].id().to_string();

        assert_eq!(m.resolve("2").unwrap().id(), second);
        assert_eq!(m.resolve(&second[..8]).unwrap().id(), second);
        assert!(m.resolve("").is_err());
        assert!(m.resolve("9").is_err());
    }
}
