//! Chapter persistence.
//!
//! The whole chapter list is stored as one JSON document under a fixed key.
//! Restoring never fails on bad data: a corrupt store is logged and skipped.

use crate::manuscript::Chapter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const STORAGE_KEY: &str = "ebook-writer-chapters";
const ACTIVE_KEY: &str = "ebook-writer-active-chapter";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access chapter store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize chapters: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct ChapterStore {
    path: PathBuf,
    active_path: PathBuf,
}

impl ChapterStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{STORAGE_KEY}.json")),
            active_path: data_dir.join(ACTIVE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved chapter list. Missing or unreadable data yields `None`.
    pub fn restore(&self) -> Option<Vec<Chapter>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Error restoring chapters from {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<Chapter>>(&data) {
            Ok(chapters) => {
                log::info!("Previous content restored ({} chapters)", chapters.len());
                Some(chapters)
            }
            Err(e) => {
                log::warn!("Ignoring corrupt chapter store {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, chapters: &[Chapter]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(chapters)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Write then rename so a crash never leaves a half-written store
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;

        log::debug!("saved {} chapters to {}", chapters.len(), self.path.display());
        Ok(())
    }

    /// Id of the chapter that was active when the store was last saved.
    pub fn restore_active(&self) -> Option<String> {
        std::fs::read_to_string(&self.active_path)
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    pub fn save_active(&self, id: Option<&str>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.active_path.clone(),
            source,
        };
        match id {
            Some(id) => {
                if let Some(parent) = self.active_path.parent() {
                    std::fs::create_dir_all(parent).map_err(io_err)?;
                }
                std::fs::write(&self.active_path, id).map_err(io_err)
            }
            None => match std::fs::remove_file(&self.active_path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_err(e)),
                _ => Ok(()),
            },
        }
    }
}

/// Debounce for saves: a save is due once no change has happened for `delay`.
#[derive(Debug, Clone)]
pub struct AutoSave {
    delay: Duration,
    last_change: Option<Instant>,
}

impl AutoSave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    /// Record a change; restarts the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.last_change.is_some()
    }

    pub fn due(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|changed| now.saturating_duration_since(changed) >= self.delay)
    }

    /// When the pending change becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_change.map(|changed| changed + self.delay)
    }

    pub fn saved(&mut self) {
        self.last_change = None;
    }

    /// Save if due. Empty chapter lists are never written.
    pub fn flush_if_due(
        &mut self,
        store: &ChapterStore,
        chapters: &[Chapter],
        now: Instant,
    ) -> Result<bool, StorageError> {
        if !self.due(now) {
            return Ok(false);
        }
        if chapters.is_empty() {
            self.saved();
            return Ok(false);
        }

        store.save(chapters)?;
        self.saved();
        Ok(true)
    }
}
