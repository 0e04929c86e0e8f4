//! One JSON document per place/language pair.
//!
//! ## Summary
//! A pair's collection lives at `{data_dir}/{place}.{language}.json` as a
//! pretty-printed array of event records. Loading never fails: a missing,
//! empty or unreadable document yields an empty collection so a pass can
//! rebuild state from the next batch. Saving renders the whole document
//! first, then replaces the previous file with a single rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use weekslot_core::constants::{DATA_FILE_EXTENSION, DEFAULT_RETENTION_MONTHS};
use weekslot_core::types::PlaceTarget;
use weekslot_schedule::EventCollection;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct EventStore {
    data_dir: PathBuf,
    retention_months: u32,
}

impl EventStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            retention_months: DEFAULT_RETENTION_MONTHS,
        }
    }

    /// Retention applied to every collection this store loads.
    #[must_use]
    pub fn with_retention_months(mut self, months: u32) -> Self {
        self.retention_months = months;
        self
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn path_for(&self, target: &PlaceTarget) -> PathBuf {
        self.data_dir
            .join(format!("{}.{DATA_FILE_EXTENSION}", target.file_stem()))
    }

    /// ## Summary
    /// Loads the persisted collection for `target`.
    ///
    /// Returns an empty collection when there is nothing usable on disk.
    #[must_use]
    pub fn load(&self, target: &PlaceTarget) -> EventCollection {
        let path = self.path_for(target);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No persisted state, starting empty");
                return self.empty();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable state, starting empty");
                return self.empty();
            }
        };

        if text.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Empty state file, starting empty");
            return self.empty();
        }

        match EventCollection::from_json(&text) {
            Ok(collection) => {
                tracing::debug!(path = %path.display(), events = collection.len(), "Loaded state");
                collection.with_retention_months(self.retention_months)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Malformed state, starting empty");
                self.empty()
            }
        }
    }

    /// ## Summary
    /// Persists `collection` for `target`, replacing any previous document.
    ///
    /// ## Errors
    /// Returns an error if the collection cannot be rendered, the data
    /// directory cannot be created, or the document cannot be written and
    /// moved into place. The previous document is left intact on failure.
    pub fn save(&self, target: &PlaceTarget, collection: &EventCollection) -> StoreResult<PathBuf> {
        let path = self.path_for(target);
        let contents = collection.to_json_pretty()?;

        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))?;

        let mut staged =
            NamedTempFile::new_in(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))?;
        staged
            .write_all(contents.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(|e| StoreError::io(staged.path(), e))?;
        staged.persist(&path).map_err(|source| StoreError::Persist {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), events = collection.len(), "Saved state");
        Ok(path)
    }

    fn empty(&self) -> EventCollection {
        EventCollection::new().with_retention_months(self.retention_months)
    }
}
