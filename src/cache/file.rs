//! JSON file backing for the catalog slot

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{CacheEntry, SlotStatus, SlotStore};
use crate::catalog::CatalogDocument;
use crate::error::{CacheReadError, Result};

/// Catalog slot stored as a single JSON file
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    cache_file: PathBuf,
}

impl FileSlotStore {
    pub fn new(cache_file: impl Into<PathBuf>) -> Self {
        Self {
            cache_file: cache_file.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_file
    }

    /// Read the slot, distinguishing empty from unreadable
    fn read(&self) -> std::result::Result<Option<CacheEntry>, CacheReadError> {
        let data = match std::fs::read_to_string(&self.cache_file) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// Read the slot, logging and dropping read failures
    fn read_or_miss(&self) -> Option<CacheEntry> {
        match self.read() {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    path = %self.cache_file.display(),
                    error = %err,
                    "Ignoring unreadable catalog cache"
                );
                None
            }
        }
    }

    /// Write the whole entry to a sibling temp file, then rename over the slot
    fn write(&self, entry: &CacheEntry) -> Result<()> {
        if let Some(parent) = self.cache_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(entry)?;
        let tmp = self
            .cache_file
            .with_extension(format!("json.{}.tmp", std::process::id()));
        std::fs::write(&tmp, json)?;
        if let Err(err) = std::fs::rename(&tmp, &self.cache_file) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }

        Ok(())
    }
}

impl SlotStore for FileSlotStore {
    fn save(&self, identifier: &str, document: &CatalogDocument, fetched_at: DateTime<Utc>) {
        let entry = CacheEntry {
            identifier: identifier.to_string(),
            document: document.clone(),
            fetched_at,
        };

        match self.write(&entry) {
            Ok(()) => tracing::debug!(identifier, "Saved catalog to cache"),
            Err(err) => tracing::warn!(identifier, error = %err, "Failed to save catalog cache"),
        }
    }

    fn load(&self, identifier: &str) -> Option<CacheEntry> {
        let entry = self.read_or_miss()?;
        if entry.identifier != identifier {
            tracing::trace!(
                identifier,
                cached = %entry.identifier,
                "Cache slot holds a different catalog"
            );
            return None;
        }
        Some(entry)
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.cache_file) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.cache_file.display(),
                error = %err,
                "Failed to clear catalog cache"
            ),
        }
    }

    fn status(&self) -> SlotStatus {
        if !self.cache_file.exists() {
            return SlotStatus::default();
        }

        match self.read_or_miss() {
            Some(entry) => SlotStatus::from_entry(&entry),
            None => SlotStatus {
                exists: true,
                ..SlotStatus::default()
            },
        }
    }
}
