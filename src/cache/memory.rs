//! In-process slot, used in tests and when no disk cache is wanted

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{CacheEntry, SlotStatus, SlotStore};
use crate::catalog::CatalogDocument;

/// Catalog slot held in memory
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slot: Mutex<Option<CacheEntry>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `entry`
    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            slot: Mutex::new(Some(entry)),
            ..Self::default()
        }
    }

    /// Number of `load` calls so far
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `save` calls so far
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw slot contents, ignoring identifier
    pub fn peek(&self) -> Option<CacheEntry> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        // A panicked writer can't leave a half-written entry behind
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStore for MemorySlotStore {
    fn save(&self, identifier: &str, document: &CatalogDocument, fetched_at: DateTime<Utc>) {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.slot() = Some(CacheEntry {
            identifier: identifier.to_string(),
            document: document.clone(),
            fetched_at,
        });
    }

    fn load(&self, identifier: &str) -> Option<CacheEntry> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.slot()
            .as_ref()
            .filter(|entry| entry.identifier == identifier)
            .cloned()
    }

    fn clear(&self) {
        *self.slot() = None;
    }

    fn status(&self) -> SlotStatus {
        self.slot()
            .as_ref()
            .map(SlotStatus::from_entry)
            .unwrap_or_default()
    }
}
