//! Single-slot persistence for the most recently fetched catalog
//!
//! At most one catalog lives in the slot. Writing a catalog replaces
//! whatever was there; reading for a different identifier is a miss.

mod file;
mod memory;

pub use file::FileSlotStore;
pub use memory::MemorySlotStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogDocument;

/// The persisted slot's contents.
///
/// `document` is written back from the typed model, so payload fields the
/// model does not carry are not kept in the slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub identifier: String,
    pub document: CatalogDocument,
    /// Stored as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
}

/// Persistence for exactly one cached catalog.
///
/// None of these operations fail observably: write failures are logged
/// and dropped, unreadable slots read as empty.
pub trait SlotStore: Send + Sync + 'static {
    /// Replace the slot with `document`, stamped `fetched_at`
    fn save(&self, identifier: &str, document: &CatalogDocument, fetched_at: DateTime<Utc>);

    /// The slot's entry, if it holds `identifier` and is readable
    fn load(&self, identifier: &str) -> Option<CacheEntry>;

    /// Empty the slot; idempotent
    fn clear(&self);

    /// Describe the slot without regard to identifier
    fn status(&self) -> SlotStatus;
}

/// What the slot currently holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotStatus {
    pub exists: bool,
    pub identifier: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub sections: Option<usize>,
}

impl SlotStatus {
    fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            exists: true,
            identifier: Some(entry.identifier.clone()),
            fetched_at: Some(entry.fetched_at),
            sections: Some(entry.document.section_count()),
        }
    }

    /// Seconds since the slot was written
    pub fn age_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.fetched_at.map(|at| (now - at).num_seconds().max(0))
    }
}
