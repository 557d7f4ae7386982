use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::catalog::{CatalogDocument, CatalogMetadata};
use crate::error::FetchError;

/// What the UI layer observes about catalog synchronization.
///
/// Owned and mutated only by [`CatalogSync`](super::CatalogSync); everyone
/// else reads snapshots or subscribes to changes.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Document for `current_identifier`, shared and never mutated
    pub current_document: Option<Arc<CatalogDocument>>,
    pub current_identifier: Option<String>,
    /// Foreground fetch in flight with nothing yet to show
    pub is_loading: bool,
    pub last_error: Option<FetchError>,
    pub is_stale: bool,
    /// When `current_document` was fetched from the service
    pub last_fetch: Option<DateTime<Utc>>,
    /// Background refresh in flight for `current_identifier`
    pub is_revalidating: bool,
    pub list: ListState,
}

/// The catalog listing, tracked apart from the current document
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub catalogs: Vec<CatalogMetadata>,
    pub is_loading: bool,
    pub error: Option<FetchError>,
    /// `None` until a listing has been fetched successfully
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Catalog session as the storefront would render it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing requested yet
    Idle,
    /// Foreground fetch in flight, nothing displayed
    Loading,
    /// Document within TTL
    Fresh,
    /// Document past TTL; a refresh may be in flight
    StaleDisplayed,
    /// Last fetch failed; an older cached document is shown
    ErrorWithFallback,
    /// Last fetch failed and there is nothing to show
    ErrorNoData,
}

impl SyncPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Fresh => "fresh",
            Self::StaleDisplayed => "stale",
            Self::ErrorWithFallback => "error_with_fallback",
            Self::ErrorNoData => "error_no_data",
        }
    }
}

impl SyncState {
    pub fn phase(&self) -> SyncPhase {
        match (&self.current_document, &self.last_error) {
            _ if self.is_loading => SyncPhase::Loading,
            (Some(_), Some(_)) => SyncPhase::ErrorWithFallback,
            (None, Some(_)) => SyncPhase::ErrorNoData,
            (Some(_), None) if self.is_stale => SyncPhase::StaleDisplayed,
            (Some(_), None) => SyncPhase::Fresh,
            (None, None) => SyncPhase::Idle,
        }
    }

    pub fn has_current_catalog(&self) -> bool {
        self.current_document.is_some()
    }

    pub fn has_catalog_list(&self) -> bool {
        self.list.fetched_at.is_some()
    }

    pub fn is_catalog_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_list_loading(&self) -> bool {
        self.list.is_loading
    }

    pub fn catalog_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn list_error(&self) -> Option<&FetchError> {
        self.list.error.as_ref()
    }

    /// Whether the held document belongs to `identifier`
    pub(crate) fn holds(&self, identifier: &str) -> bool {
        self.current_identifier.as_deref() == Some(identifier) && self.current_document.is_some()
    }
}
