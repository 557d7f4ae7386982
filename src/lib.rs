//! Catalog synchronization for a restaurant storefront.
//!
//! [`sync::CatalogSync`] serves menu catalogs from memory, a single-slot
//! persisted cache, or the remote Catalog Service, refreshing stale data
//! in the background and falling back to the cache when the service fails.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod sync;

pub use catalog::{CatalogClient, CatalogDocument, CatalogFetcher, CatalogMetadata};
pub use error::{ErrorKind, FetchError, Result, SyncError};
pub use sync::{CatalogSync, SyncPhase, SyncState};
