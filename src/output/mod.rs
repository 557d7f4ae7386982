pub mod json;
pub mod pretty;

use chrono::{DateTime, Utc};

use crate::cache::SlotStatus;
use crate::catalog::{CatalogDocument, CatalogMetadata};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::SyncState;

/// Format a catalog, with any stale/error banner, based on output format
pub fn format_catalog(
    catalog: &CatalogDocument,
    state: &SyncState,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Pretty => {
            let banner = pretty::format_sync_banner(state, now);
            let body = pretty::format_catalog(catalog);
            if banner.is_empty() {
                Ok(body)
            } else {
                Ok(format!("{banner}\n\n{body}"))
            }
        }
        OutputFormat::Json => json::format_catalog(catalog, state),
    }
}

/// Format the catalog listing based on output format
pub fn format_catalog_list(catalogs: &[CatalogMetadata], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_catalog_list(catalogs)),
        OutputFormat::Json => json::format_catalog_list(catalogs),
    }
}

/// Format the persisted slot's status based on output format
pub fn format_slot_status(
    status: &SlotStatus,
    location: &str,
    now: DateTime<Utc>,
    ttl_secs: u64,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_slot_status(status, location, now, ttl_secs)),
        OutputFormat::Json => json::format_slot_status(status, location),
    }
}
