use crate::cache::SlotStatus;
use crate::catalog::{CatalogDocument, CatalogMetadata};
use crate::error::Result;
use crate::sync::SyncState;

/// Format a catalog with its sync status as JSON
pub fn format_catalog(catalog: &CatalogDocument, state: &SyncState) -> Result<String> {
    let json = serde_json::json!({
        "catalog": catalog,
        "sync": sync_json(state),
    });
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Format the catalog listing as JSON
pub fn format_catalog_list(catalogs: &[CatalogMetadata]) -> Result<String> {
    Ok(serde_json::to_string_pretty(catalogs)?)
}

/// Format the persisted slot's status as JSON
pub fn format_slot_status(status: &SlotStatus, location: &str) -> Result<String> {
    let json = serde_json::json!({
        "location": location,
        "exists": status.exists,
        "identifier": status.identifier,
        "fetched_at": status.fetched_at,
        "sections": status.sections,
    });
    Ok(serde_json::to_string_pretty(&json)?)
}

fn sync_json(state: &SyncState) -> serde_json::Value {
    serde_json::json!({
        "phase": state.phase().as_str(),
        "is_stale": state.is_stale,
        "is_revalidating": state.is_revalidating,
        "last_fetch": state.last_fetch,
        "error": state.last_error.as_ref().map(|e| serde_json::json!({
            "message": e.to_string(),
            "status": e.status(),
        })),
    })
}
