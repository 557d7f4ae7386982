//! Wiring shared by the commands that talk to the Catalog Service

use std::sync::Arc;
use std::time::Duration;

use crate::cache::FileSlotStore;
use crate::catalog::{CatalogClient, HttpPolicy, StaticToken};
use crate::config::{Config, Paths};
use crate::error::Result;
use crate::sync::{CatalogSync, SyncOptions, SystemClock};

/// Build the HTTP client; flags win over environment and config
pub fn build_client(
    config: &Config,
    base_url: Option<&str>,
    token: Option<&str>,
) -> Result<CatalogClient> {
    let base_url = base_url
        .map(str::to_string)
        .unwrap_or_else(|| config.base_url());
    let client = CatalogClient::new(&base_url, config.http.policy())?;

    let token = token.or(config.api.token.as_deref()).filter(|t| !t.is_empty());
    Ok(match token {
        Some(token) => client.with_auth(Arc::new(StaticToken::new(token))),
        None => client,
    })
}

/// Orchestrator over the client and the on-disk slot
pub fn build_sync(config: &Config, paths: &Paths, client: CatalogClient) -> CatalogSync {
    CatalogSync::with_options(
        Arc::new(client),
        Arc::new(FileSlotStore::new(&paths.cache_file)),
        SyncOptions {
            ttl: config.cache.ttl(),
            clock: Arc::new(SystemClock),
        },
    )
}

/// Longest a single fetch can take including every retry
pub fn fetch_budget(policy: HttpPolicy) -> Duration {
    let attempts = policy.retries.saturating_add(1);
    policy.timeout * attempts + policy.retry_delay * policy.retries
}
