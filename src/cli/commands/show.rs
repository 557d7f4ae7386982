use chrono::Utc;

use crate::catalog::CatalogClient;
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::{Config, Paths};
use crate::error::Result;
use crate::output;

use super::common::{build_sync, fetch_budget};

/// Handle the show command
pub async fn show(
    client: CatalogClient,
    config: &Config,
    paths: &Paths,
    args: &ShowArgs,
    format: OutputFormat,
) -> Result<String> {
    let budget = fetch_budget(client.policy());
    let sync = build_sync(config, paths, client);

    let result = sync.request_catalog(&args.identifier, args.refresh).await;
    let state = sync.snapshot();

    let catalog = match (result, state.current_document.clone()) {
        (Ok(catalog), _) => catalog,
        // Failed, but a cached copy is on display: show it under a warning
        (Err(err), Some(fallback)) => {
            tracing::debug!(error = %err, "Showing cached catalog after failed fetch");
            fallback
        }
        (Err(err), None) => return Err(err.into()),
    };

    let rendered = output::format_catalog(&catalog, &state, Utc::now(), format)?;

    // Give the background refresh a chance to update the cache before exit
    if state.is_revalidating && !args.no_wait {
        if tokio::time::timeout(budget, sync.revalidated()).await.is_err() {
            tracing::warn!(
                identifier = %args.identifier,
                "Background refresh did not finish in time"
            );
        }
    }

    Ok(rendered)
}
