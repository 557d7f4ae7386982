use crate::catalog::CatalogClient;
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::Result;
use crate::output;

use super::common::build_sync;

/// Handle the list command
pub async fn list(
    client: CatalogClient,
    config: &Config,
    paths: &Paths,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<String> {
    let sync = build_sync(config, paths, client);
    let all = sync.request_catalog_list(args.refresh).await?;

    let catalogs: Vec<_> = match args.filter {
        Some(ref filter) => {
            let filter_lower = filter.to_lowercase();
            all.into_iter()
                .filter(|c| {
                    c.name.to_lowercase().contains(&filter_lower)
                        || c.identifier.to_lowercase().contains(&filter_lower)
                })
                .collect()
        }
        None => all,
    };

    output::format_catalog_list(&catalogs, format)
}
