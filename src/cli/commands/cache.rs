//! Cache management commands

use chrono::Utc;
use colored::Colorize;

use crate::cache::{FileSlotStore, SlotStore};
use crate::cli::args::{CacheArgs, CacheCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::Result;
use crate::output;

/// Handle cache commands
pub fn cache(config: &Config, paths: &Paths, args: &CacheArgs, format: OutputFormat) -> Result<String> {
    let store = FileSlotStore::new(&paths.cache_file);

    match &args.command {
        CacheCommands::Status => status(config, &store, format),
        CacheCommands::Clear => clear(&store, format),
    }
}

fn status(config: &Config, store: &FileSlotStore, format: OutputFormat) -> Result<String> {
    let location = store.path().display().to_string();
    output::format_slot_status(
        &store.status(),
        &location,
        Utc::now(),
        config.cache.ttl_secs,
        format,
    )
}

fn clear(store: &FileSlotStore, format: OutputFormat) -> Result<String> {
    store.clear();

    match format {
        OutputFormat::Pretty => Ok(format!("{} Cache cleared", "✓".green())),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "status": "cleared"
            });
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}
