use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::cache::SlotStatus;
use crate::catalog::{CatalogDocument, CatalogMetadata, Item, Section};
use crate::sync::{SyncPhase, SyncState};

/// Safely truncate a string to n characters, appending "..." if truncated.
/// Works correctly with multi-byte UTF-8 characters.
fn truncate_str(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max_chars {
        let truncated: String = chars.iter().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Render a decimal price string with its currency, if any
fn price_label(price: Option<&str>, currency: Option<&str>) -> String {
    match (price, currency) {
        (Some(p), Some(c)) => format!("{p} {c}"),
        (Some(p), None) => p.to_string(),
        (None, _) => "-".to_string(),
    }
}

/// Format age in human-readable form
pub fn format_age(secs: i64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Format a full catalog as an indented tree
pub fn format_catalog(catalog: &CatalogDocument) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} {}\n",
        catalog.name.bold(),
        format!("({})", catalog.identifier).dimmed()
    ));
    output.push_str(&"─".repeat(70));
    output.push('\n');

    if catalog.sections.is_empty() {
        output.push_str("No sections.\n");
        return output;
    }

    for section in &catalog.sections {
        format_section(&mut output, section, 0);
    }

    output.push_str(&format!(
        "\n{} sections, {} items\n",
        catalog.section_count(),
        catalog.item_count()
    ));
    output
}

fn format_section(output: &mut String, section: &Section, depth: usize) {
    let indent = "  ".repeat(depth);
    let inactive = if section.active {
        String::new()
    } else {
        format!(" {}", "[inactive]".red())
    };
    output.push_str(&format!("{}{}{}\n", indent, section.name.cyan().bold(), inactive));

    if let Some(ref description) = section.description {
        output.push_str(&format!("{}  {}\n", indent, truncate_str(description, 60).dimmed()));
    }

    for item in &section.items {
        format_item(output, item, depth + 1);
    }
    for sub in &section.sub_sections {
        format_section(output, sub, depth + 1);
    }
}

fn format_item(output: &mut String, item: &Item, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if item.active {
        item.name.normal()
    } else {
        item.name.strikethrough()
    };
    output.push_str(&format!(
        "{}• {:32} {:>12}  {}\n",
        indent,
        name,
        price_label(item.price.as_deref(), item.currency.as_deref()),
        item.sku.dimmed()
    ));

    for option in &item.options {
        output.push_str(&format!(
            "{}    + {:28} {:>12}\n",
            indent,
            option.name,
            price_label(option.price.as_deref(), option.currency.as_deref())
        ));
    }
}

/// Format the catalog listing
pub fn format_catalog_list(catalogs: &[CatalogMetadata]) -> String {
    if catalogs.is_empty() {
        return "No catalogs found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{}\n", "Catalogs".bold()));
    output.push_str(&"─".repeat(70));
    output.push('\n');

    for catalog in catalogs {
        output.push_str(&format!(
            "{:32} {}\n",
            truncate_str(&catalog.identifier, 32).bold(),
            catalog.name
        ));
    }

    output
}

/// Warning line for stale or failed catalog state; empty when all is well
pub fn format_sync_banner(state: &SyncState, now: DateTime<Utc>) -> String {
    let age = state
        .last_fetch
        .map(|at| format_age((now - at).num_seconds().max(0)));

    match state.phase() {
        SyncPhase::ErrorWithFallback => {
            let reason = state
                .last_error
                .as_ref()
                .map(|e| e.user_message())
                .unwrap_or_default();
            let mut line = format!("{} {} Showing cached catalog", "⚠".yellow(), reason);
            if let Some(age) = age {
                line.push_str(&format!(" from {age} ago"));
            }
            line.push('.');
            line
        }
        SyncPhase::StaleDisplayed => {
            let mut line = format!("{} Catalog may be out of date", "⚠".yellow());
            if let Some(age) = age {
                line.push_str(&format!(" (fetched {age} ago)"));
            }
            if state.is_revalidating {
                line.push_str("; refreshing");
            }
            line.push('.');
            line
        }
        SyncPhase::ErrorNoData => {
            let reason = state
                .last_error
                .as_ref()
                .map(|e| e.user_message())
                .unwrap_or_default();
            format!("{} {}", "✗".red(), reason)
        }
        SyncPhase::Idle | SyncPhase::Loading | SyncPhase::Fresh => String::new(),
    }
}

/// Format the persisted slot's status
pub fn format_slot_status(status: &SlotStatus, location: &str, now: DateTime<Utc>, ttl_secs: u64) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", "Cache Status".bold()));
    output.push_str(&format!("Location: {}\n\n", location));

    if !status.exists {
        output.push_str(&format!("  {}\n", "Not cached".dimmed()));
        return output.trim_end().to_string();
    }

    match status.identifier {
        Some(ref identifier) => {
            output.push_str(&format!("  Catalog: {}\n", identifier));
        }
        None => {
            output.push_str(&format!("  {}\n", "Unreadable (will be ignored)".yellow()));
        }
    }
    if let Some(sections) = status.sections {
        output.push_str(&format!("  Sections: {}\n", sections));
    }
    if let Some(age) = status.age_secs(now) {
        let age_str = format_age(age);
        if u64::try_from(age).map_or(true, |age| age <= ttl_secs) {
            output.push_str(&format!("  Age: {} {}\n", age_str, "(fresh)".green()));
        } else {
            output.push_str(&format!("  Age: {} {}\n", age_str, "(stale)".yellow()));
        }
    }

    output.trim_end().to_string()
}
