use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

/// Fetch, cache and inspect storefront catalogs from the Catalog Service
#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(version, propagate_version = true)]
#[command(about = "Fetch, cache and inspect storefront catalogs from the Catalog Service")]
pub struct Cli {
    /// Output format for command results
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Catalog Service base URL (overrides config and CATALOG_SERVICE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token for the Catalog Service (overrides config)
    #[arg(long, global = true, env = "CATALOG_SERVICE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log cache and network activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Write shell completions to stdout
    pub fn print_completions(shell: Shell) {
        let mut cmd = Self::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    }
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored, human-readable output
    #[default]
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show a catalog, served from cache when possible
    #[command(alias = "s")]
    Show(ShowArgs),

    /// List available catalogs
    #[command(alias = "ls")]
    List(ListArgs),

    /// Manage the local catalog cache
    Cache(CacheArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the show command
#[derive(Args)]
pub struct ShowArgs {
    /// Catalog identifier
    pub identifier: String,

    /// Skip the cache and fetch from the service
    #[arg(short, long)]
    pub refresh: bool,

    /// Exit without waiting for the background refresh
    #[arg(long)]
    pub no_wait: bool,
}

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Fetch even if a recent listing is held
    #[arg(short, long)]
    pub refresh: bool,

    /// Filter catalogs by name or identifier
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the cache command
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

/// Cache subcommands
#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show what the cache holds
    Status,
    /// Remove the cached catalog
    Clear,
}

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.base_url, cache.ttl_secs)
        key: String,
        /// Value to set
        value: String,
    },
    /// Show configuration file path
    Path,
}

/// Arguments for the completions command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
