use clap::Parser;
use colored::{control::set_override, Colorize};
use is_terminal::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_sync::cli::args::{Cli, Commands, CompletionsArgs};
use catalog_sync::cli::commands;
use catalog_sync::config::{Config, Paths};
use catalog_sync::error::SyncError;

#[tokio::main]
async fn main() {
    // Respect NO_COLOR environment variable (https://no-color.org/)
    // Also disable colors when stdout is not a terminal (for piping)
    if std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal() {
        set_override(false);
    }

    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        if let Some(fetch) = e.as_fetch() {
            eprintln!("{}", fetch.user_message().dimmed());
        }
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr so JSON output on stdout stays parseable
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "catalog_sync=debug"
    } else {
        "catalog_sync=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

async fn run() -> Result<(), SyncError> {
    let cli = Cli::parse();
    let format = cli.output;

    // Handle completions command early (no config or client needed)
    if let Commands::Completions(CompletionsArgs { shell }) = &cli.command {
        Cli::print_completions(*shell);
        return Ok(());
    }

    init_tracing(cli.verbose);

    let paths = Paths::new()?;
    let mut config = Config::load_from(&paths)?;

    let output = match &cli.command {
        Commands::Completions(_) => unreachable!(), // Handled above
        Commands::Config(args) => commands::config(&mut config, &paths, args, format)?,
        Commands::Cache(args) => commands::cache(&config, &paths, args, format)?,

        // Commands that talk to the Catalog Service
        Commands::Show(args) => {
            let client =
                commands::build_client(&config, cli.base_url.as_deref(), cli.token.as_deref())?;
            commands::show(client, &config, &paths, args, format).await?
        }
        Commands::List(args) => {
            let client =
                commands::build_client(&config, cli.base_url.as_deref(), cli.token.as_deref())?;
            commands::list(client, &config, &paths, args, format).await?
        }
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
