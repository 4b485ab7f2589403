//! zigdex CLI - command-line interface for the catalog mirror.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "zigdex")]
#[command(version)]
#[command(about = "Mirror Zig package metadata from GitHub into a local catalog")]
#[command(
    long_about = "Zigdex discovers GitHub repositories tagged zig-package or zig-application, \
reconciles them against a local ledger, and writes one JSON catalog entry per \
repository. Runs are incremental: only new or changed repositories are fetched."
)]
#[command(after_long_help = r#"EXAMPLES
    Run an incremental sync into the default catalog layout:
        $ zigdex sync

    See what a sync would do without writing anything:
        $ zigdex sync --dry-run

    Mirror into a specific directory with its own ledger:
        $ zigdex sync -d /srv/catalog/packages -l /srv/catalog/ledger.json

    Generate shell completions:
        $ zigdex completions bash > ~/.local/share/bash-completion/completions/zigdex

CONFIGURATION
    Zigdex reads configuration from:
      1. ~/.config/zigdex/config.toml (or $XDG_CONFIG_HOME/zigdex/config.toml)
      2. ./zigdex.toml
      3. Environment variables (ZIGDEX_* prefix, e.g., ZIGDEX_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    ZIGDEX_GITHUB_TOKEN    GitHub personal access token
    GITHUB_TOKEN           Fallback token variable (as provided by CI runners)
    ZIGDEX_CATALOG_ROOT    Catalog output directory
    ZIGDEX_CATALOG_LEDGER  Ledger file path
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one incremental sync against GitHub
    Sync {
        #[command(flatten)]
        args: commands::sync::SyncArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("zigdex=info,zigdex_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Handle commands that don't require configuration first.
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration (config file -> env vars -> defaults).
    let config = config::Config::load();

    match cli.command {
        Commands::Sync { args } => {
            commands::sync::handle_sync(args, &config).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => unreachable!(),
    }

    Ok(())
}
