//! The sync command: run one full mirror pass.

use std::path::PathBuf;

use console::{Term, style};

use zigdex::catalog::CatalogStore;
use zigdex::github::GithubClient;
use zigdex::http::ReqwestTransport;
use zigdex::ledger::LedgerStore;
use zigdex::sync::{SyncOptions, SyncOutcome, run_sync};

use crate::config::Config;
use crate::progress::LoggingReporter;

/// Flags accepted by `zigdex sync`.
#[derive(Debug, Clone, clap::Args)]
pub struct SyncArgs {
    /// Directory catalog entries are written under (default from config)
    #[arg(short = 'd', long)]
    pub catalog_dir: Option<PathBuf>,

    /// Path of the reconciliation ledger (default from config)
    #[arg(short = 'l', long)]
    pub ledger: Option<PathBuf>,

    /// Discover and reconcile only; don't fetch details or write files
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Request budget in requests per second (default from config or 1)
    #[arg(short = 'r', long)]
    pub rps: Option<u32>,
}

/// Handle `zigdex sync`.
pub async fn handle_sync(
    args: SyncArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = config.github_token().ok_or(
        "No GitHub token configured. Set ZIGDEX_GITHUB_TOKEN or GITHUB_TOKEN, \
         or add it under [github] in the config file.",
    )?;

    let catalog_root = args.catalog_dir.unwrap_or_else(|| config.catalog_root());
    let ledger_path = args.ledger.unwrap_or_else(|| config.ledger_path());
    let options = SyncOptions {
        requests_per_second: args.rps.unwrap_or(config.sync.requests_per_second),
        dry_run: args.dry_run,
    };

    tracing::info!(
        catalog = %catalog_root.display(),
        ledger = %ledger_path.display(),
        dry_run = options.dry_run,
        "starting sync"
    );

    let transport = ReqwestTransport::default();
    let client = GithubClient::new(transport, token);
    let store = CatalogStore::new(catalog_root);
    let mut ledger_store = LedgerStore::open(ledger_path)?;

    let callback = LoggingReporter::new().into_callback();
    let outcome = run_sync(&client, &store, &mut ledger_store, &options, Some(&callback)).await?;

    print_summary(&outcome, options.dry_run);

    Ok(())
}

fn print_summary(outcome: &SyncOutcome, dry_run: bool) {
    let term = Term::stdout();
    let heading = if dry_run {
        "Sync plan (dry run)"
    } else {
        "Sync complete"
    };

    let _ = term.write_line(&format!("{}", style(heading).bold()));
    let _ = term.write_line(&format!(
        "  discovered: {}  new: {}  updated: {}  removed: {}",
        outcome.discovered,
        outcome.new,
        outcome.updated,
        outcome.removed.len()
    ));

    if !dry_run {
        let _ = term.write_line(&format!(
            "  written: {}  filtered: {}  abandoned batches: {}",
            outcome.written, outcome.filtered, outcome.abandoned_batches
        ));
    }

    if !outcome.removed.is_empty() {
        let _ = term.write_line(&format!(
            "  {} no longer discovered (kept): {}",
            style("note:").yellow(),
            outcome.removed.join(", ")
        ));
    }

    for error in &outcome.errors {
        let _ = term.write_line(&format!("  {} {}", style("error:").red(), error));
    }
}
