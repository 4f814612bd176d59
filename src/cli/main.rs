mod commands;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Args, Output};
use wallet_ledger::{
    BatchProcessor, InMemoryAccountStore, InMemoryLedgerStore, RetryPolicy, TransferEngine,
};

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Initialize the engine over fresh stores
    let engine = TransferEngine::new(InMemoryAccountStore::new(), InMemoryLedgerStore::new());
    let retry = RetryPolicy::new(args.max_attempts, Duration::from_millis(args.backoff_ms));
    let mut batch = BatchProcessor::new(engine, retry);

    // 2. Open the accounts
    log::info!("Loading accounts from {}", args.accounts.display());
    let accounts = std::fs::File::open(&args.accounts)
        .with_context(|| format!("Failed to open accounts file: {}", args.accounts.display()))?;
    batch
        .load_accounts(accounts)
        .context("Failed to load accounts")?;

    // 3. Apply the requests
    log::info!("Processing requests from {}", args.requests_file.display());
    let requests = std::fs::File::open(&args.requests_file).with_context(|| {
        format!(
            "Failed to open requests file: {}",
            args.requests_file.display()
        )
    })?;
    let summary = batch
        .process_requests(requests)
        .context("Failed to process requests")?;

    log::info!(
        "{} applied, {} rejected, exporting {:?}",
        summary.applied,
        summary.rejected,
        args.output
    );

    // 4. Export to stdout
    let stdout = std::io::stdout();
    let exported = match args.output {
        Output::Records => batch.export_records(stdout),
        Output::Receipts => batch.export_receipts(stdout),
        Output::Accounts => batch.export_accounts(stdout),
    };
    exported.context("Failed to export results to stdout")?;

    log::info!("Export complete");

    Ok(())
}
