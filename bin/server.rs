// Transaction Analyzer - Web Server
// REST API with Axum over an in-memory analyzer

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use transaction_analyzer::{
    api, init_logging, load_transactions, IngestPolicy, SharedAnalyzer, TransactionAnalyzer,
    DEFAULT_INPUT,
};

#[derive(Debug, Parser)]
#[command(name = "analyzer-server", version, about = "Serve transaction queries over HTTP")]
struct Args {
    /// Transactions file loaded at startup (.json or .csv)
    #[arg(default_value = DEFAULT_INPUT)]
    path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "ANALYZER_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,

    /// Drop malformed records instead of refusing to start
    #[arg(long)]
    skip_invalid: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    println!("🌐 Transaction Analyzer - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let policy = if args.skip_invalid {
        IngestPolicy::SkipInvalid
    } else {
        IngestPolicy::Strict
    };

    let outcome = load_transactions(&args.path, policy)?;
    println!(
        "✓ Loaded {} transactions from {:?} ({} skipped)",
        outcome.transactions.len(),
        args.path,
        outcome.skipped
    );

    let shared = SharedAnalyzer::new(TransactionAnalyzer::new(outcome.transactions));
    let app = api::router(shared);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", args.addr))?;

    println!("\n🚀 Server running on http://{}", args.addr);
    println!("   API: http://{}/api/transactions", args.addr);
    println!("\n   Press Ctrl+C to stop\n");
    tracing::info!(addr = %args.addr, "server started");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
