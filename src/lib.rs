// Transaction Analyzer - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod transaction;
pub mod analyzer;
pub mod loader;
pub mod report;
pub mod shared;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{DateParseError, IngestError};
pub use transaction::{
    RawAmount, RawTransaction, Transaction, TransactionDate, TransactionId, CREDIT, DEBIT,
};
pub use analyzer::{DateFilter, DominantType, TransactionAnalyzer};
pub use loader::{
    ingest, load_csv, load_json, load_transactions, read_csv, read_json, IngestPolicy,
    LoadOutcome,
};
pub use report::{AnalysisReport, ReportConfig, TransactionLine};
pub use shared::SharedAnalyzer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Input file read when no path is given
pub const DEFAULT_INPUT: &str = "transactions.json";

/// Install the `tracing` subscriber used by the binaries
///
/// `RUST_LOG` overrides the default filter (`info`). Logs go to stderr so the
/// report on stdout stays clean.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
