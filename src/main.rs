use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use transaction_analyzer::{
    init_logging, load_transactions, AnalysisReport, DateFilter, IngestPolicy, ReportConfig,
    TransactionAnalyzer, TransactionDate, TransactionId, DEFAULT_INPUT,
};

/// Load a transactions file and print the answer to every query
#[derive(Debug, Parser)]
#[command(name = "transaction-analyzer", version, about)]
struct Cli {
    /// Transactions file (.json array or .csv with a header row)
    #[arg(default_value = DEFAULT_INPUT)]
    path: PathBuf,

    /// JSON file with report parameters (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Drop malformed records instead of failing the load
    #[arg(long)]
    skip_invalid: bool,

    /// Start of the date range (inclusive)
    #[arg(long)]
    from: Option<TransactionDate>,

    /// End of the date range (inclusive)
    #[arg(long)]
    to: Option<TransactionDate>,

    /// Transaction type to list
    #[arg(long = "type")]
    transaction_type: Option<String>,

    /// Merchant to list
    #[arg(long)]
    merchant: Option<String>,

    /// Lower bound of the amount band (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    min_amount: Option<f64>,

    /// Upper bound of the amount band (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    max_amount: Option<f64>,

    /// List transactions strictly before this date
    #[arg(long)]
    before: Option<TransactionDate>,

    /// Transaction id to look up (integers match numeric ids)
    #[arg(long)]
    id: Option<TransactionId>,

    /// Year for the on-date total
    #[arg(long)]
    year: Option<i32>,

    /// Month (1-12) for the on-date total
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Day (1-31) for the on-date total
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    day: Option<u32>,
}

impl Cli {
    fn report_config(&self) -> Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_file(path)?,
            None => ReportConfig::default(),
        };

        if let Some(from) = self.from {
            config.range_start = from;
        }
        if let Some(to) = self.to {
            config.range_end = to;
        }
        if let Some(t) = &self.transaction_type {
            config.transaction_type = t.clone();
        }
        if let Some(m) = &self.merchant {
            config.merchant = m.clone();
        }
        if let Some(min) = self.min_amount {
            config.min_amount = min;
        }
        if let Some(max) = self.max_amount {
            config.max_amount = max;
        }
        if let Some(before) = self.before {
            config.before = before;
        }
        if let Some(id) = &self.id {
            config.id = id.clone();
        }
        if self.year.is_some() || self.month.is_some() || self.day.is_some() {
            config.on_date = DateFilter {
                year: self.year,
                month: self.month,
                day: self.day,
            };
        }

        Ok(config)
    }

    fn policy(&self) -> IngestPolicy {
        if self.skip_invalid {
            IngestPolicy::SkipInvalid
        } else {
            IngestPolicy::Strict
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = cli.report_config()?;
    let outcome = load_transactions(&cli.path, cli.policy())?;
    if outcome.skipped > 0 {
        eprintln!("⚠️  Skipped {} invalid transaction(s)", outcome.skipped);
    }

    let analyzer = TransactionAnalyzer::new(outcome.transactions);
    let report = AnalysisReport::build(&analyzer, &config);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    Ok(())
}
