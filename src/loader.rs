// 📂 Loader - JSON / CSV files → validated transactions
// I/O and document-level failures are fatal; record-level failures follow the IngestPolicy

use crate::transaction::{RawAmount, RawTransaction, Transaction, TransactionId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// ============================================================================
// POLICY + OUTCOME
// ============================================================================

/// What to do with a record whose amount, date or id cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPolicy {
    /// Fail the whole load on the first bad record
    #[default]
    Strict,
    /// Drop bad records (logged at warn) and keep going
    SkipInvalid,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub transactions: Vec<Transaction>,
    /// Records dropped under `IngestPolicy::SkipInvalid`
    pub skipped: usize,
}

// ============================================================================
// INGESTION
// ============================================================================

/// Validate raw records in order, applying the policy
///
/// `position` in errors and logs is 1-based within the document.
pub fn ingest<I>(records: I, policy: IngestPolicy) -> Result<LoadOutcome>
where
    I: IntoIterator<Item = Result<RawTransaction>>,
{
    let mut outcome = LoadOutcome::default();

    for (index, record) in records.into_iter().enumerate() {
        let position = index + 1;

        let converted = record.and_then(|raw| Ok(Transaction::try_from(raw)?));

        match (converted, policy) {
            (Ok(tx), _) => outcome.transactions.push(tx),
            (Err(e), IngestPolicy::SkipInvalid) => {
                tracing::warn!(position, error = %e, "skipping invalid transaction");
                outcome.skipped += 1;
            }
            (Err(e), IngestPolicy::Strict) => {
                return Err(e.context(format!("Invalid transaction at record {}", position)));
            }
        }
    }

    Ok(outcome)
}

/// Read a JSON array of records
pub fn read_json<R: Read>(reader: R, policy: IngestPolicy) -> Result<LoadOutcome> {
    // Elements stay untyped so one bad record cannot reject the whole document
    let values: Vec<serde_json::Value> =
        serde_json::from_reader(reader).context("Expected a JSON array of transactions")?;

    ingest(
        values.into_iter().map(|v| {
            serde_json::from_value::<RawTransaction>(v).context("Failed to deserialize transaction")
        }),
        policy,
    )
}

/// One CSV row
///
/// CSV cells carry no type, so the id column is always read as text: `007`
/// stays `Text("007")`, the same id the JSON string `"007"` gives.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(default)]
    transaction_id: Option<String>,
    transaction_date: String,
    transaction_amount: String,
    transaction_type: String,
    #[serde(default)]
    transaction_description: String,
    #[serde(default)]
    merchant_name: String,
}

impl From<CsvRecord> for RawTransaction {
    fn from(record: CsvRecord) -> Self {
        RawTransaction {
            transaction_id: record
                .transaction_id
                .filter(|id| !id.is_empty())
                .map(TransactionId::Text),
            transaction_date: record.transaction_date,
            transaction_amount: RawAmount::Text(record.transaction_amount),
            transaction_type: record.transaction_type,
            transaction_description: record.transaction_description,
            merchant_name: record.merchant_name,
        }
    }
}

/// Read CSV with a header row using the JSON field names
pub fn read_csv<R: Read>(reader: R, policy: IngestPolicy) -> Result<LoadOutcome> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records: Vec<Result<RawTransaction>> = rdr
        .deserialize::<CsvRecord>()
        .map(|r| {
            r.map(RawTransaction::from)
                .context("Failed to deserialize transaction")
        })
        .collect();

    ingest(records, policy)
}

pub fn load_json(path: &Path, policy: IngestPolicy) -> Result<LoadOutcome> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let outcome = read_json(BufReader::new(file), policy)
        .with_context(|| format!("Failed to load transactions from {}", path.display()))?;

    log_outcome(path, &outcome);
    Ok(outcome)
}

pub fn load_csv(path: &Path, policy: IngestPolicy) -> Result<LoadOutcome> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let outcome = read_csv(BufReader::new(file), policy)
        .with_context(|| format!("Failed to load transactions from {}", path.display()))?;

    log_outcome(path, &outcome);
    Ok(outcome)
}

/// Pick the loader from the file extension (`.json` or `.csv`)
pub fn load_transactions(path: &Path, policy: IngestPolicy) -> Result<LoadOutcome> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => load_json(path, policy),
        "csv" => load_csv(path, policy),
        _ => bail!(
            "Could not detect file format from extension: {} (expected .json or .csv)",
            path.display()
        ),
    }
}

fn log_outcome(path: &Path, outcome: &LoadOutcome) {
    tracing::info!(
        path = %path.display(),
        loaded = outcome.transactions.len(),
        skipped = outcome.skipped,
        "loaded transactions"
    );
}

// ============================================================================
// TESTS
// ============================================================================
