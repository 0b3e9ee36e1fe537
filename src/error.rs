// ⚠️ Ingestion Errors
// Malformed records are rejected once, when they enter the system

use thiserror::Error;

// ============================================================================
// DATE PARSING
// ============================================================================

/// Text that none of the accepted date formats could read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date '{input}' (expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS, RFC 3339 or MM/DD/YYYY)")]
pub struct DateParseError {
    pub input: String,
}

// ============================================================================
// INGESTION ERRORS
// ============================================================================

/// Why a raw record could not become a `Transaction`
///
/// Every variant names the record (when it has an id) and the offending text,
/// so a failed load points straight at the bad line of the source file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("transaction has no transaction_id")]
    MissingId,

    #[error("transaction {id}: invalid amount '{value}'")]
    InvalidAmount { id: String, value: String },

    #[error("transaction {id}: invalid date '{value}'")]
    InvalidDate { id: String, value: String },
}

impl IngestError {
    /// Field name the error refers to (matches the wire field names)
    pub fn field(&self) -> &'static str {
        match self {
            IngestError::MissingId => "transaction_id",
            IngestError::InvalidAmount { .. } => "transaction_amount",
            IngestError::InvalidDate { .. } => "transaction_date",
        }
    }
}
