// 💳 Transaction Model - Validated records + wire shape
// Raw records are parsed ONCE at ingestion; queries only ever see clean values

use crate::error::{DateParseError, IngestError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Type label counted as money going out
pub const DEBIT: &str = "debit";

/// Type label counted as money coming in
pub const CREDIT: &str = "credit";

// ============================================================================
// TRANSACTION ID
// ============================================================================

/// Caller-supplied identifier (string or integer in the source document)
///
/// Not unique: the analyzer accepts duplicates and `find_by_id` returns the
/// first one. Equality is exact, `Number(1)` is not `Text("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionId::Number(n) => write!(f, "{}", n),
            TransactionId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Integers become `Number`, anything else `Text`
impl FromStr for TransactionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(n) => TransactionId::Number(n),
            Err(_) => TransactionId::Text(s.to_string()),
        })
    }
}

impl From<i64> for TransactionId {
    fn from(n: i64) -> Self {
        TransactionId::Number(n)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        TransactionId::Text(s.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        TransactionId::Text(s)
    }
}

// ============================================================================
// TRANSACTION DATE
// ============================================================================

/// Point in time of a transaction, totally ordered
///
/// Accepted text:
/// - RFC 3339 (`2021-03-01T10:00:00Z`, converted to UTC)
/// - `2021-03-01T10:00:00` / `2021-03-01 10:00:00`
/// - `2021-03-01` (midnight)
/// - `03/01/2021` (MM/DD/YYYY, midnight)
///
/// Displays as `2021-03-01` at midnight, otherwise with the time and any
/// fractional seconds, so the text always parses back to the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionDate(NaiveDateTime);

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

impl TransactionDate {
    pub fn new(datetime: NaiveDateTime) -> Self {
        TransactionDate(datetime)
    }

    /// Midnight of a calendar day; `None` for an impossible date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(TransactionDate)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month 1-12
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    fn is_midnight(&self) -> bool {
        self.0.num_seconds_from_midnight() == 0 && self.0.nanosecond() == 0
    }
}

impl FromStr for TransactionDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(TransactionDate(dt.naive_utc()));
        }

        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(TransactionDate(dt));
            }
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                    return Ok(TransactionDate(dt));
                }
            }
        }

        Err(DateParseError {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for TransactionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_midnight() {
            write!(f, "{}", self.0.format("%Y-%m-%d"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.f"))
        }
    }
}

impl From<NaiveDateTime> for TransactionDate {
    fn from(datetime: NaiveDateTime) -> Self {
        TransactionDate(datetime)
    }
}

impl From<NaiveDate> for TransactionDate {
    fn from(date: NaiveDate) -> Self {
        TransactionDate(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl Serialize for TransactionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// RAW TRANSACTION (wire shape)
// ============================================================================

/// Amount as it appears in the source document: a JSON number or numeric text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    /// Locale-invariant parse (`.` decimal separator); NaN and infinities rejected
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            RawAmount::Number(n) => Some(*n),
            RawAmount::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{}", n),
            RawAmount::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Unvalidated record, field names as in `transactions.json`
///
/// Unknown fields (e.g. `customer_id`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    pub transaction_date: String,
    pub transaction_amount: RawAmount,
    pub transaction_type: String,
    #[serde(default)]
    pub transaction_description: String,
    #[serde(default)]
    pub merchant_name: String,
}

// ============================================================================
// TRANSACTION (validated)
// ============================================================================

/// One financial event, validated at ingestion
///
/// Serializes with the same field names it was read from. Deserializing goes
/// through `RawTransaction`, so a malformed document fails with an
/// `IngestError` message instead of producing a poisoned record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    #[serde(rename = "transaction_id")]
    pub id: TransactionId,

    pub transaction_type: String,

    #[serde(rename = "transaction_amount")]
    pub amount: f64,

    #[serde(rename = "transaction_date")]
    pub date: TransactionDate,

    #[serde(rename = "merchant_name")]
    pub merchant: String,

    #[serde(rename = "transaction_description")]
    pub description: String,
}

impl Transaction {
    /// Build a record directly; merchant and description start empty
    pub fn new(
        id: impl Into<TransactionId>,
        transaction_type: impl Into<String>,
        amount: f64,
        date: TransactionDate,
    ) -> Self {
        Transaction {
            id: id.into(),
            transaction_type: transaction_type.into(),
            amount,
            date,
            merchant: String::new(),
            description: String::new(),
        }
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = merchant.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == DEBIT
    }

    pub fn is_credit(&self) -> bool {
        self.transaction_type == CREDIT
    }
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = IngestError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let id = raw.transaction_id.ok_or(IngestError::MissingId)?;

        let amount = raw
            .transaction_amount
            .parse()
            .ok_or_else(|| IngestError::InvalidAmount {
                id: id.to_string(),
                value: raw.transaction_amount.to_string(),
            })?;

        let date = raw
            .transaction_date
            .parse::<TransactionDate>()
            .map_err(|_| IngestError::InvalidDate {
                id: id.to_string(),
                value: raw.transaction_date.clone(),
            })?;

        Ok(Transaction {
            id,
            transaction_type: raw.transaction_type,
            amount,
            date,
            merchant: raw.merchant_name,
            description: raw.transaction_description,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_raw(id: Option<TransactionId>, amount: RawAmount, date: &str) -> RawTransaction {
        RawTransaction {
            transaction_id: id,
            transaction_date: date.to_string(),
            transaction_amount: amount,
            transaction_type: "debit".to_string(),
            transaction_description: "Groceries".to_string(),
            merchant_name: "SuperMart".to_string(),
        }
    }

    #[test]
    fn test_date_formats() {
        let expected = TransactionDate::from_ymd(2021, 3, 1).unwrap();

        assert_eq!("2021-03-01".parse::<TransactionDate>().unwrap(), expected);
        assert_eq!("03/01/2021".parse::<TransactionDate>().unwrap(), expected);
        assert_eq!(" 2021-03-01 ".parse::<TransactionDate>().unwrap(), expected);
        assert_eq!("2021-03-01T00:00:00".parse::<TransactionDate>().unwrap(), expected);
        assert_eq!("2021-03-01T00:00:00Z".parse::<TransactionDate>().unwrap(), expected);

        let with_time: TransactionDate = "2021-03-01 14:30:00".parse().unwrap();
        assert!(with_time > expected);
        assert_eq!(with_time.month(), 3);
    }

    #[test]
    fn test_rfc3339_offset_converted_to_utc() {
        let date: TransactionDate = "2021-03-01T01:00:00+02:00".parse().unwrap();
        assert_eq!(date.year(), 2021);
        assert_eq!(date.month(), 2);
        assert_eq!(date.day(), 28);
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert!("2021-13-01".parse::<TransactionDate>().is_err());
        assert!("not a date".parse::<TransactionDate>().is_err());
        assert!("".parse::<TransactionDate>().is_err());
    }

    #[test]
    fn test_date_display() {
        let day: TransactionDate = "2021-03-01".parse().unwrap();
        assert_eq!(day.to_string(), "2021-03-01");

        let moment: TransactionDate = "2021-03-01T08:15:00".parse().unwrap();
        assert_eq!(moment.to_string(), "2021-03-01T08:15:00");

        let fractional: TransactionDate = "2021-03-01T10:00:00.750".parse().unwrap();
        assert_eq!(fractional.to_string(), "2021-03-01T10:00:00.750");

        // half a second past midnight is not a date-only value
        let just_after_midnight: TransactionDate = "2021-03-01T00:00:00.5".parse().unwrap();
        assert_eq!(just_after_midnight.to_string(), "2021-03-01T00:00:00.500");
        assert_eq!(just_after_midnight.to_string().parse::<TransactionDate>().unwrap(), just_after_midnight);
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!(RawAmount::Text("50.00".to_string()).parse(), Some(50.0));
        assert_eq!(RawAmount::Text(" -12.5 ".to_string()).parse(), Some(-12.5));
        assert_eq!(RawAmount::Number(7.25).parse(), Some(7.25));
        assert_eq!(RawAmount::Text("1,000.00".to_string()).parse(), None);
        assert_eq!(RawAmount::Text("".to_string()).parse(), None);
        assert_eq!(RawAmount::Text("NaN".to_string()).parse(), None);
        assert_eq!(RawAmount::Text("inf".to_string()).parse(), None);
    }

    #[test]
    fn test_try_from_valid_raw() {
        let raw = create_raw(
            Some(TransactionId::Number(1)),
            RawAmount::Text("50.00".to_string()),
            "2021-03-01",
        );

        let tx = Transaction::try_from(raw).unwrap();
        assert_eq!(tx.id, TransactionId::Number(1));
        assert_eq!(tx.amount, 50.0);
        assert_eq!(tx.merchant, "SuperMart");
        assert_eq!(tx.description, "Groceries");
        assert!(tx.is_debit());
        assert!(!tx.is_credit());
    }

    #[test]
    fn test_try_from_rejects_bad_fields() {
        let missing_id = create_raw(None, RawAmount::Number(1.0), "2021-03-01");
        assert_eq!(
            Transaction::try_from(missing_id).unwrap_err(),
            IngestError::MissingId
        );

        let bad_amount = create_raw(
            Some("7".into()),
            RawAmount::Text("12,50".to_string()),
            "2021-03-01",
        );
        assert_eq!(
            Transaction::try_from(bad_amount).unwrap_err(),
            IngestError::InvalidAmount {
                id: "7".to_string(),
                value: "12,50".to_string(),
            }
        );

        let bad_date = create_raw(Some("7".into()), RawAmount::Number(1.0), "someday");
        assert_eq!(
            Transaction::try_from(bad_date).unwrap_err(),
            IngestError::InvalidDate {
                id: "7".to_string(),
                value: "someday".to_string(),
            }
        );
    }

    #[test]
    fn test_json_round_trip_uses_wire_names() {
        let json = r#"{
            "transaction_id": "1",
            "transaction_date": "2019-01-01",
            "transaction_amount": "100.00",
            "transaction_type": "debit",
            "transaction_description": "Payment for groceries",
            "merchant_name": "SuperMart",
            "customer_id": 101
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, TransactionId::Text("1".to_string()));
        assert_eq!(tx.amount, 100.0);

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["transaction_date"], "2019-01-01");
        assert_eq!(value["merchant_name"], "SuperMart");
        assert_eq!(value["transaction_amount"], 100.0);
    }

    #[test]
    fn test_fractional_timestamp_survives_json_round_trip() {
        let json = r#"{
            "transaction_id": "7",
            "transaction_date": "2021-03-01T10:00:00.750",
            "transaction_amount": 12.5,
            "transaction_type": "credit"
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        let text = serde_json::to_string(&tx).unwrap();
        assert!(text.contains(r#""transaction_date":"2021-03-01T10:00:00.750""#));

        let back: Transaction = serde_json::from_str(&text).unwrap();
        assert_eq!(tx, back);

        let half_past: TransactionDate = "2021-03-01T10:00:00.500".parse().unwrap();
        assert!(tx.date > half_past);
        assert!(back.date > half_past);
    }

    #[test]
    fn test_json_with_bad_amount_fails_to_deserialize() {
        let json = r#"{
            "transaction_id": 3,
            "transaction_date": "2019-01-01",
            "transaction_amount": "lots",
            "transaction_type": "credit"
        }"#;

        let err = serde_json::from_str::<Transaction>(json).unwrap_err();
        assert!(err.to_string().contains("invalid amount 'lots'"));
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("12".parse::<TransactionId>().unwrap(), TransactionId::Number(12));
        assert_eq!(
            "tx-12".parse::<TransactionId>().unwrap(),
            TransactionId::Text("tx-12".to_string())
        );
        assert_ne!(TransactionId::Number(1), TransactionId::from("1"));
    }
}
