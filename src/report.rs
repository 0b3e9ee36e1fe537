// 🧾 Analysis Report - Every query answered in one pass
// Owned values so the report can outlive the analyzer (printing, JSON, HTTP)

use crate::analyzer::{DateFilter, DominantType, TransactionAnalyzer};
use crate::transaction::{Transaction, TransactionDate, TransactionId, DEBIT};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ============================================================================
// REPORT CONFIG
// ============================================================================

/// Query parameters for the report
///
/// Defaults reproduce the stock report: 2010–2023 range, debit filter,
/// "OnlineShop", 50–100 amount band, before 2019-06-01, id "1".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub range_start: TransactionDate,
    pub range_end: TransactionDate,
    pub transaction_type: String,
    pub merchant: String,
    pub min_amount: f64,
    pub max_amount: f64,
    pub before: TransactionDate,
    pub id: TransactionId,
    pub on_date: DateFilter,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            range_start: calendar_day(2010, 1, 1),
            range_end: calendar_day(2023, 12, 31),
            transaction_type: DEBIT.to_string(),
            merchant: "OnlineShop".to_string(),
            min_amount: 50.0,
            max_amount: 100.0,
            before: calendar_day(2019, 6, 1),
            id: TransactionId::Text("1".to_string()),
            on_date: DateFilter::any(),
        }
    }
}

impl ReportConfig {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid report config: {}", path.display()))
    }
}

fn calendar_day(year: i32, month: u32, day: u32) -> TransactionDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_default()
        .into()
}

// ============================================================================
// ANALYSIS REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub config: ReportConfig,
    pub all_transactions: Vec<Transaction>,
    pub unique_types: Vec<String>,
    pub total_amount: f64,
    pub total_amount_on_date: f64,
    pub by_type: Vec<Transaction>,
    pub in_date_range: Vec<Transaction>,
    pub by_merchant: Vec<Transaction>,
    pub average_amount: f64,
    pub by_amount_range: Vec<Transaction>,
    pub total_debit_amount: f64,
    pub month_with_most_transactions: Option<u32>,
    pub month_with_most_debit_transactions: Option<u32>,
    pub dominant_transaction_type: DominantType,
    pub before: Vec<Transaction>,
    pub by_id: Option<Transaction>,
    pub descriptions: Vec<String>,
}

impl AnalysisReport {
    pub fn build(analyzer: &TransactionAnalyzer, config: &ReportConfig) -> Self {
        AnalysisReport {
            config: config.clone(),
            all_transactions: analyzer.all_transactions().to_vec(),
            unique_types: owned_strs(analyzer.unique_types()),
            total_amount: analyzer.total_amount(),
            total_amount_on_date: analyzer.total_amount_on_date(config.on_date),
            by_type: owned(analyzer.by_type(&config.transaction_type)),
            in_date_range: owned(analyzer.in_date_range(config.range_start, config.range_end)),
            by_merchant: owned(analyzer.by_merchant(&config.merchant)),
            average_amount: analyzer.average_amount(),
            by_amount_range: owned(analyzer.by_amount_range(config.min_amount, config.max_amount)),
            total_debit_amount: analyzer.total_debit_amount(),
            month_with_most_transactions: analyzer.month_with_most_transactions(),
            month_with_most_debit_transactions: analyzer.month_with_most_debit_transactions(),
            dominant_transaction_type: analyzer.dominant_transaction_type(),
            before: owned(analyzer.before(config.before)),
            by_id: analyzer.find_by_id(&config.id).cloned(),
            descriptions: owned_strs(analyzer.descriptions()),
        }
    }
}

fn owned(transactions: Vec<&Transaction>) -> Vec<Transaction> {
    transactions.into_iter().cloned().collect()
}

fn owned_strs(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

// ============================================================================
// TEXT RENDERING
// ============================================================================

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, transactions: &[Transaction]) -> fmt::Result {
    writeln!(f, "{} ({})", label, transactions.len())?;
    for tx in transactions {
        writeln!(f, "  {}", TransactionLine(tx))?;
    }
    Ok(())
}

fn write_month(f: &mut fmt::Formatter<'_>, label: &str, month: Option<u32>) -> fmt::Result {
    match month {
        Some(m) => writeln!(f, "{} {}", label, m),
        None => writeln!(f, "{} none", label),
    }
}

fn describe_filter(filter: &DateFilter) -> String {
    let part = |v: Option<String>| v.unwrap_or_else(|| "*".to_string());
    format!(
        "{}-{}-{}",
        part(filter.year.map(|y| y.to_string())),
        part(filter.month.map(|m| format!("{:02}", m))),
        part(filter.day.map(|d| format!("{:02}", d))),
    )
}

/// One record on one line
pub struct TransactionLine<'a>(pub &'a Transaction);

impl fmt::Display for TransactionLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = self.0;
        write!(
            f,
            "#{:<6} {:<19} {:<8} {:>12.2}  {:<20} {}",
            tx.id.to_string(),
            tx.date.to_string(),
            tx.transaction_type,
            tx.amount,
            tx.merchant,
            tx.description
        )
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.config;

        write_list(f, "All Transactions:", &self.all_transactions)?;
        writeln!(f, "Unique Transaction Types: {}", self.unique_types.join(", "))?;
        writeln!(f, "Total Amount: {:.2}", self.total_amount)?;
        writeln!(
            f,
            "Total Amount On Date ({}): {:.2}",
            describe_filter(&c.on_date),
            self.total_amount_on_date
        )?;
        write_list(f, &format!("Transactions By Type ({}):", c.transaction_type), &self.by_type)?;
        write_list(
            f,
            &format!("Transactions In Date Range ({} .. {}):", c.range_start, c.range_end),
            &self.in_date_range,
        )?;
        write_list(f, &format!("Transactions By Merchant ({}):", c.merchant), &self.by_merchant)?;
        writeln!(f, "Average Transaction Amount: {:.2}", self.average_amount)?;
        write_list(
            f,
            &format!("Transactions By Amount Range ({}-{}):", c.min_amount, c.max_amount),
            &self.by_amount_range,
        )?;
        writeln!(f, "Total Debit Amount: {:.2}", self.total_debit_amount)?;
        write_month(f, "Month With Most Transactions:", self.month_with_most_transactions)?;
        write_month(
            f,
            "Month With Most Debit Transactions:",
            self.month_with_most_debit_transactions,
        )?;
        writeln!(f, "Most Transaction Types: {}", self.dominant_transaction_type)?;
        write_list(f, &format!("Transactions Before Date ({}):", c.before), &self.before)?;
        match &self.by_id {
            Some(tx) => writeln!(f, "Transaction By ID ({}): {}", c.id, TransactionLine(tx))?,
            None => writeln!(f, "Transaction By ID ({}): not found", c.id)?,
        }
        writeln!(f, "Transaction Descriptions:")?;
        for description in &self.descriptions {
            writeln!(f, "  {}", description)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_transaction(id: &str, tx_type: &str, amount: f64, on: &str, merchant: &str) -> Transaction {
        Transaction::new(id, tx_type, amount, on.parse().unwrap())
            .with_merchant(merchant)
            .with_description(format!("{} {}", merchant, id))
    }

    fn analyzer() -> TransactionAnalyzer {
        TransactionAnalyzer::new(vec![
            create_test_transaction("1", "debit", 100.0, "2019-01-01", "SuperMart"),
            create_test_transaction("2", "credit", 75.5, "2019-01-05", "OnlineShop"),
            create_test_transaction("3", "debit", 60.0, "2019-07-10", "OnlineShop"),
            create_test_transaction("4", "debit", 10.0, "2009-12-31", "Cafe"),
        ])
    }

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.range_start.to_string(), "2010-01-01");
        assert_eq!(config.range_end.to_string(), "2023-12-31");
        assert_eq!(config.before.to_string(), "2019-06-01");
        assert_eq!(config.merchant, "OnlineShop");
        assert_eq!(config.on_date, DateFilter::any());
    }

    #[test]
    fn test_config_partial_json_keeps_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"merchant": "Cafe", "on_date": {"year": 2019}}"#).unwrap();

        assert_eq!(config.merchant, "Cafe");
        assert_eq!(config.on_date.year, Some(2019));
        assert_eq!(config.on_date.month, None);
        assert_eq!(config.min_amount, 50.0);
    }

    #[test]
    fn test_build_with_default_config() {
        let report = AnalysisReport::build(&analyzer(), &ReportConfig::default());

        assert_eq!(report.all_transactions.len(), 4);
        assert_eq!(report.unique_types, vec!["debit", "credit"]);
        assert_eq!(report.total_amount, 245.5);
        assert_eq!(report.by_type.len(), 3);
        // 2009-12-31 falls outside 2010..2023
        assert_eq!(report.in_date_range.len(), 3);
        assert_eq!(report.by_merchant.len(), 2);
        // 100.0 is inside the inclusive 50-100 band
        assert_eq!(report.by_amount_range.len(), 3);
        assert_eq!(report.total_debit_amount, 170.0);
        assert_eq!(report.month_with_most_transactions, Some(1));
        assert_eq!(report.month_with_most_debit_transactions, Some(1));
        assert_eq!(report.dominant_transaction_type, DominantType::Debit);
        assert_eq!(report.before.len(), 3);
        assert_eq!(report.by_id.as_ref().map(|t| t.merchant.as_str()), Some("SuperMart"));
        assert_eq!(report.descriptions[1], "OnlineShop 2");
    }

    #[test]
    fn test_display_contains_every_section() {
        let report = AnalysisReport::build(&analyzer(), &ReportConfig::default());
        let text = report.to_string();

        for label in [
            "All Transactions: (4)",
            "Unique Transaction Types: debit, credit",
            "Total Amount: 245.50",
            "Total Amount On Date (*-*-*): 245.50",
            "Transactions By Type (debit): (3)",
            "Transactions By Merchant (OnlineShop): (2)",
            "Average Transaction Amount: ",
            "Total Debit Amount: 170.00",
            "Month With Most Transactions: 1",
            "Most Transaction Types: debit",
            "Transactions Before Date (2019-06-01): (3)",
            "Transaction By ID (1): #1",
            "Transaction Descriptions:",
        ] {
            assert!(text.contains(label), "missing '{}' in:\n{}", label, text);
        }
    }

    #[test]
    fn test_display_on_empty_analyzer() {
        let report = AnalysisReport::build(&TransactionAnalyzer::default(), &ReportConfig::default());
        let text = report.to_string();

        assert!(text.contains("Month With Most Transactions: none"));
        assert!(text.contains("Transaction By ID (1): not found"));
        assert!(text.contains("Most Transaction Types: equal"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = AnalysisReport::build(&analyzer(), &ReportConfig::default());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["dominant_transaction_type"], "debit");
        assert_eq!(value["month_with_most_transactions"], 1);
        assert_eq!(value["by_id"]["merchant_name"], "SuperMart");
        assert_eq!(value["config"]["range_start"], "2010-01-01");
    }
}
