// 📊 Transaction Analyzer - In-memory query engine
// Owns an ordered, append-only sequence of transactions.
// Every read either filters (insertion order preserved) or reduces to a scalar.

use crate::transaction::{Transaction, TransactionDate, TransactionId, CREDIT, DEBIT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ============================================================================
// DATE FILTER
// ============================================================================

/// Calendar components to match; `None` matches anything
///
/// A present component is always compared, so there is no "zero means unset"
/// ambiguity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    #[serde(default)]
    pub year: Option<i32>,
    /// 1-12
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
}

impl DateFilter {
    pub fn any() -> Self {
        DateFilter::default()
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn matches(&self, date: &TransactionDate) -> bool {
        self.year.map_or(true, |y| date.year() == y)
            && self.month.map_or(true, |m| date.month() == m)
            && self.day.map_or(true, |d| date.day() == d)
    }
}

// ============================================================================
// DOMINANT TYPE
// ============================================================================

/// Outcome of comparing debit and credit counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantType {
    Debit,
    Credit,
    Equal,
}

impl DominantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DominantType::Debit => DEBIT,
            DominantType::Credit => CREDIT,
            DominantType::Equal => "equal",
        }
    }
}

impl fmt::Display for DominantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TransactionAnalyzer {
    transactions: Vec<Transaction>,
}

impl TransactionAnalyzer {
    /// Take ownership of an initial sequence (may be empty)
    pub fn new(transactions: Vec<Transaction>) -> Self {
        TransactionAnalyzer { transactions }
    }

    /// Append one record at the end. No uniqueness check.
    pub fn append(&mut self, transaction: Transaction) {
        tracing::debug!(id = %transaction.id, "appending transaction");
        self.transactions.push(transaction);
    }

    /// Read-only view of every record, in insertion order
    ///
    /// Borrowing rules out `append` while the view is alive; take `.to_vec()`
    /// for an owned snapshot.
    pub fn all_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Next id in ledger numbering (count + 1)
    pub fn next_id(&self) -> TransactionId {
        TransactionId::Number(self.transactions.len() as i64 + 1)
    }

    // ========================================================================
    // AGGREGATIONS
    // ========================================================================

    /// Distinct `transaction_type` values, first-seen order
    pub fn unique_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.transactions
            .iter()
            .map(|t| t.transaction_type.as_str())
            .filter(|ty| seen.insert(*ty))
            .collect()
    }

    pub fn total_amount(&self) -> f64 {
        sum_amounts(self.transactions.iter())
    }

    pub fn total_amount_on_date(&self, filter: DateFilter) -> f64 {
        sum_amounts(self.transactions.iter().filter(|t| filter.matches(&t.date)))
    }

    /// `total_amount / count`, 0.0 for an empty sequence
    pub fn average_amount(&self) -> f64 {
        if self.transactions.is_empty() {
            return 0.0;
        }
        self.total_amount() / self.transactions.len() as f64
    }

    pub fn total_debit_amount(&self) -> f64 {
        sum_amounts(self.transactions.iter().filter(|t| t.is_debit()))
    }

    /// Sum of positive amounts
    pub fn total_income(&self) -> f64 {
        sum_amounts(self.transactions.iter().filter(|t| t.amount > 0.0))
    }

    /// Sum of negative amounts (a value <= 0)
    pub fn total_expenses(&self) -> f64 {
        sum_amounts(self.transactions.iter().filter(|t| t.amount < 0.0))
    }

    /// Month (1-12) with the most records; ties go to the lowest month
    pub fn month_with_most_transactions(&self) -> Option<u32> {
        busiest_month(self.transactions.iter())
    }

    /// Same as `month_with_most_transactions`, debits only
    pub fn month_with_most_debit_transactions(&self) -> Option<u32> {
        busiest_month(self.transactions.iter().filter(|t| t.is_debit()))
    }

    /// Compare debit vs credit counts; zero is a count like any other
    pub fn dominant_transaction_type(&self) -> DominantType {
        let debits = self.transactions.iter().filter(|t| t.is_debit()).count();
        let credits = self.transactions.iter().filter(|t| t.is_credit()).count();

        match debits.cmp(&credits) {
            std::cmp::Ordering::Greater => DominantType::Debit,
            std::cmp::Ordering::Less => DominantType::Credit,
            std::cmp::Ordering::Equal => DominantType::Equal,
        }
    }

    // ========================================================================
    // FILTERS (order preserving)
    // ========================================================================

    /// Exact, case-sensitive
    pub fn by_type(&self, transaction_type: &str) -> Vec<&Transaction> {
        self.select(|t| t.transaction_type == transaction_type)
    }

    /// Exact, case-sensitive
    pub fn by_merchant(&self, merchant: &str) -> Vec<&Transaction> {
        self.select(|t| t.merchant == merchant)
    }

    /// `start <= date <= end`
    pub fn in_date_range(&self, start: TransactionDate, end: TransactionDate) -> Vec<&Transaction> {
        self.select(|t| start <= t.date && t.date <= end)
    }

    /// `min <= amount <= max`
    pub fn by_amount_range(&self, min: f64, max: f64) -> Vec<&Transaction> {
        self.select(|t| min <= t.amount && t.amount <= max)
    }

    /// Strictly earlier than `date`
    pub fn before(&self, date: TransactionDate) -> Vec<&Transaction> {
        self.select(|t| t.date < date)
    }

    /// First record (insertion order) with this id
    pub fn find_by_id(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect()
    }

    fn select<F>(&self, predicate: F) -> Vec<&Transaction>
    where
        F: Fn(&Transaction) -> bool,
    {
        self.transactions.iter().filter(|t| predicate(t)).collect()
    }
}

impl FromIterator<Transaction> for TransactionAnalyzer {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        TransactionAnalyzer::new(iter.into_iter().collect())
    }
}

impl From<Vec<Transaction>> for TransactionAnalyzer {
    fn from(transactions: Vec<Transaction>) -> Self {
        TransactionAnalyzer::new(transactions)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn sum_amounts<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> f64 {
    transactions.map(|t| t.amount).sum()
}

fn busiest_month<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Option<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for tx in transactions {
        *counts.entry(tx.date.month()).or_insert(0) += 1;
    }

    // BTreeMap iterates months ascending; strict `>` keeps the first (lowest) on ties
    let mut best: Option<(u32, usize)> = None;
    for (month, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((month, count)),
        }
    }
    best.map(|(month, _)| month)
}

// ============================================================================
// TESTS
// ============================================================================
