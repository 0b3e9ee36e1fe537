// 🌐 REST API - axum router over a SharedAnalyzer
// Reads take the read lock, POST /transactions takes the write lock

use crate::analyzer::{DateFilter, DominantType};
use crate::error::DateParseError;
use crate::report::{AnalysisReport, ReportConfig};
use crate::shared::SharedAnalyzer;
use crate::transaction::{RawTransaction, Transaction, TransactionDate, TransactionId};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

// ============================================================================
// RESPONSES
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

fn ok_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

#[derive(Serialize)]
struct StatsResponse {
    total_transactions: usize,
    total_amount: f64,
    total_income: f64,
    total_expenses: f64,
    average_amount: f64,
    total_debit_amount: f64,
    month_with_most_transactions: Option<u32>,
    month_with_most_debit_transactions: Option<u32>,
    dominant_transaction_type: DominantType,
}

#[derive(Serialize)]
struct DateTotalResponse {
    filter: DateFilter,
    total: f64,
}

#[derive(Deserialize)]
struct DateRangeParams {
    start: String,
    end: String,
}

#[derive(Deserialize)]
struct AmountRangeParams {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct BeforeParams {
    date: String,
}

fn cloned(transactions: Vec<&Transaction>) -> Vec<Transaction> {
    transactions.into_iter().cloned().collect()
}

fn parse_date(text: &str) -> Result<TransactionDate, Response> {
    text.parse()
        .map_err(|e: DateParseError| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/transactions - Get all transactions
async fn list_transactions(State(shared): State<SharedAnalyzer>) -> Response {
    ok_response(shared.snapshot())
}

/// POST /api/transactions - Append one transaction
///
/// A body without `transaction_id` gets the next ledger id.
async fn create_transaction(
    State(shared): State<SharedAnalyzer>,
    Json(raw): Json<RawTransaction>,
) -> Response {
    let result = shared.append_with(|next_id| {
        let mut raw = raw;
        if raw.transaction_id.is_none() {
            raw.transaction_id = Some(next_id);
        }
        Transaction::try_from(raw)
    });

    match result {
        Ok(tx) => (StatusCode::CREATED, Json(ApiResponse::ok(tx))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, field = e.field(), "rejected transaction");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

/// GET /api/transactions/:id - First transaction with this id
///
/// Path segments carry no type, so a numeric id also matches its text form.
async fn get_transaction(State(shared): State<SharedAnalyzer>, Path(raw_id): Path<String>) -> Response {
    let parsed: TransactionId = match raw_id.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    };

    let found = shared.read(|a| {
        a.find_by_id(&parsed)
            .or_else(|| a.find_by_id(&TransactionId::Text(raw_id.clone())))
            .cloned()
    });

    match found {
        Some(tx) => ok_response(tx),
        None => error_response(StatusCode::NOT_FOUND, format!("transaction {} not found", raw_id)),
    }
}

/// GET /api/types - Distinct transaction types
async fn list_types(State(shared): State<SharedAnalyzer>) -> Response {
    let types: Vec<String> = shared.read(|a| a.unique_types().into_iter().map(String::from).collect());
    ok_response(types)
}

/// GET /api/types/:type - Transactions of one type
async fn transactions_by_type(
    State(shared): State<SharedAnalyzer>,
    Path(transaction_type): Path<String>,
) -> Response {
    ok_response(shared.read(|a| cloned(a.by_type(&transaction_type))))
}

/// GET /api/merchants/:name - Transactions of one merchant
async fn transactions_by_merchant(
    State(shared): State<SharedAnalyzer>,
    Path(merchant): Path<String>,
) -> Response {
    ok_response(shared.read(|a| cloned(a.by_merchant(&merchant))))
}

/// GET /api/descriptions
async fn list_descriptions(State(shared): State<SharedAnalyzer>) -> Response {
    let descriptions: Vec<String> =
        shared.read(|a| a.descriptions().into_iter().map(String::from).collect());
    ok_response(descriptions)
}

/// GET /api/range/dates?start=&end= - Inclusive date range
async fn transactions_in_date_range(
    State(shared): State<SharedAnalyzer>,
    Query(params): Query<DateRangeParams>,
) -> Response {
    let (start, end) = match (parse_date(&params.start), parse_date(&params.end)) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    ok_response(shared.read(|a| cloned(a.in_date_range(start, end))))
}

/// GET /api/range/amounts?min=&max= - Inclusive amount range
async fn transactions_by_amount_range(
    State(shared): State<SharedAnalyzer>,
    Query(params): Query<AmountRangeParams>,
) -> Response {
    ok_response(shared.read(|a| cloned(a.by_amount_range(params.min, params.max))))
}

/// GET /api/before?date= - Strictly earlier than date
async fn transactions_before(
    State(shared): State<SharedAnalyzer>,
    Query(params): Query<BeforeParams>,
) -> Response {
    match parse_date(&params.date) {
        Ok(date) => ok_response(shared.read(|a| cloned(a.before(date)))),
        Err(response) => response,
    }
}

/// GET /api/stats - Aggregates
async fn get_stats(State(shared): State<SharedAnalyzer>) -> Response {
    let stats = shared.read(|a| StatsResponse {
        total_transactions: a.len(),
        total_amount: a.total_amount(),
        total_income: a.total_income(),
        total_expenses: a.total_expenses(),
        average_amount: a.average_amount(),
        total_debit_amount: a.total_debit_amount(),
        month_with_most_transactions: a.month_with_most_transactions(),
        month_with_most_debit_transactions: a.month_with_most_debit_transactions(),
        dominant_transaction_type: a.dominant_transaction_type(),
    });
    ok_response(stats)
}

/// GET /api/totals/date?year=&month=&day= - Total on matching dates
async fn total_on_date(
    State(shared): State<SharedAnalyzer>,
    Query(filter): Query<DateFilter>,
) -> Response {
    let total = shared.read(|a| a.total_amount_on_date(filter));
    ok_response(DateTotalResponse { filter, total })
}

/// GET /api/report - Full report with default parameters
async fn get_report(State(shared): State<SharedAnalyzer>) -> Response {
    let config = ReportConfig::default();
    ok_response(shared.read(|a| AnalysisReport::build(a, &config)))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(shared: SharedAnalyzer) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/:id", get(get_transaction))
        .route("/types", get(list_types))
        .route("/types/:type", get(transactions_by_type))
        .route("/merchants/:name", get(transactions_by_merchant))
        .route("/descriptions", get(list_descriptions))
        .route("/range/dates", get(transactions_in_date_range))
        .route("/range/amounts", get(transactions_by_amount_range))
        .route("/before", get(transactions_before))
        .route("/stats", get(get_stats))
        .route("/totals/date", get(total_on_date))
        .route("/report", get(get_report))
        .with_state(shared);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
