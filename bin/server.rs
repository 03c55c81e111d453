// Personal Finance Dashboard - Web Server
// Serves the dashboard page and the JSON API the page renders from

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use finance_dashboard::{
    available_months, compute_metrics, consumption_breakdown, filter_by_months,
    historical_savings, BreakdownSlice, LedgerCache, LedgerSnapshot, Transaction,
};

/// Default ledger filename, matching the terminal report binary
const DEFAULT_LEDGER: &str = "registro_operaciones_personales.csv";

/// Shared application state
#[derive(Clone)]
struct AppState {
    cache: Arc<Mutex<LedgerCache>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Load failures surface whole: the page shows the failure notice
    /// instead of partial data
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

/// Month multi-select carried as a comma-separated query parameter.
/// Absent = no filter (full set); present but empty = nothing selected.
#[derive(Deserialize)]
struct MonthsQuery {
    months: Option<String>,
}

impl MonthsQuery {
    fn selection(&self) -> Option<Vec<String>> {
        self.months.as_ref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

/// Summary response: the four period cards, the historical card and the
/// donut chart input, computed per request over the cached snapshot
#[derive(Serialize)]
struct SummaryResponse {
    income: f64,
    consumption: f64,
    savings: f64,
    net: f64,
    historical_savings: f64,
    breakdown: Vec<BreakdownSlice>,
    transaction_count: usize,
}

/// Detail table row (fixed column order is a page concern)
#[derive(Serialize)]
struct TransactionResponse {
    value_date: String,
    main_category: String,
    sub_category: String,
    description: String,
    amount: Option<f64>,
    amount_raw: String,
    period_key: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            value_date: tx.value_date.format("%Y-%m-%d").to_string(),
            main_category: tx.main_category.clone(),
            sub_category: tx.sub_category.clone(),
            description: tx.description.clone(),
            amount: tx.amount,
            amount_raw: tx.amount_raw.clone(),
            period_key: tx.period_key.clone(),
        }
    }
}

#[derive(Serialize)]
struct ReloadResponse {
    transaction_count: usize,
    signature: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// Current snapshot, or the 500 response the page turns into a load-failure
/// notice
fn snapshot_or_error(state: &AppState) -> Result<LedgerSnapshot, axum::response::Response> {
    let mut cache = state.cache.lock().unwrap();

    cache.snapshot().map_err(|e| {
        eprintln!("Error loading ledger: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(format!("{:#}", e))),
        )
            .into_response()
    })
}

/// Apply the month selection; no parameter means the full set
fn select_rows(snapshot: &LedgerSnapshot, query: &MonthsQuery) -> Vec<Transaction> {
    match query.selection() {
        Some(months) => filter_by_months(&snapshot.transactions, &months),
        None => snapshot.transactions.as_ref().clone(),
    }
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/months - Available period keys, most recent first
async fn get_months(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = match snapshot_or_error(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let months = available_months(&snapshot.transactions);
    (StatusCode::OK, Json(ApiResponse::ok(months))).into_response()
}

/// GET /api/summary?months=2024-03,2024-02 - Cards and chart input
async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<MonthsQuery>,
) -> impl IntoResponse {
    let snapshot = match snapshot_or_error(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let selected = select_rows(&snapshot, &query);
    let metrics = compute_metrics(&selected);

    let summary = SummaryResponse {
        income: metrics.income,
        consumption: metrics.consumption,
        savings: metrics.savings,
        net: metrics.net,
        // Always over the full set, regardless of the active filter
        historical_savings: historical_savings(&snapshot.transactions),
        breakdown: consumption_breakdown(&selected),
        transaction_count: selected.len(),
    };

    (StatusCode::OK, Json(ApiResponse::ok(summary))).into_response()
}

/// GET /api/transactions?months=... - Detail table rows
async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<MonthsQuery>,
) -> impl IntoResponse {
    let snapshot = match snapshot_or_error(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let rows: Vec<TransactionResponse> = select_rows(&snapshot, &query)
        .iter()
        .map(TransactionResponse::from)
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response()
}

/// POST /api/reload - Drop the cached snapshot and load fresh
async fn reload_ledger(State(state): State<AppState>) -> impl IntoResponse {
    let result = {
        let mut cache = state.cache.lock().unwrap();
        cache.reload()
    };

    match result {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(ApiResponse::ok(ReloadResponse {
                transaction_count: snapshot.transactions.len(),
                signature: snapshot.signature,
            })),
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error reloading ledger: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("💸 Personal Finance Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let ledger_path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_LEDGER.to_string())
        .into();

    println!("📂 Ledger source: {}", ledger_path.display());

    let mut cache = LedgerCache::new(ledger_path);

    // Warm the cache once; a failing source still serves, the page shows
    // the load failure and the reload control is the retry path
    match cache.snapshot() {
        Ok(snapshot) => println!("✓ Loaded {} transactions", snapshot.transactions.len()),
        Err(e) => eprintln!("⚠ Ledger not loadable yet: {:#}", e),
    }

    let state = AppState {
        cache: Arc::new(Mutex::new(cache)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/months", get(get_months))
        .route("/summary", get(get_summary))
        .route("/transactions", get(get_transactions))
        .route("/reload", post(reload_ledger))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Dashboard running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/summary");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
