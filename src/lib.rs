// Personal Finance Dashboard - Core Library
// Exposes the ledger schema, loader, metrics engine and snapshot cache for
// use in the CLI, the web server and tests

pub mod cache;
pub mod loader;
pub mod metrics;
pub mod schema;

// Re-export commonly used types
pub use cache::{LedgerCache, LedgerSnapshot};
pub use loader::{load_transactions, parse_amount, parse_value_date, period_key, Transaction};
pub use metrics::{
    available_months, compute_metrics, consumption_breakdown, filter_by_months,
    historical_savings, BreakdownSlice, PeriodMetrics,
};
pub use schema::{
    is_consumption_category, ColumnIndexes, CATEGORY_INCOME, CATEGORY_SAVINGS,
    CONSUMPTION_CATEGORIES, FIELD_SEPARATOR, REQUIRED_COLUMNS, SUB_REFUND, SUB_TRANSFER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
