// 📂 Ledger Loader - CSV → Transactions
// Reads the raw operations ledger, repairs the locale-specific number
// formatting, parses day-first dates and derives the year-month bucket

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::schema::{ColumnIndexes, FIELD_SEPARATOR};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One cleaned row of the operations ledger.
///
/// Immutable after load: filtering produces derived views, never mutates the
/// loaded set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Parsed calendar date (source encodes it day-first)
    pub value_date: NaiveDate,

    /// Original amount text as it appeared in the file, kept for display
    pub amount_raw: String,

    /// Cleaned signed amount. None = the raw text did not survive cleanup;
    /// such rows are retained and contribute zero to every sum.
    pub amount: Option<f64>,

    /// Main category label (INGRESO, GASTO, AHORRO, ...)
    pub main_category: String,

    /// Sub category label (Traspaso, Reintegro, Nómina, ...)
    pub sub_category: String,

    /// Free text, display only
    pub description: String,

    /// Year-month bucket derived from value_date, zero-padded "YYYY-MM".
    /// Pure function of the date: equal dates always share a bucket.
    pub period_key: String,
}

// ============================================================================
// FIELD CLEANUP
// ============================================================================

/// Clean a raw amount field: drop thousands dots, turn the decimal comma
/// into a point, then parse.
///
/// "1.234,56" → Some(1234.56), "56,00" → Some(56.0), "abc" → None.
/// None is the explicit unknown marker, not an error.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace('.', "").replace(',', ".");

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a value date under day-first interpretation: "01/02/2024" is the
/// 1st of February. The dash-separated variant is accepted too.
pub fn parse_value_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();

    for fmt in ["%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }

    Err(anyhow!("Unparseable value date '{}'", trimmed))
}

/// Year-month bucket of a date, zero-padded "YYYY-MM"
pub fn period_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ============================================================================
// LATIN1 DECODING
// ============================================================================

/// Decode latin1 bytes to a String. Every latin1 byte maps 1:1 to the
/// Unicode code point of the same value, so this never fails.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

// ============================================================================
// LOADER
// ============================================================================

/// Load the full transaction set from a `;`-separated, latin1-encoded ledger.
///
/// Pure read: no side effects beyond the returned rows, so callers may cache
/// the result safely. Fatal conditions (unreadable file, missing required
/// column, malformed date) abort the whole load; a malformed amount is
/// per-row and becomes an explicit unknown instead.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read ledger file: {}", path.display()))?;

    parse_ledger(&bytes).with_context(|| format!("Failed to load ledger: {}", path.display()))
}

/// Parse raw ledger bytes. Split from `load_transactions` so the cache can
/// hash the same bytes it parsed.
pub fn parse_ledger(bytes: &[u8]) -> Result<Vec<Transaction>> {
    let text = decode_latin1(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_SEPARATOR)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Ledger header row is unreadable")?;
    let cols = ColumnIndexes::resolve(headers)?;

    let mut transactions = Vec::new();

    for (line_num, result) in reader.records().enumerate() {
        // +2: 1-indexed plus the header row
        let row = line_num + 2;
        let record = result.with_context(|| format!("Malformed CSV record at line {}", row))?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let date_raw = field(cols.value_date);
        let value_date = parse_value_date(&date_raw)
            .with_context(|| format!("Invalid value_date at line {}", row))?;

        let amount_raw = field(cols.amount);
        let amount = parse_amount(&amount_raw);

        transactions.push(Transaction {
            period_key: period_key(value_date),
            value_date,
            amount,
            amount_raw,
            main_category: field(cols.main_category),
            sub_category: field(cols.sub_category),
            description: field(cols.description),
        });
    }

    Ok(transactions)
}

// ============================================================================
// TESTS
// ============================================================================
