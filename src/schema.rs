// 📐 Ledger Schema - Shared Contract
// Column names and category vocabulary of the operations ledger, defined once
// and consumed by both the loader and the metrics engine

use anyhow::{anyhow, Result};
use csv::StringRecord;

// ============================================================================
// SOURCE FILE LAYOUT
// ============================================================================

/// Field separator of the source file (not inferred, fixed by contract)
pub const FIELD_SEPARATOR: u8 = b';';

/// Column: transaction value date (day-first in the source encoding)
pub const COL_VALUE_DATE: &str = "value_date";

/// Column: signed monetary amount ("1.234,56" style in the raw text)
pub const COL_AMOUNT: &str = "amount";

/// Column: main category label (closed vocabulary below)
pub const COL_MAIN_CATEGORY: &str = "main_category";

/// Column: sub category label (Traspaso, Reintegro, ...)
pub const COL_SUB_CATEGORY: &str = "sub_category";

/// Column: free-text description, display only
pub const COL_DESCRIPTION: &str = "description";

/// All columns the loader requires. A header row missing any of these is a
/// structural defect of the source file, not a per-row condition.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_VALUE_DATE,
    COL_AMOUNT,
    COL_MAIN_CATEGORY,
    COL_SUB_CATEGORY,
    COL_DESCRIPTION,
];

// ============================================================================
// CATEGORY VOCABULARY
// ============================================================================

/// Main category: new money coming in (salary, sales, ...)
pub const CATEGORY_INCOME: &str = "INGRESO";

/// Main category: money actively set aside
pub const CATEGORY_SAVINGS: &str = "AHORRO";

/// Main categories counted as day-to-day cost of living.
/// Closed configuration constant; membership tests are exact and
/// case-sensitive.
pub const CONSUMPTION_CATEGORIES: [&str; 4] = ["FACTURA", "SUSCRIPCIONES", "GASTO", "DEUDAS"];

/// Sub category: transfer into the savings account
pub const SUB_TRANSFER: &str = "Traspaso";

/// Sub category: refund/reimbursement, excluded from income to avoid
/// double-counting money that already entered once
pub const SUB_REFUND: &str = "Reintegro";

/// Exact-match test against the consumption set
pub fn is_consumption_category(main_category: &str) -> bool {
    CONSUMPTION_CATEGORIES.contains(&main_category)
}

// ============================================================================
// HEADER RESOLUTION
// ============================================================================

/// Indexes of the required columns inside the source header row.
/// Resolved once per load; callers use field names from this module, never
/// duplicated string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndexes {
    pub value_date: usize,
    pub amount: usize,
    pub main_category: usize,
    pub sub_category: usize,
    pub description: usize,
}

impl ColumnIndexes {
    /// Resolve the required columns from a header record.
    ///
    /// Fails with the missing column name if the header does not carry the
    /// full required set (fatal load error, the whole load aborts).
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| anyhow!("Ledger is missing required column '{}'", name))
        };

        Ok(ColumnIndexes {
            value_date: find(COL_VALUE_DATE)?,
            amount: find(COL_AMOUNT)?,
            main_category: find(COL_MAIN_CATEGORY)?,
            sub_category: find(COL_SUB_CATEGORY)?,
            description: find(COL_DESCRIPTION)?,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
