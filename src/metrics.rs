// 📊 Metrics Engine - Filter & Aggregate
// Pure summary queries over a transaction set: scoped period metrics,
// full-history savings and the consumption breakdown for the chart

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::loader::Transaction;
use crate::schema::{
    is_consumption_category, CATEGORY_INCOME, CATEGORY_SAVINGS, SUB_REFUND, SUB_TRANSFER,
};

// ============================================================================
// PERIOD METRICS
// ============================================================================

/// The four scoped aggregates computed over a (possibly filtered) set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    /// New money in: INGRESO rows, refunds excluded
    pub income: f64,

    /// Cost of living: FACTURA + SUSCRIPCIONES + GASTO + DEUDAS
    pub consumption: f64,

    /// Money actively set aside: AHORRO/Traspaso rows
    pub savings: f64,

    /// income − consumption − savings. Savings is subtracted because the
    /// money left the disposable balance even though it wasn't spent.
    pub net: f64,
}

/// Unknown amounts contribute zero to every sum instead of poisoning the
/// aggregate. This is the single place that rule lives.
fn amount_or_zero(tx: &Transaction) -> f64 {
    tx.amount.unwrap_or(0.0)
}

/// Compute the four scoped metrics over the given set.
///
/// Single linear pass with predicate filters; empty input yields all zeros.
/// Category tests are exact, case-sensitive matches against the schema
/// vocabulary.
pub fn compute_metrics(transactions: &[Transaction]) -> PeriodMetrics {
    let mut income = 0.0;
    let mut consumption = 0.0;
    let mut savings = 0.0;

    for tx in transactions {
        if tx.main_category == CATEGORY_INCOME && tx.sub_category != SUB_REFUND {
            income += amount_or_zero(tx);
        }

        if is_consumption_category(&tx.main_category) {
            consumption += amount_or_zero(tx);
        }

        if tx.main_category == CATEGORY_SAVINGS && tx.sub_category == SUB_TRANSFER {
            savings += amount_or_zero(tx);
        }
    }

    PeriodMetrics {
        income,
        consumption,
        savings,
        net: income - consumption - savings,
    }
}

/// Savings accumulated over the entire unfiltered set, regardless of any
/// active month filter. Same predicate as the period-scoped savings.
pub fn historical_savings(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.main_category == CATEGORY_SAVINGS && tx.sub_category == SUB_TRANSFER)
        .map(amount_or_zero)
        .sum()
}

// ============================================================================
// CHART & FILTER QUERIES
// ============================================================================

/// One slice of the consumption donut chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownSlice {
    pub sub_category: String,
    pub total: f64,
}

/// Consumption amounts grouped by sub-category, largest absolute total
/// first. Empty when the filtered set holds no consumption rows; the page
/// degrades to a "no data" notice instead of an empty chart.
pub fn consumption_breakdown(transactions: &[Transaction]) -> Vec<BreakdownSlice> {
    let mut by_sub: HashMap<String, f64> = HashMap::new();

    for tx in transactions {
        if is_consumption_category(&tx.main_category) {
            *by_sub.entry(tx.sub_category.clone()).or_insert(0.0) += amount_or_zero(tx);
        }
    }

    let mut slices: Vec<BreakdownSlice> = by_sub
        .into_iter()
        .map(|(sub_category, total)| BreakdownSlice {
            sub_category,
            total,
        })
        .collect();

    slices.sort_by(|a, b| {
        b.total
            .abs()
            .partial_cmp(&a.total.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.sub_category.cmp(&b.sub_category))
    });

    slices
}

/// Derived view of the rows whose period key is in the selected set.
/// Never mutates the input; an empty selection selects nothing.
pub fn filter_by_months(transactions: &[Transaction], months: &[String]) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| months.iter().any(|m| *m == tx.period_key))
        .cloned()
        .collect()
}

/// All period keys present in the set, unique and sorted descending
/// (most recent first, the order the month picker shows them).
pub fn available_months(transactions: &[Transaction]) -> Vec<String> {
    let mut months: Vec<String> = transactions.iter().map(|tx| tx.period_key.clone()).collect();
    months.sort();
    months.dedup();
    months.reverse();
    months
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(main: &str, sub: &str, amount: Option<f64>, year: i32, month: u32) -> Transaction {
        let value_date = NaiveDate::from_ymd_opt(year, month, 15).unwrap();
        Transaction {
            value_date,
            amount_raw: amount.map(|v| v.to_string()).unwrap_or_default(),
            amount,
            main_category: main.to_string(),
            sub_category: sub.to_string(),
            description: format!("{} {}", main, sub),
            period_key: crate::loader::period_key(value_date),
        }
    }

    #[test]
    fn test_example_scenario() {
        let txs = vec![
            tx("INGRESO", "Nómina", Some(1000.0), 2024, 3),
            tx("GASTO", "Super", Some(200.0), 2024, 3),
            tx("AHORRO", "Traspaso", Some(100.0), 2024, 3),
            tx("INGRESO", "Reintegro", Some(50.0), 2024, 3),
        ];

        let m = compute_metrics(&txs);
        assert_eq!(m.income, 1000.0);
        assert_eq!(m.consumption, 200.0);
        assert_eq!(m.savings, 100.0);
        assert_eq!(m.net, 700.0);
    }

    #[test]
    fn test_empty_input_is_all_zeros() {
        let m = compute_metrics(&[]);
        assert_eq!(m.income, 0.0);
        assert_eq!(m.consumption, 0.0);
        assert_eq!(m.savings, 0.0);
        assert_eq!(m.net, 0.0);
        assert_eq!(historical_savings(&[]), 0.0);
    }

    #[test]
    fn test_net_identity() {
        let txs = vec![
            tx("INGRESO", "Ventas", Some(2500.0), 2024, 1),
            tx("FACTURA", "Luz", Some(80.0), 2024, 1),
            tx("SUSCRIPCIONES", "Streaming", Some(15.0), 2024, 1),
            tx("DEUDAS", "Hipoteca", Some(600.0), 2024, 1),
            tx("AHORRO", "Traspaso", Some(300.0), 2024, 1),
        ];

        let m = compute_metrics(&txs);
        assert_eq!(m.net, m.income - m.consumption - m.savings);
    }

    #[test]
    fn test_metrics_are_order_independent() {
        let mut txs = vec![
            tx("INGRESO", "Nómina", Some(1000.0), 2024, 3),
            tx("GASTO", "Super", Some(200.0), 2024, 3),
            tx("AHORRO", "Traspaso", Some(100.0), 2024, 3),
            tx("FACTURA", "Agua", Some(30.0), 2024, 2),
        ];

        let forward = compute_metrics(&txs);
        txs.reverse();
        let backward = compute_metrics(&txs);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_refund_excluded_from_income() {
        let txs = vec![
            tx("INGRESO", "Nómina", Some(1000.0), 2024, 3),
            tx("INGRESO", "Reintegro", Some(50.0), 2024, 3),
        ];

        assert_eq!(compute_metrics(&txs).income, 1000.0);
    }

    #[test]
    fn test_savings_requires_transfer_subcategory() {
        let txs = vec![
            tx("AHORRO", "Traspaso", Some(100.0), 2024, 3),
            tx("AHORRO", "Intereses", Some(5.0), 2024, 3),
        ];

        let m = compute_metrics(&txs);
        assert_eq!(m.savings, 100.0);
        assert_eq!(historical_savings(&txs), 100.0);
    }

    #[test]
    fn test_unknown_amount_contributes_zero() {
        let txs = vec![
            tx("GASTO", "Super", Some(200.0), 2024, 3),
            tx("GASTO", "Super", None, 2024, 3),
            tx("INGRESO", "Nómina", None, 2024, 3),
        ];

        let m = compute_metrics(&txs);
        assert_eq!(m.consumption, 200.0);
        assert_eq!(m.income, 0.0);
    }

    #[test]
    fn test_historical_covers_months_outside_filter() {
        let txs = vec![
            tx("AHORRO", "Traspaso", Some(100.0), 2024, 1),
            tx("AHORRO", "Traspaso", Some(150.0), 2024, 2),
            tx("AHORRO", "Traspaso", Some(200.0), 2024, 3),
        ];

        let filtered = filter_by_months(&txs, &["2024-03".to_string()]);
        let period = compute_metrics(&filtered).savings;
        let historical = historical_savings(&txs);

        assert_eq!(period, 200.0);
        assert_eq!(historical, 450.0);
        assert!(historical >= period);
    }

    #[test]
    fn test_filter_by_months() {
        let txs = vec![
            tx("GASTO", "Super", Some(10.0), 2024, 1),
            tx("GASTO", "Super", Some(20.0), 2024, 2),
            tx("GASTO", "Super", Some(30.0), 2024, 3),
        ];

        let months = vec!["2024-01".to_string(), "2024-03".to_string()];
        let filtered = filter_by_months(&txs, &months);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| months.contains(&t.period_key)));

        // Empty selection selects nothing
        assert!(filter_by_months(&txs, &[]).is_empty());
    }

    #[test]
    fn test_available_months_descending_unique() {
        let txs = vec![
            tx("GASTO", "Super", Some(10.0), 2024, 1),
            tx("GASTO", "Super", Some(20.0), 2024, 3),
            tx("GASTO", "Super", Some(30.0), 2024, 3),
            tx("GASTO", "Super", Some(40.0), 2023, 12),
        ];

        let months = available_months(&txs);
        assert_eq!(months, vec!["2024-03", "2024-01", "2023-12"]);
    }

    #[test]
    fn test_consumption_breakdown_grouped_and_sorted() {
        let txs = vec![
            tx("GASTO", "Super", Some(120.0), 2024, 3),
            tx("GASTO", "Super", Some(80.0), 2024, 3),
            tx("FACTURA", "Luz", Some(60.0), 2024, 3),
            tx("INGRESO", "Nómina", Some(1000.0), 2024, 3),
        ];

        let slices = consumption_breakdown(&txs);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].sub_category, "Super");
        assert_eq!(slices[0].total, 200.0);
        assert_eq!(slices[1].sub_category, "Luz");
        assert_eq!(slices[1].total, 60.0);
    }

    #[test]
    fn test_consumption_breakdown_empty_without_consumption_rows() {
        let txs = vec![tx("INGRESO", "Nómina", Some(1000.0), 2024, 3)];
        assert!(consumption_breakdown(&txs).is_empty());
    }
}
