// Personal Finance Dashboard - Terminal Report
// Loads the operations ledger and prints the metric summary to the console

use anyhow::Result;
use std::env;
use std::path::Path;

use finance_dashboard::{
    available_months, compute_metrics, consumption_breakdown, filter_by_months,
    historical_savings, load_transactions,
};

/// Default ledger filename, next to the working directory like the exported
/// file the bank produces
const DEFAULT_LEDGER: &str = "registro_operaciones_personales.csv";

/// How many recent months the summary covers by default
const DEFAULT_MONTH_COUNT: usize = 3;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let ledger_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_LEDGER);

    run_report(Path::new(ledger_path))
}

fn run_report(ledger_path: &Path) -> Result<()> {
    println!("💸 Personal Finance Dashboard - Ledger Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading ledger: {}", ledger_path.display());
    let transactions = load_transactions(ledger_path)?;
    println!("✓ Loaded {} transactions", transactions.len());

    let months = available_months(&transactions);
    println!("✓ Months on record: {}", months.len());

    let unknown_amounts = transactions.iter().filter(|tx| tx.amount.is_none()).count();
    if unknown_amounts > 0 {
        println!("⚠ {} rows with unreadable amounts (counted as zero)", unknown_amounts);
    }

    // Recent period: same default the dashboard page uses
    let selected: Vec<String> = months.iter().take(DEFAULT_MONTH_COUNT).cloned().collect();
    let filtered = filter_by_months(&transactions, &selected);
    let metrics = compute_metrics(&filtered);

    println!("\n📊 Last {} month(s): {}", selected.len(), selected.join(", "));
    println!("   Ingresos Totales:    {:>12.2} €", metrics.income);
    println!("   Gastos de Consumo:   {:>12.2} €", metrics.consumption);
    println!("   Ahorros Destinados:  {:>12.2} €", metrics.savings);
    println!("   Balance Neto:        {:>12.2} €", metrics.net);

    println!("\n🏦 Ahorro Histórico:    {:>12.2} €", historical_savings(&transactions));

    let breakdown = consumption_breakdown(&filtered);
    if breakdown.is_empty() {
        println!("\n🍩 No consumption data in the selected months");
    } else {
        println!("\n🍩 Consumption by sub-category:");
        for slice in &breakdown {
            println!("   {:<20} {:>12.2} €", slice.sub_category, slice.total);
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Report complete");

    Ok(())
}
