//! Cross-strategy comparison and annualized-return math.

use crate::domain::simulation::SimulationLedger;
use chrono::NaiveDate;

/// Annualized return (CAGR, %) over `days` elapsed calendar days using
/// 365.25-day years. Defined only for positive invested/value and at least
/// ~0.01 years; everything else is exactly 0.
pub fn calc_annualized_return(total_invested: f64, final_value: f64, days: i64) -> f64 {
    if total_invested <= 0.0 || final_value <= 0.0 || days <= 0 {
        return 0.0;
    }
    let years = days as f64 / 365.25;
    if years < 0.01 {
        return 0.0;
    }
    ((final_value / total_invested).powf(1.0 / years) - 1.0) * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub strategy: String,
    pub total_invested: f64,
    pub final_value: f64,
    pub profit: f64,
    pub return_rate: f64,
    pub annualized: f64,
}

/// Fold each strategy's final ledger row into a comparison row, skipping
/// strategies with no result, sorted descending by return rate.
///
/// Annualization is anchored to the overall requested window's elapsed days,
/// not each ledger's own last date.
pub fn build_comparison(
    results: &[(String, Option<SimulationLedger>)],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<ComparisonRow> {
    let duration_days = (end - start).num_days();

    let mut rows = Vec::new();
    for (name, ledger) in results {
        let Some(last) = ledger.as_ref().and_then(|l| l.last()) else {
            continue;
        };
        let invested = last.total_invested;
        let value = last.final_value;
        let profit = value - invested;
        let (return_rate, annualized) = if invested > 0.0 {
            (
                profit / invested * 100.0,
                calc_annualized_return(invested, value, duration_days),
            )
        } else {
            (0.0, 0.0)
        };
        rows.push(ComparisonRow {
            strategy: name.clone(),
            total_invested: invested,
            final_value: value,
            profit,
            return_rate,
            annualized,
        });
    }

    rows.sort_by(|a, b| b.return_rate.total_cmp(&a.return_rate));
    rows
}

/// Fixed-width comparison table.
pub fn render_comparison(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<32} {:>14} {:>14} {:>14} {:>16} {:>14}\n",
        "Strategy", "Total Invested", "Final Value", "Profit", "Return Rate (%)", "Annualized (%)"
    ));
    out.push_str(&"-".repeat(108));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<32} {:>14.2} {:>14.2} {:>14.2} {:>16.2} {:>14.2}\n",
            row.strategy,
            row.total_invested,
            row.final_value,
            row.profit,
            row.return_rate,
            row.annualized
        ));
    }
    out
}
