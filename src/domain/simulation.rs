//! Day-by-day simulation driver producing a ledger.

use crate::domain::series::TimeSeries;
use crate::domain::strategy::Strategy;
use chrono::NaiveDate;

/// Engine lifecycle. The state enters `Running` on the first row and
/// `Settled` after the last; a run that never starts yields no ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimState {
    NotStarted,
    Running,
    Settled,
}

/// One daily ledger record. `total_invested` and `total_shares` are
/// non-decreasing across the run; `return_rate` is exactly 0 while nothing
/// has been invested. The chip passthrough columns mirror the source row.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub total_invested: f64,
    pub total_shares: f64,
    pub final_value: f64,
    pub profit: f64,
    pub return_rate: f64,
    pub profit_ratio: Option<f64>,
    pub avg_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationLedger {
    pub records: Vec<DailyRecord>,
}

impl SimulationLedger {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DailyRecord> {
        self.records.last()
    }
}

/// Parse simulation bounds. Malformed dates are a "no result", not an error,
/// so batch runs over many symbols survive one bad input.
pub fn parse_range(start: &str, end: &str) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
    Some((start, end))
}

/// Walk the series restricted to `[start, end]`, asking the strategy for an
/// amount each day and buying at close. Empty input or an empty post-filter
/// window yields `None`, never an empty settled ledger.
pub fn run_simulation(
    series: &TimeSeries,
    start: NaiveDate,
    end: NaiveDate,
    strategy: &Strategy,
    strategy_name: &str,
) -> Option<SimulationLedger> {
    if series.is_empty() {
        eprintln!("No data provided for backtest ({strategy_name})");
        return None;
    }

    let window = series.slice_range(start, end);
    let mut state = SimState::NotStarted;
    let mut total_invested = 0.0_f64;
    let mut total_shares = 0.0_f64;
    let mut records = Vec::with_capacity(window.len());

    for i in 0..window.points.len() {
        if state == SimState::NotStarted {
            state = SimState::Running;
        }
        let history = &window.points[..=i];
        let today = &window.points[i];

        let amount = strategy.investment_amount(history, today.date);
        if amount > 0.0 {
            total_shares += amount / today.close;
            total_invested += amount;
        }

        let current_value = total_shares * today.close;
        let profit = current_value - total_invested;
        let return_rate = if total_invested > 0.0 {
            profit / total_invested * 100.0
        } else {
            0.0
        };

        records.push(DailyRecord {
            date: today.date,
            total_invested,
            total_shares,
            final_value: current_value,
            profit,
            return_rate,
            profit_ratio: today.chip.profit_ratio,
            avg_cost: today.chip.avg_cost,
        });
    }
    if state == SimState::Running {
        state = SimState::Settled;
    }

    match state {
        SimState::Settled => Some(SimulationLedger { records }),
        _ => {
            eprintln!("No data in range {start} to {end} ({strategy_name})");
            None
        }
    }
}
