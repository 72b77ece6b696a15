//! Fixed-amount periodic investment.

use super::{should_invest, Frequency};
use crate::domain::series::PricePoint;
use chrono::NaiveDate;

/// Invest a fixed amount on every investment day of the configured frequency.
#[derive(Debug, Clone)]
pub struct FixedInvestment {
    pub amount: f64,
    pub freq: Frequency,
}

impl FixedInvestment {
    pub fn new(amount: f64, freq: Frequency) -> Self {
        Self { amount, freq }
    }

    pub fn investment_amount(&self, history: &[PricePoint]) -> f64 {
        if should_invest(history, self.freq) {
            self.amount
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub plan: FixedInvestment,
}

/// Per-interval fixed investment. The first interval containing the current
/// date wins; outside every interval nothing is invested.
#[derive(Debug, Clone)]
pub struct IntervalFixedInvestment {
    intervals: Vec<Interval>,
}

impl IntervalFixedInvestment {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn investment_amount(&self, history: &[PricePoint], current_date: NaiveDate) -> f64 {
        for interval in &self.intervals {
            if interval.start <= current_date && current_date <= interval.end {
                return interval.plan.investment_amount(history);
            }
        }
        0.0
    }
}
