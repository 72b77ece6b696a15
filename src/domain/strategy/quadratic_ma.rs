//! Quadratic moving-average deviation sizing.

use super::{should_invest, Frequency};
use crate::domain::series::PricePoint;

/// Size up quadratically in the deviation below MA250.
///
/// With the current close under the trailing 250-sample mean, the deviation
/// `D = (MA250 - current) / MA250` scales the amount by
/// `min(1 + k_factor * D^2, max_multiplier)`. Fewer than 250 samples, or a
/// close at or above the mean, invests the base amount.
#[derive(Debug, Clone)]
pub struct QuadraticMaStrategy {
    pub base_amount: f64,
    pub freq: Frequency,
    pub k_factor: f64,
    pub max_multiplier: f64,
}

impl QuadraticMaStrategy {
    pub fn new(base_amount: f64, freq: Frequency, k_factor: f64, max_multiplier: f64) -> Self {
        Self {
            base_amount,
            freq,
            k_factor,
            max_multiplier,
        }
    }

    pub fn investment_amount(&self, history: &[PricePoint]) -> f64 {
        if !should_invest(history, self.freq) {
            return 0.0;
        }
        if history.len() < 250 {
            return self.base_amount;
        }
        let window = &history[history.len() - 250..];
        let ma250 = window.iter().map(|p| p.close).sum::<f64>() / 250.0;
        let current = history[history.len() - 1].close;
        if current < ma250 {
            let d = (ma250 - current) / ma250;
            let multiplier = (1.0 + self.k_factor * d * d).min(self.max_multiplier);
            self.base_amount * multiplier
        } else {
            self.base_amount
        }
    }
}
