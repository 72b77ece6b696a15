//! Benchmark-relative drop sizing.

use super::{should_invest, Frequency};
use crate::domain::series::PricePoint;

/// Scale up against a fixed benchmark: the close of the first history row.
///
/// On investment days the amount is
/// `base * (1 + scale_factor * max(0, (benchmark - current) / benchmark))`.
#[derive(Debug, Clone)]
pub struct BenchmarkDropStrategy {
    pub base_amount: f64,
    pub freq: Frequency,
    pub scale_factor: f64,
}

impl BenchmarkDropStrategy {
    pub fn new(base_amount: f64, freq: Frequency, scale_factor: f64) -> Self {
        Self {
            base_amount,
            freq,
            scale_factor,
        }
    }

    pub fn investment_amount(&self, history: &[PricePoint]) -> f64 {
        if !should_invest(history, self.freq) {
            return 0.0;
        }
        let [first, .., today] = history else {
            // Single row: today is the benchmark, no drop yet.
            return self.base_amount;
        };
        let benchmark = first.close;
        let current = today.close;
        if current < benchmark {
            let drop_ratio = (benchmark - current) / benchmark;
            self.base_amount * (1.0 + self.scale_factor * drop_ratio)
        } else {
            self.base_amount
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkType {
    /// Trailing 250-sample mean of closes.
    Ma250,
    /// Maximum close over the trailing (at most) 60 samples.
    Max60,
}

impl BenchmarkType {
    pub fn tag(&self) -> &'static str {
        match self {
            BenchmarkType::Ma250 => "ma250",
            BenchmarkType::Max60 => "max60",
        }
    }
}

impl std::str::FromStr for BenchmarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ma250" => Ok(BenchmarkType::Ma250),
            "max60" => Ok(BenchmarkType::Max60),
            other => Err(format!(
                "unknown benchmark '{other}' (expected ma250 or max60)"
            )),
        }
    }
}

/// Tiered scale-up against a benchmark recomputed each investment day.
///
/// Thresholds are `(drop_ratio, multiplier)` pairs kept descending by drop
/// ratio; the first tier whose drop ratio is exceeded wins, else 1x. With
/// fewer than 250 samples the MA250 benchmark is undefined and the base
/// amount applies.
#[derive(Debug, Clone)]
pub struct DynamicBenchmarkDropStrategy {
    pub base_amount: f64,
    pub freq: Frequency,
    pub benchmark: BenchmarkType,
    thresholds: Vec<(f64, f64)>,
}

impl DynamicBenchmarkDropStrategy {
    pub fn new(
        base_amount: f64,
        freq: Frequency,
        benchmark: BenchmarkType,
        mut thresholds: Vec<(f64, f64)>,
    ) -> Self {
        thresholds.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self {
            base_amount,
            freq,
            benchmark,
            thresholds,
        }
    }

    pub fn investment_amount(&self, history: &[PricePoint]) -> f64 {
        if !should_invest(history, self.freq) {
            return 0.0;
        }
        let Some(benchmark) = self.benchmark_price(history) else {
            return self.base_amount;
        };
        let current = history[history.len() - 1].close;
        if current >= benchmark {
            return self.base_amount;
        }
        let drop_ratio = (benchmark - current) / benchmark;
        let multiplier = self
            .thresholds
            .iter()
            .find(|(limit, _)| drop_ratio > *limit)
            .map(|(_, mult)| *mult)
            .unwrap_or(1.0);
        self.base_amount * multiplier
    }

    fn benchmark_price(&self, history: &[PricePoint]) -> Option<f64> {
        match self.benchmark {
            BenchmarkType::Ma250 => {
                if history.len() < 250 {
                    return None;
                }
                let window = &history[history.len() - 250..];
                Some(window.iter().map(|p| p.close).sum::<f64>() / 250.0)
            }
            BenchmarkType::Max60 => {
                let window = &history[history.len().saturating_sub(60)..];
                window.iter().map(|p| p.close).fold(None, |acc, c| {
                    Some(acc.map_or(c, |m: f64| m.max(c)))
                })
            }
        }
    }
}
