//! Investment-sizing strategies.
//!
//! A closed set of variants behind one capability: given the ascending
//! history prefix ending at the current date, return today's investment
//! amount (0 means skip, never an error). Implementations rely only on
//! "last row = today, second-to-last = previous trading day".

pub mod benchmark;
pub mod fixed;
pub mod profit_ratio;
pub mod quadratic_ma;

use crate::domain::error::DcasimError;
use crate::domain::series::PricePoint;
use crate::ports::config_port::ConfigPort;
use chrono::{Datelike, NaiveDate};

pub use benchmark::{BenchmarkDropStrategy, BenchmarkType, DynamicBenchmarkDropStrategy};
pub use fixed::{FixedInvestment, Interval, IntervalFixedInvestment};
pub use profit_ratio::ProfitRatioStrategy;
pub use quadratic_ma::QuadraticMaStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_char(&self) -> char {
        match self {
            Frequency::Daily => 'D',
            Frequency::Weekly => 'W',
            Frequency::Monthly => 'M',
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(Frequency::Daily),
            "W" => Ok(Frequency::Weekly),
            "M" => Ok(Frequency::Monthly),
            other => Err(format!("unknown frequency '{other}' (expected D, W or M)")),
        }
    }
}

/// Whether today is an investment day for the given frequency.
///
/// The first row of history always invests; thereafter weekly invests when
/// the ISO week or year differs from the previous trading day, monthly when
/// the month or year differs.
pub fn should_invest(history: &[PricePoint], freq: Frequency) -> bool {
    let [.., prev, today] = history else {
        return !history.is_empty();
    };
    match freq {
        Frequency::Daily => true,
        Frequency::Weekly => {
            today.date.iso_week().week() != prev.date.iso_week().week()
                || today.date.year() != prev.date.year()
        }
        Frequency::Monthly => {
            today.date.month() != prev.date.month() || today.date.year() != prev.date.year()
        }
    }
}

/// The closed strategy set.
#[derive(Debug, Clone)]
pub enum Strategy {
    Fixed(FixedInvestment),
    Interval(IntervalFixedInvestment),
    ProfitRatio(ProfitRatioStrategy),
    BenchmarkDrop(BenchmarkDropStrategy),
    DynamicBenchmark(DynamicBenchmarkDropStrategy),
    QuadraticMa(QuadraticMaStrategy),
}

impl Strategy {
    /// Today's investment amount, always >= 0.
    pub fn investment_amount(&self, history: &[PricePoint], current_date: NaiveDate) -> f64 {
        match self {
            Strategy::Fixed(s) => s.investment_amount(history),
            Strategy::Interval(s) => s.investment_amount(history, current_date),
            Strategy::ProfitRatio(s) => s.investment_amount(history),
            Strategy::BenchmarkDrop(s) => s.investment_amount(history),
            Strategy::DynamicBenchmark(s) => s.investment_amount(history),
            Strategy::QuadraticMa(s) => s.investment_amount(history),
        }
    }

    /// Whether the variant reads the chip-distribution columns.
    pub fn requires_chip_data(&self) -> bool {
        matches!(self, Strategy::ProfitRatio(_))
    }
}

/// Build a strategy variant plus its display name from one config section.
///
/// The section's `type` key selects the variant; the remaining keys are the
/// variant's parameter record.
pub fn build_strategy(
    cfg: &dyn ConfigPort,
    section: &str,
) -> Result<(Strategy, String), DcasimError> {
    let kind = cfg
        .get_string(section, "type")
        .ok_or_else(|| DcasimError::ConfigMissing {
            section: section.to_string(),
            key: "type".to_string(),
        })?;

    match kind.trim() {
        "fixed" => {
            let amount = cfg.get_double(section, "amount", 100.0);
            let freq = parse_freq(cfg, section)?;
            let name = format!("Fixed_{}_{}", freq.as_char(), amount);
            Ok((Strategy::Fixed(FixedInvestment::new(amount, freq)), name))
        }
        "interval" => {
            let raw = cfg.get_string(section, "intervals").ok_or_else(|| {
                DcasimError::ConfigMissing {
                    section: section.to_string(),
                    key: "intervals".to_string(),
                }
            })?;
            let intervals = parse_intervals(&raw, section)?;
            Ok((
                Strategy::Interval(IntervalFixedInvestment::new(intervals)),
                "Interval_Custom".to_string(),
            ))
        }
        "profit_ratio" => {
            let base = cfg.get_double(section, "base_amount", 100.0);
            let thresholds = match cfg.get_string(section, "thresholds") {
                Some(raw) => Some(parse_thresholds(&raw, section)?),
                None => None,
            };
            Ok((
                Strategy::ProfitRatio(ProfitRatioStrategy::new(base, thresholds)),
                "Profit_Ratio_Dynamic".to_string(),
            ))
        }
        "benchmark_drop" => {
            let base = cfg.get_double(section, "base_amount", 100.0);
            let freq = parse_freq(cfg, section)?;
            let scale = cfg.get_double(section, "scale_factor", 1.0);
            let name = format!("BenchmarkDrop_{}_x{}", freq.as_char(), scale);
            Ok((
                Strategy::BenchmarkDrop(BenchmarkDropStrategy::new(base, freq, scale)),
                name,
            ))
        }
        "dynamic_benchmark" => {
            let base = cfg.get_double(section, "base_amount", 100.0);
            let freq = parse_freq(cfg, section)?;
            let bench_str = cfg
                .get_string(section, "benchmark")
                .unwrap_or_else(|| "ma250".to_string());
            let benchmark =
                bench_str
                    .parse::<BenchmarkType>()
                    .map_err(|reason| DcasimError::ConfigInvalid {
                        section: section.to_string(),
                        key: "benchmark".to_string(),
                        reason,
                    })?;
            let thresholds = match cfg.get_string(section, "thresholds") {
                Some(raw) => parse_thresholds(&raw, section)?,
                None => Vec::new(),
            };
            let name = format!("DynamicBenchmark_{}", benchmark.tag());
            Ok((
                Strategy::DynamicBenchmark(DynamicBenchmarkDropStrategy::new(
                    base, freq, benchmark, thresholds,
                )),
                name,
            ))
        }
        "quadratic_ma" => {
            let base = cfg.get_double(section, "base_amount", 100.0);
            let freq = parse_freq(cfg, section)?;
            let k = cfg.get_double(section, "k_factor", 30.0);
            let max = cfg.get_double(section, "max_multiplier", 5.0);
            let name = format!("QuadraticMA_K{}", k);
            Ok((
                Strategy::QuadraticMa(QuadraticMaStrategy::new(base, freq, k, max)),
                name,
            ))
        }
        other => Err(DcasimError::UnknownStrategy {
            kind: other.to_string(),
        }),
    }
}

fn parse_freq(cfg: &dyn ConfigPort, section: &str) -> Result<Frequency, DcasimError> {
    cfg.get_string(section, "freq")
        .unwrap_or_else(|| "D".to_string())
        .parse()
        .map_err(|reason| DcasimError::ConfigInvalid {
            section: section.to_string(),
            key: "freq".to_string(),
            reason,
        })
}

/// `limit:multiplier` pairs, comma separated, e.g. `0.01:10,0.05:2`.
fn parse_thresholds(raw: &str, section: &str) -> Result<Vec<(f64, f64)>, DcasimError> {
    let invalid = |reason: String| DcasimError::ConfigInvalid {
        section: section.to_string(),
        key: "thresholds".to_string(),
        reason,
    };
    let mut pairs = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (limit, mult) = item
            .split_once(':')
            .ok_or_else(|| invalid(format!("expected limit:multiplier, got '{item}'")))?;
        let limit: f64 = limit
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid limit '{limit}'")))?;
        let mult: f64 = mult
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid multiplier '{mult}'")))?;
        pairs.push((limit, mult));
    }
    Ok(pairs)
}

/// `start..end:amount:freq` items, comma separated, e.g.
/// `2020-01-01..2021-12-31:1000:M,2022-01-01..2023-12-31:2000:M`.
fn parse_intervals(raw: &str, section: &str) -> Result<Vec<Interval>, DcasimError> {
    let invalid = |reason: String| DcasimError::ConfigInvalid {
        section: section.to_string(),
        key: "intervals".to_string(),
        reason,
    };
    let mut intervals = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut fields = item.split(':');
        let range = fields.next().unwrap_or_default();
        let (start, end) = range
            .split_once("..")
            .ok_or_else(|| invalid(format!("expected start..end in '{item}'")))?;
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
            .map_err(|_| invalid(format!("invalid start date '{start}'")))?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
            .map_err(|_| invalid(format!("invalid end date '{end}'")))?;
        let amount: f64 = fields
            .next()
            .ok_or_else(|| invalid(format!("missing amount in '{item}'")))?
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid amount in '{item}'")))?;
        let freq: Frequency = fields
            .next()
            .unwrap_or("D")
            .parse()
            .map_err(|reason| invalid(reason))?;
        intervals.push(Interval {
            start,
            end,
            plan: FixedInvestment::new(amount, freq),
        });
    }
    Ok(intervals)
}
