//! Sizing tiered on the day's chip-distribution profit ratio.

use crate::domain::series::PricePoint;

/// Scale the base amount when few current holders are in profit. Evaluated
/// every day, no frequency gate. Thresholds are `(ratio_limit, multiplier)`
/// pairs kept ascending by limit so the most extreme tier matches first.
#[derive(Debug, Clone)]
pub struct ProfitRatioStrategy {
    pub base_amount: f64,
    thresholds: Vec<(f64, f64)>,
}

impl ProfitRatioStrategy {
    /// `None` thresholds use the stock defaults: 10x under 1% in profit,
    /// 2x under 5%.
    pub fn new(base_amount: f64, thresholds: Option<Vec<(f64, f64)>>) -> Self {
        let mut thresholds =
            thresholds.unwrap_or_else(|| vec![(0.01, 10.0), (0.05, 2.0)]);
        thresholds.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            base_amount,
            thresholds,
        }
    }

    pub fn investment_amount(&self, history: &[PricePoint]) -> f64 {
        let Some(today) = history.last() else {
            return 0.0;
        };
        let Some(ratio) = today.chip.profit_ratio else {
            // Null or never-fetched ratio: fall back to the base amount.
            return self.base_amount;
        };
        let multiplier = self
            .thresholds
            .iter()
            .find(|(limit, _)| ratio < *limit)
            .map(|(_, mult)| *mult)
            .unwrap_or(1.0);
        self.base_amount * multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::ChipData;
    use chrono::NaiveDate;

    fn today_with_ratio(ratio: Option<f64>) -> Vec<PricePoint> {
        let mut p = PricePoint::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            10.0,
            10.0,
            10.0,
            10.0,
            1000.0,
        );
        p.chip = ChipData {
            profit_ratio: ratio,
            ..ChipData::default()
        };
        vec![p]
    }

    #[test]
    fn extreme_tier_matches_first() {
        let s = ProfitRatioStrategy::new(100.0, Some(vec![(0.01, 10.0), (0.05, 2.0)]));
        assert_eq!(s.investment_amount(&today_with_ratio(Some(0.005))), 1000.0);
    }

    #[test]
    fn middle_tier() {
        let s = ProfitRatioStrategy::new(100.0, Some(vec![(0.01, 10.0), (0.05, 2.0)]));
        assert_eq!(s.investment_amount(&today_with_ratio(Some(0.03))), 200.0);
    }

    #[test]
    fn above_every_tier_uses_base() {
        let s = ProfitRatioStrategy::new(100.0, Some(vec![(0.01, 10.0), (0.05, 2.0)]));
        assert_eq!(s.investment_amount(&today_with_ratio(Some(0.5))), 100.0);
    }

    #[test]
    fn null_ratio_uses_base() {
        let s = ProfitRatioStrategy::new(100.0, None);
        assert_eq!(s.investment_amount(&today_with_ratio(None)), 100.0);
    }

    #[test]
    fn empty_history_skips() {
        let s = ProfitRatioStrategy::new(100.0, None);
        assert_eq!(s.investment_amount(&[]), 0.0);
    }

    #[test]
    fn constructor_sorts_thresholds_ascending() {
        let s = ProfitRatioStrategy::new(100.0, Some(vec![(0.05, 2.0), (0.01, 10.0)]));
        assert_eq!(s.investment_amount(&today_with_ratio(Some(0.005))), 1000.0);
    }
}
