//! Upstream market-data source port trait.

use crate::domain::series::{AssetType, ChipData, TimeSeries};
use chrono::NaiveDate;

/// Result of one asset-class probe: a standardized series plus the detected
/// type, or empty when the source had nothing for that class.
#[derive(Debug, Clone, Default)]
pub struct ProbeResult {
    pub series: TimeSeries,
    pub detected: Option<AssetType>,
}

impl ProbeResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn found(series: TimeSeries, detected: AssetType) -> Self {
        Self {
            series,
            detected: Some(detected),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Per-asset-class history probes plus the chip-distribution enrichment probe.
///
/// Implementations must convert their own transport and schema failures into
/// empty results rather than erroring, so the acquisition orchestrator can
/// fall through to the next asset class. Returned series are standardized:
/// canonical {date, open, close, high, low, volume} fields, and off-exchange
/// funds synthesized as degenerate OHLC around the net asset value.
pub trait MarketDataSource {
    fn fetch_index(&self, symbol: &str, start: NaiveDate, end: NaiveDate, adjust: &str)
        -> ProbeResult;

    fn fetch_stock(&self, symbol: &str, start: NaiveDate, end: NaiveDate, adjust: &str)
        -> ProbeResult;

    fn fetch_etf(&self, symbol: &str, start: NaiveDate, end: NaiveDate, adjust: &str)
        -> ProbeResult;

    fn fetch_otc_fund(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjust: &str,
    ) -> ProbeResult;

    /// Chip-distribution columns keyed by date. Applicable to stocks only;
    /// empty for anything else or on failure.
    fn fetch_chip_distribution(&self, symbol: &str, adjust: &str) -> Vec<(NaiveDate, ChipData)>;
}
