//! Daily price series representation.

use chrono::NaiveDate;

/// Asset classes the acquisition layer can detect, in probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Index,
    Stock,
    Etf,
    OtcFund,
}

impl AssetType {
    pub fn tag(&self) -> &'static str {
        match self {
            AssetType::Index => "index",
            AssetType::Stock => "stock",
            AssetType::Etf => "etf",
            AssetType::OtcFund => "otc_fund",
        }
    }
}

/// Chip-distribution enrichment columns, each independently nullable.
///
/// These are derived cost-basis statistics (profit ratio, average cost,
/// cost bands) that only exist for stocks; every other asset class carries
/// all-null chip data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChipData {
    pub profit_ratio: Option<f64>,
    pub avg_cost: Option<f64>,
    pub cost90_low: Option<f64>,
    pub cost90_high: Option<f64>,
    pub concentration90: Option<f64>,
    pub cost70_low: Option<f64>,
    pub cost70_high: Option<f64>,
    pub concentration70: Option<f64>,
}

impl ChipData {
    pub fn is_empty(&self) -> bool {
        self.profit_ratio.is_none()
            && self.avg_cost.is_none()
            && self.cost90_low.is_none()
            && self.cost90_high.is_none()
            && self.concentration90.is_none()
            && self.cost70_low.is_none()
            && self.cost70_high.is_none()
            && self.concentration70.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub chip: ChipData,
}

impl PricePoint {
    /// A bar with a full OHLCV range and no enrichment data.
    pub fn new(date: NaiveDate, open: f64, close: f64, high: f64, low: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            close,
            high,
            low,
            volume,
            chip: ChipData::default(),
        }
    }

    /// Degenerate bar for assets quoted once daily by net asset value:
    /// open = high = low = close = NAV, volume = 0.
    pub fn from_nav(date: NaiveDate, nav: f64) -> Self {
        Self::new(date, nav, nav, nav, nav, 0.0)
    }
}

/// An ordered daily series. Invariant: dates strictly increasing, unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub points: Vec<PricePoint>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Sorts by date and drops duplicate dates, keeping the later entry.
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Inclusive calendar-range view.
    pub fn slice_range(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        TimeSeries {
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .cloned()
                .collect(),
        }
    }
}
