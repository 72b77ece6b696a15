#![allow(dead_code)]

use chrono::NaiveDate;
use dcasim::domain::series::{AssetType, ChipData, PricePoint, TimeSeries};
use dcasim::ports::market_data::{MarketDataSource, ProbeResult};
use dcasim::ports::name_lookup::NameLookup;
use std::cell::RefCell;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_point(d: &str, close: f64) -> PricePoint {
    let close_date = parse_date(d);
    PricePoint::new(close_date, close, close, close, close, 1000.0)
}

pub fn make_series(bars: &[(&str, f64)]) -> TimeSeries {
    TimeSeries::from_points(bars.iter().map(|(d, c)| make_point(d, *c)).collect())
}

/// Consecutive business days starting at `start`, one bar per close.
pub fn business_series(start: &str, closes: &[f64]) -> TimeSeries {
    let mut points = Vec::new();
    let mut d = parse_date(start);
    for &c in closes {
        while matches!(d.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            d += chrono::Duration::days(1);
        }
        points.push(PricePoint::new(d, c, c, c, c, 1000.0));
        d += chrono::Duration::days(1);
    }
    TimeSeries::from_points(points)
}

use chrono::Datelike;

/// In-memory market data source recording every probe it receives.
pub struct MockMarketDataSource {
    pub index: HashMap<String, TimeSeries>,
    pub stock: HashMap<String, TimeSeries>,
    pub etf: HashMap<String, TimeSeries>,
    pub otc_fund: HashMap<String, TimeSeries>,
    pub chips: HashMap<String, Vec<(NaiveDate, ChipData)>>,
    pub calls: RefCell<Vec<String>>,
}

impl MockMarketDataSource {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            stock: HashMap::new(),
            etf: HashMap::new(),
            otc_fund: HashMap::new(),
            chips: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_index(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.index.insert(symbol.to_string(), series);
        self
    }

    pub fn with_stock(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.stock.insert(symbol.to_string(), series);
        self
    }

    pub fn with_etf(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.etf.insert(symbol.to_string(), series);
        self
    }

    pub fn with_otc_fund(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.otc_fund.insert(symbol.to_string(), series);
        self
    }

    pub fn with_chips(mut self, symbol: &str, chips: Vec<(NaiveDate, ChipData)>) -> Self {
        self.chips.insert(symbol.to_string(), chips);
        self
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn probe(
        &self,
        class: &str,
        asset_type: AssetType,
        data: &HashMap<String, TimeSeries>,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ProbeResult {
        self.calls
            .borrow_mut()
            .push(format!("{class}:{symbol}:{start}"));
        match data.get(symbol) {
            Some(series) => {
                let window = series.slice_range(start, end);
                if window.is_empty() {
                    ProbeResult::empty()
                } else {
                    ProbeResult::found(window, asset_type)
                }
            }
            None => ProbeResult::empty(),
        }
    }
}

impl MarketDataSource for MockMarketDataSource {
    fn fetch_index(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjust: &str,
    ) -> ProbeResult {
        self.probe("index", AssetType::Index, &self.index, symbol, start, end)
    }

    fn fetch_stock(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjust: &str,
    ) -> ProbeResult {
        self.probe("stock", AssetType::Stock, &self.stock, symbol, start, end)
    }

    fn fetch_etf(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjust: &str,
    ) -> ProbeResult {
        self.probe("etf", AssetType::Etf, &self.etf, symbol, start, end)
    }

    fn fetch_otc_fund(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjust: &str,
    ) -> ProbeResult {
        self.probe(
            "otc_fund",
            AssetType::OtcFund,
            &self.otc_fund,
            symbol,
            start,
            end,
        )
    }

    fn fetch_chip_distribution(&self, symbol: &str, _adjust: &str) -> Vec<(NaiveDate, ChipData)> {
        self.calls.borrow_mut().push(format!("chip:{symbol}"));
        self.chips.get(symbol).cloned().unwrap_or_default()
    }
}

pub struct MockNameLookup {
    pub index: HashMap<String, String>,
    pub stock: HashMap<String, String>,
    pub etf: HashMap<String, String>,
    pub otc_fund: HashMap<String, String>,
}

impl MockNameLookup {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            stock: HashMap::new(),
            etf: HashMap::new(),
            otc_fund: HashMap::new(),
        }
    }

    pub fn with_etf_name(mut self, symbol: &str, name: &str) -> Self {
        self.etf.insert(symbol.to_string(), name.to_string());
        self
    }

    pub fn with_stock_name(mut self, symbol: &str, name: &str) -> Self {
        self.stock.insert(symbol.to_string(), name.to_string());
        self
    }
}

impl NameLookup for MockNameLookup {
    fn index_name(&self, symbol: &str) -> Option<String> {
        self.index.get(symbol).cloned()
    }

    fn stock_name(&self, symbol: &str) -> Option<String> {
        self.stock.get(symbol).cloned()
    }

    fn etf_name(&self, symbol: &str) -> Option<String> {
        self.etf.get(symbol).cloned()
    }

    fn otc_fund_name(&self, symbol: &str) -> Option<String> {
        self.otc_fund.get(symbol).cloned()
    }
}
