//! CSV directory market-data adapter.
//!
//! A file-backed [`MarketDataSource`] and [`NameLookup`] over a provider
//! export directory, used for offline runs and tests. Layout:
//!
//! ```text
//! {dir}/index/{symbol}_{adjust}.csv      date,open,close,high,low,volume
//! {dir}/stock/{symbol}_{adjust}.csv
//! {dir}/etf/{symbol}_{adjust}.csv
//! {dir}/otc_fund/{symbol}.csv            date,nav
//! {dir}/chip/{symbol}_{adjust}.csv       date + chip columns
//! {dir}/{class}_names.csv                symbol,name
//! ```
//!
//! Every read or parse failure is an empty result; the acquisition layer
//! falls through to the next asset class.

use crate::domain::series::{AssetType, ChipData, PricePoint, TimeSeries};
use crate::ports::market_data::{MarketDataSource, ProbeResult};
use crate::ports::name_lookup::NameLookup;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvSourceAdapter {
    base_dir: PathBuf,
}

impl CsvSourceAdapter {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn class_path(&self, class: &str, symbol: &str, adjust: &str) -> PathBuf {
        self.base_dir
            .join(class)
            .join(format!("{}_{}.csv", symbol, adjust))
    }

    fn probe_ohlcv(
        &self,
        class: &str,
        asset_type: AssetType,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjust: &str,
    ) -> ProbeResult {
        let path = self.class_path(class, symbol, adjust);
        let Ok(content) = fs::read_to_string(&path) else {
            return ProbeResult::empty();
        };
        match parse_ohlcv(&content, start, end) {
            Some(series) if !series.is_empty() => ProbeResult::found(series, asset_type),
            _ => ProbeResult::empty(),
        }
    }

    fn name_from_registry(&self, class: &str, symbol: &str) -> Option<String> {
        let path = self.base_dir.join(format!("{}_names.csv", class));
        let content = fs::read_to_string(path).ok()?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(content.as_bytes());
        for record in rdr.records().flatten() {
            if record.get(0) == Some(symbol) {
                return record.get(1).map(str::to_string);
            }
        }
        None
    }
}

fn parse_ohlcv(content: &str, start: NaiveDate, end: NaiveDate) -> Option<TimeSeries> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers().ok()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let date_idx = col("date")?;
    let open_idx = col("open")?;
    let close_idx = col("close")?;
    let high_idx = col("high")?;
    let low_idx = col("low")?;
    let volume_idx = col("volume")?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record.ok()?;
        let date = NaiveDate::parse_from_str(record.get(date_idx)?, "%Y-%m-%d").ok()?;
        if date < start || date > end {
            continue;
        }
        points.push(PricePoint::new(
            date,
            record.get(open_idx)?.parse().ok()?,
            record.get(close_idx)?.parse().ok()?,
            record.get(high_idx)?.parse().ok()?,
            record.get(low_idx)?.parse().ok()?,
            record.get(volume_idx)?.parse().ok()?,
        ));
    }
    Some(TimeSeries::from_points(points))
}

fn parse_nav(content: &str, start: NaiveDate, end: NaiveDate) -> Option<TimeSeries> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers().ok()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let date_idx = col("date")?;
    let nav_idx = col("nav")?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record.ok()?;
        let date = NaiveDate::parse_from_str(record.get(date_idx)?, "%Y-%m-%d").ok()?;
        if date < start || date > end {
            continue;
        }
        let nav: f64 = record.get(nav_idx)?.parse().ok()?;
        points.push(PricePoint::from_nav(date, nav));
    }
    Some(TimeSeries::from_points(points))
}

impl MarketDataSource for CsvSourceAdapter {
    fn fetch_index(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjust: &str,
    ) -> ProbeResult {
        self.probe_ohlcv("index", AssetType::Index, symbol, start, end, adjust)
    }

    fn fetch_stock(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjust: &str,
    ) -> ProbeResult {
        self.probe_ohlcv("stock", AssetType::Stock, symbol, start, end, adjust)
    }

    fn fetch_etf(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjust: &str,
    ) -> ProbeResult {
        self.probe_ohlcv("etf", AssetType::Etf, symbol, start, end, adjust)
    }

    fn fetch_otc_fund(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _adjust: &str,
    ) -> ProbeResult {
        // NAV series carry no adjustment mode.
        let path = self.base_dir.join("otc_fund").join(format!("{symbol}.csv"));
        let Ok(content) = fs::read_to_string(&path) else {
            return ProbeResult::empty();
        };
        match parse_nav(&content, start, end) {
            Some(series) if !series.is_empty() => ProbeResult::found(series, AssetType::OtcFund),
            _ => ProbeResult::empty(),
        }
    }

    fn fetch_chip_distribution(&self, symbol: &str, adjust: &str) -> Vec<(NaiveDate, ChipData)> {
        let path = self.class_path("chip", symbol, adjust);
        let Ok(content) = fs::read_to_string(&path) else {
            return Vec::new();
        };
        parse_chip(&content).unwrap_or_default()
    }
}

fn parse_chip(content: &str) -> Option<Vec<(NaiveDate, ChipData)>> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers().ok()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let date_idx = col("date")?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.ok()?;
        let date = NaiveDate::parse_from_str(record.get(date_idx)?, "%Y-%m-%d").ok()?;
        let optional = |name: &str| -> Option<f64> {
            col(name)
                .and_then(|idx| record.get(idx))
                .filter(|raw| !raw.is_empty())
                .and_then(|raw| raw.parse().ok())
        };
        rows.push((
            date,
            ChipData {
                profit_ratio: optional("profit_ratio"),
                avg_cost: optional("avg_cost"),
                cost90_low: optional("cost90_low"),
                cost90_high: optional("cost90_high"),
                concentration90: optional("concentration90"),
                cost70_low: optional("cost70_low"),
                cost70_high: optional("cost70_high"),
                concentration70: optional("concentration70"),
            },
        ));
    }
    Some(rows)
}

impl NameLookup for CsvSourceAdapter {
    fn index_name(&self, symbol: &str) -> Option<String> {
        self.name_from_registry("index", symbol)
    }

    fn stock_name(&self, symbol: &str) -> Option<String> {
        self.name_from_registry("stock", symbol)
    }

    fn etf_name(&self, symbol: &str) -> Option<String> {
        self.name_from_registry("etf", symbol)
    }

    fn otc_fund_name(&self, symbol: &str) -> Option<String> {
        self.name_from_registry("otc_fund", symbol)
    }
}
