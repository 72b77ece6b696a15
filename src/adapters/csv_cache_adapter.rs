//! CSV file cache adapter.
//!
//! One file per cache key, canonical header with the chip-distribution
//! columns always present; missing enrichment values are written as empty
//! fields so the schema stays stable across refreshes.

use crate::domain::cache::{CacheKey, CachedSeries};
use crate::domain::error::DcasimError;
use crate::domain::series::{ChipData, PricePoint, TimeSeries};
use crate::ports::cache_port::CachePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const CANONICAL_HEADER: [&str; 14] = [
    "date",
    "open",
    "close",
    "high",
    "low",
    "volume",
    "profit_ratio",
    "avg_cost",
    "cost90_low",
    "cost90_high",
    "concentration90",
    "cost70_low",
    "cost70_high",
    "concentration70",
];

pub struct CsvCacheAdapter {
    base_dir: PathBuf,
}

impl CsvCacheAdapter {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn file_path(&self, key: &CacheKey) -> PathBuf {
        self.base_dir.join(key.file_name())
    }

    fn parse(content: &str) -> Result<CachedSeries, String> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
        let col = |name: &str| headers.iter().position(|h| h == name);

        let date_idx = col("date").ok_or("missing date column")?;
        let open_idx = col("open").ok_or("missing open column")?;
        let close_idx = col("close").ok_or("missing close column")?;
        let high_idx = col("high").ok_or("missing high column")?;
        let low_idx = col("low").ok_or("missing low column")?;
        let volume_idx = col("volume").ok_or("missing volume column")?;
        // Legacy caches predate the enrichment columns; their absence is a
        // schema fact the freshness check needs to see.
        let has_chip_columns = col("profit_ratio").is_some();

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| e.to_string())?;
            let field = |idx: usize| record.get(idx).ok_or("short record");
            let number = |idx: usize| -> Result<f64, String> {
                field(idx)?
                    .parse::<f64>()
                    .map_err(|e| format!("invalid number: {e}"))
            };
            let optional = |name: &str| -> Result<Option<f64>, String> {
                match col(name).and_then(|idx| record.get(idx)) {
                    None | Some("") => Ok(None),
                    Some(raw) => raw
                        .parse::<f64>()
                        .map(Some)
                        .map_err(|e| format!("invalid {name}: {e}")),
                }
            };

            let date = NaiveDate::parse_from_str(field(date_idx)?, "%Y-%m-%d")
                .map_err(|e| format!("invalid date: {e}"))?;
            points.push(PricePoint {
                date,
                open: number(open_idx)?,
                close: number(close_idx)?,
                high: number(high_idx)?,
                low: number(low_idx)?,
                volume: number(volume_idx)?,
                chip: ChipData {
                    profit_ratio: optional("profit_ratio")?,
                    avg_cost: optional("avg_cost")?,
                    cost90_low: optional("cost90_low")?,
                    cost90_high: optional("cost90_high")?,
                    concentration90: optional("concentration90")?,
                    cost70_low: optional("cost70_low")?,
                    cost70_high: optional("cost70_high")?,
                    concentration70: optional("concentration70")?,
                },
            });
        }

        Ok(CachedSeries {
            series: TimeSeries::from_points(points),
            has_chip_columns,
        })
    }
}

fn optional_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CachePort for CsvCacheAdapter {
    fn load(&self, key: &CacheKey) -> CachedSeries {
        let path = self.file_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return CachedSeries::default(),
        };
        match Self::parse(&content) {
            Ok(cached) => cached,
            Err(reason) => {
                eprintln!("Error reading cache {}: {}", path.display(), reason);
                CachedSeries::default()
            }
        }
    }

    fn save(&self, key: &CacheKey, series: &TimeSeries) -> Result<bool, DcasimError> {
        if series.is_empty() {
            return Ok(false);
        }
        fs::create_dir_all(&self.base_dir)?;
        let path = self.file_path(key);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| {
            DcasimError::Io(std::io::Error::other(format!(
                "failed to write {}: {}",
                path.display(),
                e
            )))
        })?;
        wtr.write_record(CANONICAL_HEADER)
            .map_err(|e| DcasimError::Io(std::io::Error::other(e.to_string())))?;
        for p in &series.points {
            let record = [
                p.date.format("%Y-%m-%d").to_string(),
                p.open.to_string(),
                p.close.to_string(),
                p.high.to_string(),
                p.low.to_string(),
                p.volume.to_string(),
                optional_field(p.chip.profit_ratio),
                optional_field(p.chip.avg_cost),
                optional_field(p.chip.cost90_low),
                optional_field(p.chip.cost90_high),
                optional_field(p.chip.concentration90),
                optional_field(p.chip.cost70_low),
                optional_field(p.chip.cost70_high),
                optional_field(p.chip.concentration70),
            ];
            wtr.write_record(&record)
                .map_err(|e| DcasimError::Io(std::io::Error::other(e.to_string())))?;
        }
        wtr.flush()?;
        Ok(true)
    }
}
