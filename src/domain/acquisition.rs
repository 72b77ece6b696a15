//! Data acquisition orchestration: resolver + cache + upstream source behind
//! one `load` call.

use crate::domain::cache::{self, CacheKey};
use crate::domain::error::DcasimError;
use crate::domain::resolver::{self, Qualifier};
use crate::domain::series::{AssetType, TimeSeries};
use crate::ports::cache_port::CachePort;
use crate::ports::market_data::{MarketDataSource, ProbeResult};
use crate::ports::name_lookup::NameLookup;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub adjust: String,
    pub force_update: bool,
    /// Whether the caller needs the chip-distribution columns; their absence
    /// from the cached schema then counts as staleness.
    pub required_chip: bool,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Series restricted to the requested window. Empty when every probe
    /// missed; the caller decides how to report that.
    pub series: TimeSeries,
    pub name: Option<String>,
}

/// Explicit service object wiring the resolver, cache, source, and name
/// registries together. Constructed once and passed by reference into the
/// entry points.
pub struct AcquisitionService<'a> {
    source: &'a dyn MarketDataSource,
    cache: &'a dyn CachePort,
    names: &'a dyn NameLookup,
    name_cache: HashMap<String, String>,
}

impl<'a> AcquisitionService<'a> {
    pub fn new(
        source: &'a dyn MarketDataSource,
        cache: &'a dyn CachePort,
        names: &'a dyn NameLookup,
        name_cache: HashMap<String, String>,
    ) -> Self {
        Self {
            source,
            cache,
            names,
            name_cache,
        }
    }

    /// Load a symbol's series, refreshing the cache when stale.
    pub fn load(&self, req: &LoadRequest) -> Result<LoadOutcome, DcasimError> {
        self.load_at(req, Local::now().naive_local())
    }

    /// As [`load`](Self::load), with an explicit wall-clock instant driving
    /// the freshness decision.
    pub fn load_at(&self, req: &LoadRequest, now: NaiveDateTime) -> Result<LoadOutcome, DcasimError> {
        let resolved = resolver::resolve(&req.symbol)?;
        let key = CacheKey {
            symbol: resolved.clean.clone(),
            qualifier: resolved.qualifier,
            adjust: req.adjust.clone(),
        };

        let cached = self.cache.load(&key);
        let freshness = cache::check_freshness(&cached, req.end, req.required_chip, now);
        let (needs_update, fetch_start) = if req.force_update {
            (true, cache::epoch())
        } else {
            (freshness.needs_update, freshness.fetch_start)
        };

        let mut series = cached.series;
        if needs_update {
            eprintln!("Updating data for {} (start={})", req.symbol, fetch_start);
            let probe = self.probe(&resolved.clean, resolved.qualifier, resolved.hint, fetch_start, req.end, &req.adjust);
            if probe.is_empty() {
                eprintln!("Warning: no new data fetched for {}", req.symbol);
            } else {
                series = cache::merge(&series, &probe.series);
                if probe.detected == Some(AssetType::Stock) {
                    join_chip_distribution(
                        &mut series,
                        &self.source.fetch_chip_distribution(&resolved.clean, &req.adjust),
                    );
                }
                self.cache.save(&key, &series)?;
            }
        }

        let name = resolver::display_name(&req.symbol, &self.name_cache, self.names)?;
        Ok(LoadOutcome {
            series: series.slice_range(req.start, req.end),
            name,
        })
    }

    /// Probe the source in fixed priority order, stopping at the first hit.
    /// An off-exchange qualifier or hint goes straight to the fund probe.
    fn probe(
        &self,
        symbol: &str,
        qualifier: Option<Qualifier>,
        hint: Option<AssetType>,
        start: NaiveDate,
        end: NaiveDate,
        adjust: &str,
    ) -> ProbeResult {
        if qualifier == Some(Qualifier::OtcFund) || hint == Some(AssetType::OtcFund) {
            return self.source.fetch_otc_fund(symbol, start, end, adjust);
        }

        let probe = self.source.fetch_index(symbol, start, end, adjust);
        if !probe.is_empty() {
            return probe;
        }
        let probe = self.source.fetch_stock(symbol, start, end, adjust);
        if !probe.is_empty() {
            return probe;
        }
        let probe = self.source.fetch_etf(symbol, start, end, adjust);
        if !probe.is_empty() {
            return probe;
        }
        let probe = self.source.fetch_otc_fund(symbol, start, end, adjust);
        if !probe.is_empty() {
            return probe;
        }
        ProbeResult::empty()
    }
}

/// Left-join chip columns on date. Dates with no enrichment row keep their
/// explicit nulls, so the persisted schema stays stable.
fn join_chip_distribution(
    series: &mut TimeSeries,
    chips: &[(NaiveDate, crate::domain::series::ChipData)],
) {
    if chips.is_empty() {
        return;
    }
    let by_date: HashMap<_, _> = chips.iter().map(|(d, c)| (*d, *c)).collect();
    for point in &mut series.points {
        if let Some(chip) = by_date.get(&point.date) {
            point.chip = *chip;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{ChipData, PricePoint};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(d: NaiveDate, close: f64) -> PricePoint {
        PricePoint::new(d, close, close, close, close, 1000.0)
    }

    #[test]
    fn chip_join_fills_matching_dates_only() {
        let mut series = TimeSeries::from_points(vec![
            point(date(2024, 1, 2), 10.0),
            point(date(2024, 1, 3), 11.0),
        ]);
        let chips = vec![(
            date(2024, 1, 3),
            ChipData {
                profit_ratio: Some(0.42),
                ..ChipData::default()
            },
        )];
        join_chip_distribution(&mut series, &chips);
        assert!(series.points[0].chip.is_empty());
        assert_eq!(series.points[1].chip.profit_ratio, Some(0.42));
    }
}
