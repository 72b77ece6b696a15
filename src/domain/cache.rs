//! Cache freshness decisions and incremental merge.
//!
//! File I/O lives behind [`crate::ports::cache_port::CachePort`]; this module
//! owns the pure logic: when a cached series needs a network refresh, from
//! which date to refetch, and how fetched increments fold into the cache.

use crate::domain::resolver::Qualifier;
use crate::domain::series::TimeSeries;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::collections::BTreeMap;

/// Number of days to refetch before the last cached date, absorbing late
/// corrections from the upstream source.
const OVERLAP_DAYS: i64 = 7;

/// Cache identity: one entry per (clean symbol, qualifier, adjustment mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub symbol: String,
    pub qualifier: Option<Qualifier>,
    pub adjust: String,
}

impl CacheKey {
    /// Stable file identifier. The off-exchange qualifier is retained
    /// (`000300.OF_qfq.csv`); a bare symbol omits it (`600519_qfq.csv`).
    pub fn file_name(&self) -> String {
        match self.qualifier {
            Some(q) => format!("{}.{}_{}.csv", self.symbol, q.as_str(), self.adjust),
            None => format!("{}_{}.csv", self.symbol, self.adjust),
        }
    }
}

/// A series loaded from cache, plus whether the backing file's header carried
/// the chip-distribution columns. Presence is a schema property: a stock whose
/// enrichment fetch returned nothing still has the columns (all null), and
/// must not look stale on the next run.
#[derive(Debug, Clone, Default)]
pub struct CachedSeries {
    pub series: TimeSeries,
    pub has_chip_columns: bool,
}

/// Outcome of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub needs_update: bool,
    pub fetch_start: NaiveDate,
}

/// Earliest fetch date for an empty or force-refreshed cache.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
}

fn session_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap()
}

fn session_close_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 10, 0).unwrap()
}

/// Ordered freshness decision, first match wins.
///
/// Cheap calendar/session heuristics (pre-open, weekend) short-circuit before
/// a guaranteed-useless network call. `required_chip` forces an update when
/// the cached schema lacks the enrichment columns, regardless of dates.
pub fn check_freshness(
    cached: &CachedSeries,
    requested_end: NaiveDate,
    required_chip: bool,
    now: NaiveDateTime,
) -> Freshness {
    let last = match cached.series.last() {
        Some(p) => p.date,
        None => {
            return Freshness {
                needs_update: true,
                fetch_start: epoch(),
            };
        }
    };

    let today = now.date();
    let time = now.time();
    let requested_end = requested_end.min(today);
    let fetch_start = last - Duration::days(OVERLAP_DAYS);

    // Before the session opens no new daily bar can exist yet.
    if time < session_open() && (today - last).num_days() <= 1 {
        return Freshness {
            needs_update: false,
            fetch_start,
        };
    }

    // On a weekend the cache is fresh if it covers the most recent Friday.
    if matches!(today.weekday(), Weekday::Sat | Weekday::Sun) {
        let days_past_friday = today.weekday().num_days_from_monday() as i64 - 4;
        let friday = today - Duration::days(days_past_friday);
        if last >= friday {
            return Freshness {
                needs_update: false,
                fetch_start,
            };
        }
    }

    if last < requested_end {
        return Freshness {
            needs_update: true,
            fetch_start,
        };
    }

    // Inside the trading session today's cached bar may be a partial snapshot.
    if time > session_open() && time < session_close_cutoff() && last == today {
        return Freshness {
            needs_update: true,
            fetch_start,
        };
    }

    if required_chip && !cached.has_chip_columns {
        return Freshness {
            needs_update: true,
            fetch_start,
        };
    }

    Freshness {
        needs_update: false,
        fetch_start,
    }
}

/// Date-keyed union of two series. On a shared date `new` wins; the result is
/// ascending. Idempotent under repeated application with identical input.
pub fn merge(old: &TimeSeries, new: &TimeSeries) -> TimeSeries {
    if old.is_empty() {
        return new.clone();
    }
    if new.is_empty() {
        return old.clone();
    }
    let mut by_date = BTreeMap::new();
    for p in &old.points {
        by_date.insert(p.date, p.clone());
    }
    for p in &new.points {
        by_date.insert(p.date, p.clone());
    }
    TimeSeries {
        points: by_date.into_values().collect(),
    }
}
