//! Integration tests for the acquisition pipeline and the full
//! acquire-simulate-summarize flow.
//!
//! Tests cover:
//! - Probe priority order and first-hit wins
//! - OTC-fund qualifier short-circuiting the probe sequence
//! - Chip-distribution join for stocks, with explicit nulls elsewhere
//! - Cache reuse across loads and merge precedence on refresh
//! - Force-update refetching from the epoch
//! - All-probes-miss returning an empty series
//! - Legacy cache headers triggering a required-column refresh
//! - End-to-end backtest with the comparison summary

mod common;

use chrono::NaiveDateTime;
use common::*;
use dcasim::adapters::csv_cache_adapter::CsvCacheAdapter;
use dcasim::domain::acquisition::{AcquisitionService, LoadRequest};
use dcasim::domain::cache::{epoch, CacheKey};
use dcasim::domain::error::DcasimError;
use dcasim::domain::series::ChipData;
use dcasim::domain::simulation::run_simulation;
use dcasim::domain::strategy::{FixedInvestment, Frequency, Strategy};
use dcasim::domain::summary::build_comparison;
use dcasim::ports::cache_port::CachePort;
use std::collections::HashMap;
use tempfile::TempDir;

fn evening(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d)
        .and_hms_opt(18, 0, 0)
        .unwrap()
}

fn request(symbol: &str) -> LoadRequest {
    LoadRequest {
        symbol: symbol.to_string(),
        start: date(2024, 1, 1),
        end: date(2024, 1, 5),
        adjust: "qfq".to_string(),
        force_update: false,
        required_chip: false,
    }
}

fn cache_in(dir: &TempDir) -> CsvCacheAdapter {
    CsvCacheAdapter::new(dir.path().to_path_buf())
}

mod probe_order {
    use super::*;

    #[test]
    fn index_beats_stock_for_an_ambiguous_symbol() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_index("000300", make_series(&[("2024-01-02", 3500.0)]))
            .with_stock("000300", make_series(&[("2024-01-02", 12.0)]));
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let outcome = service
            .load_at(&request("000300"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(outcome.series.points[0].close, 3500.0);
    }

    #[test]
    fn fallback_walks_the_priority_chain() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_etf("510300", make_series(&[("2024-01-02", 3.55)]));
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let outcome = service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(outcome.series.points[0].close, 3.55);

        let log = source.call_log();
        assert_eq!(log[0], format!("index:510300:{}", epoch()));
        assert_eq!(log[1], format!("stock:510300:{}", epoch()));
        assert_eq!(log[2], format!("etf:510300:{}", epoch()));
    }

    #[test]
    fn otc_qualifier_probes_only_the_fund_source() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_index("000300", make_series(&[("2024-01-02", 3500.0)]))
            .with_otc_fund("000300", make_series(&[("2024-01-02", 1.234)]));
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let outcome = service
            .load_at(&request("000300.OF"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(outcome.series.points[0].close, 1.234);
        assert_eq!(
            source.call_log(),
            vec![format!("otc_fund:000300:{}", epoch())]
        );
    }

    #[test]
    fn all_probes_missing_returns_empty_series() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new();
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let outcome = service
            .load_at(&request("999999"), evening(2024, 1, 5))
            .unwrap();
        assert!(outcome.series.is_empty());
        assert_eq!(source.call_log().len(), 4);
    }

    #[test]
    fn unsupported_suffix_is_a_hard_error() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new();
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let err = service
            .load_at(&request("600519.SH"), evening(2024, 1, 5))
            .unwrap_err();
        assert!(matches!(err, DcasimError::UnsupportedSuffix { .. }));
    }
}

mod enrichment {
    use super::*;

    #[test]
    fn stock_hit_joins_chip_columns_on_date() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_stock(
                "600519",
                make_series(&[("2024-01-02", 1700.0), ("2024-01-03", 1710.0)]),
            )
            .with_chips(
                "600519",
                vec![(
                    date(2024, 1, 3),
                    ChipData {
                        profit_ratio: Some(0.35),
                        avg_cost: Some(1650.0),
                        ..ChipData::default()
                    },
                )],
            );
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let outcome = service
            .load_at(&request("600519"), evening(2024, 1, 5))
            .unwrap();
        assert!(outcome.series.points[0].chip.is_empty());
        assert_eq!(outcome.series.points[1].chip.profit_ratio, Some(0.35));

        // The persisted cache carries the chip schema from now on.
        let key = CacheKey {
            symbol: "600519".into(),
            qualifier: None,
            adjust: "qfq".into(),
        };
        assert!(cache.load(&key).has_chip_columns);
    }

    #[test]
    fn non_stock_hit_never_probes_enrichment() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_etf("510300", make_series(&[("2024-01-02", 3.55)]));
        let names = MockNameLookup::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        assert!(source.call_log().iter().all(|c| !c.starts_with("chip:")));
    }
}

mod cache_behavior {
    use super::*;

    #[test]
    fn fresh_cache_skips_the_network_entirely() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let names = MockNameLookup::new();

        let source = MockMarketDataSource::new()
            .with_etf("510300", make_series(&[("2024-01-04", 3.50), ("2024-01-05", 3.60)]));
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());
        service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        let first_calls = source.call_log().len();
        assert!(first_calls > 0);

        // Same request again: cache covers the window, nothing is fetched.
        let outcome = service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(source.call_log().len(), first_calls);
        assert_eq!(outcome.series.len(), 2);
    }

    #[test]
    fn refresh_merges_and_new_values_win() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let names = MockNameLookup::new();

        let key = CacheKey {
            symbol: "510300".into(),
            qualifier: None,
            adjust: "qfq".into(),
        };
        cache
            .save(
                &key,
                &make_series(&[("2024-01-02", 3.40), ("2024-01-03", 3.45)]),
            )
            .unwrap();

        // The source corrects the 01-03 close and adds two more days.
        let source = MockMarketDataSource::new().with_etf(
            "510300",
            make_series(&[
                ("2024-01-03", 3.99),
                ("2024-01-04", 3.50),
                ("2024-01-05", 3.60),
            ]),
        );
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());
        let outcome = service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();

        assert_eq!(outcome.series.len(), 4);
        assert_eq!(outcome.series.points[1].date, date(2024, 1, 3));
        assert_eq!(outcome.series.points[1].close, 3.99);

        // Refetch starts 7 days before the last cached date.
        assert_eq!(source.call_log()[0], "index:510300:2023-12-27");
    }

    #[test]
    fn force_update_refetches_from_the_epoch() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let names = MockNameLookup::new();

        let key = CacheKey {
            symbol: "510300".into(),
            qualifier: None,
            adjust: "qfq".into(),
        };
        cache
            .save(&key, &make_series(&[("2024-01-05", 3.60)]))
            .unwrap();

        let source = MockMarketDataSource::new()
            .with_etf("510300", make_series(&[("2024-01-05", 3.60)]));
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let mut req = request("510300");
        req.force_update = true;
        service.load_at(&req, evening(2024, 1, 5)).unwrap();
        assert_eq!(source.call_log()[0], format!("index:510300:{}", epoch()));
    }

    #[test]
    fn legacy_cache_without_chip_columns_triggers_refresh() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("600519_qfq.csv"),
            "date,open,close,high,low,volume\n2024-01-05,1700,1700,1700,1700,1000\n",
        )
        .unwrap();
        let cache = cache_in(&dir);
        let names = MockNameLookup::new();
        let source = MockMarketDataSource::new()
            .with_stock("600519", make_series(&[("2024-01-05", 1700.0)]));
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let mut req = request("600519");
        req.required_chip = true;
        service.load_at(&req, evening(2024, 1, 5)).unwrap();
        assert!(!source.call_log().is_empty());

        // After the refresh the canonical schema is in place; a second
        // required-chip load is satisfied locally.
        let calls = source.call_log().len();
        service.load_at(&req, evening(2024, 1, 5)).unwrap();
        assert_eq!(source.call_log().len(), calls);
    }

    #[test]
    fn failed_refresh_keeps_the_old_cache() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let names = MockNameLookup::new();

        let key = CacheKey {
            symbol: "510300".into(),
            qualifier: None,
            adjust: "qfq".into(),
        };
        let good = make_series(&[("2024-01-02", 3.40)]);
        cache.save(&key, &good).unwrap();

        // Source has nothing; the stale cache must survive untouched.
        let source = MockMarketDataSource::new();
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());
        service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(cache.load(&key).series, good);
    }
}

mod names {
    use super::*;

    #[test]
    fn display_name_comes_from_the_registry() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_etf("510300", make_series(&[("2024-01-02", 3.55)]));
        let names = MockNameLookup::new().with_etf_name("510300", "CSI 300 ETF");
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let outcome = service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(outcome.name.as_deref(), Some("CSI 300 ETF"));
    }

    #[test]
    fn local_name_cache_wins_over_the_registry() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let source = MockMarketDataSource::new()
            .with_etf("510300", make_series(&[("2024-01-02", 3.55)]));
        let names = MockNameLookup::new().with_etf_name("510300", "Registry Name");
        let mut local = HashMap::new();
        local.insert("510300".to_string(), "Local Name".to_string());
        let service = AcquisitionService::new(&source, &cache, &names, local);

        let outcome = service
            .load_at(&request("510300"), evening(2024, 1, 5))
            .unwrap();
        assert_eq!(outcome.name.as_deref(), Some("Local Name"));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn acquire_simulate_and_rank_two_strategies() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let names = MockNameLookup::new();

        // Ten business days rising from 10 to 19.
        let closes: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let series = business_series("2024-01-02", &closes);
        let source = MockMarketDataSource::new().with_etf("510300", series);
        let service = AcquisitionService::new(&source, &cache, &names, HashMap::new());

        let req = LoadRequest {
            symbol: "510300".to_string(),
            start: date(2024, 1, 2),
            end: date(2024, 1, 15),
            adjust: "qfq".to_string(),
            force_update: false,
            required_chip: false,
        };
        let outcome = service.load_at(&req, evening(2024, 1, 15)).unwrap();
        assert_eq!(outcome.series.len(), 10);

        let daily = Strategy::Fixed(FixedInvestment::new(100.0, Frequency::Daily));
        let monthly = Strategy::Fixed(FixedInvestment::new(100.0, Frequency::Monthly));
        let results = vec![
            (
                "Fixed_D_100".to_string(),
                run_simulation(&outcome.series, req.start, req.end, &daily, "Fixed_D_100"),
            ),
            (
                "Fixed_M_100".to_string(),
                run_simulation(&outcome.series, req.start, req.end, &monthly, "Fixed_M_100"),
            ),
        ];

        let rows = build_comparison(&results, req.start, req.end);
        assert_eq!(rows.len(), 2);
        // Monthly invested once at 10 and rode the rise to 19; daily kept
        // averaging up, so monthly ranks first.
        assert_eq!(rows[0].strategy, "Fixed_M_100");
        assert!(rows[0].return_rate > rows[1].return_rate);
        assert!(rows[1].return_rate > 0.0);
    }
}
