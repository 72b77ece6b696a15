//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_cache_adapter::CsvCacheAdapter;
use crate::adapters::csv_source_adapter::CsvSourceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_name_cache::JsonNameCache;
use crate::domain::acquisition::{AcquisitionService, LoadRequest};
use crate::domain::cache::CacheKey;
use crate::domain::error::DcasimError;
use crate::domain::resolver;
use crate::domain::simulation::{run_simulation, SimulationLedger};
use crate::domain::strategy::{self, Strategy};
use crate::domain::summary::{build_comparison, render_comparison};
use crate::ports::cache_port::CachePort;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "dcasim", about = "Dollar-cost-averaging strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every configured strategy and print the comparison table
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        force_update: bool,
    },
    /// Refresh the local cache for a symbol
    Update {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        force: bool,
    },
    /// Show the cached range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Look up the display name for a symbol
    Name {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            force_update,
        } => run_backtest(&config, symbol.as_deref(), force_update),
        Command::Update {
            config,
            symbol,
            force,
        } => run_update(&config, symbol.as_deref(), force),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::Name { config, symbol } => run_name(&config, &symbol),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = DcasimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolved `[data]` section: cache directory, provider export directory,
/// symbol, adjustment mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub cache_dir: PathBuf,
    pub source_dir: PathBuf,
    pub symbol: String,
    pub adjust: String,
}

pub fn build_data_settings(
    cfg: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<DataSettings, DcasimError> {
    let cache_dir = PathBuf::from(cfg.get_string("data", "dir").unwrap_or_else(|| "data".into()));
    let source_dir = cfg
        .get_string("data", "source_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| cache_dir.join("provider"));
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => cfg
            .get_string("data", "symbol")
            .ok_or_else(|| DcasimError::ConfigMissing {
                section: "data".into(),
                key: "symbol".into(),
            })?,
    };
    let adjust = cfg
        .get_string("data", "adjust")
        .unwrap_or_else(|| "qfq".into());
    Ok(DataSettings {
        cache_dir,
        source_dir,
        symbol,
        adjust,
    })
}

pub fn build_range(cfg: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), DcasimError> {
    let date_key = |key: &str| -> Result<NaiveDate, DcasimError> {
        let raw = cfg
            .get_string("backtest", key)
            .ok_or_else(|| DcasimError::ConfigMissing {
                section: "backtest".into(),
                key: key.into(),
            })?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| DcasimError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        })
    };
    Ok((date_key("start_date")?, date_key("end_date")?))
}

/// Build every `strategy:*` section into a named variant.
pub fn build_strategies(
    adapter: &FileConfigAdapter,
) -> Result<Vec<(String, Strategy)>, DcasimError> {
    let mut sections: Vec<String> = adapter
        .sections()
        .into_iter()
        .filter(|s| s.starts_with("strategy:"))
        .collect();
    sections.sort();

    let mut strategies = Vec::new();
    for section in &sections {
        let (strat, name) = strategy::build_strategy(adapter, section)?;
        strategies.push((name, strat));
    }
    Ok(strategies)
}

fn run_backtest(config_path: &PathBuf, symbol_override: Option<&str>, force_update: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (start, end) = match build_range(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let strategies = match build_strategies(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if strategies.is_empty() {
        eprintln!("error: no strategy sections configured");
        return ExitCode::from(2);
    }

    let settings = match build_data_settings(&adapter, symbol_override) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let source = CsvSourceAdapter::new(settings.source_dir.clone());
    let cache = CsvCacheAdapter::new(settings.cache_dir.clone());
    let names = JsonNameCache::load(&settings.cache_dir.join("stock_names.json"));
    let service = AcquisitionService::new(&source, &cache, &source, names.into_map());

    let required_chip = strategies.iter().any(|(_, s)| s.requires_chip_data());
    let request = LoadRequest {
        symbol: settings.symbol.clone(),
        start,
        end,
        adjust: settings.adjust.clone(),
        force_update,
        required_chip,
    };

    let outcome = match service.load(&request) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if outcome.series.is_empty() {
        let err = DcasimError::NoData {
            symbol: settings.symbol.clone(),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    let title = match &outcome.name {
        Some(name) => format!("{} ({})", settings.symbol, name),
        None => settings.symbol.clone(),
    };
    println!("Backtesting {title} from {start} to {end}, {} trading days", outcome.series.len());

    let results: Vec<(String, Option<SimulationLedger>)> = strategies
        .iter()
        .map(|(name, strat)| {
            (
                name.clone(),
                run_simulation(&outcome.series, start, end, strat, name),
            )
        })
        .collect();

    let rows = build_comparison(&results, start, end);
    println!();
    println!("{}", render_comparison(&rows));
    ExitCode::SUCCESS
}

fn run_update(config_path: &PathBuf, symbol_override: Option<&str>, force: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_data_settings(&adapter, symbol_override) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let source = CsvSourceAdapter::new(settings.source_dir.clone());
    let cache = CsvCacheAdapter::new(settings.cache_dir.clone());
    let names = JsonNameCache::load(&settings.cache_dir.join("stock_names.json"));
    let service = AcquisitionService::new(&source, &cache, &source, names.into_map());

    let today = chrono::Local::now().date_naive();
    let request = LoadRequest {
        symbol: settings.symbol.clone(),
        start: crate::domain::cache::epoch(),
        end: today,
        adjust: settings.adjust.clone(),
        force_update: force,
        required_chip: false,
    };

    match service.load(&request) {
        Ok(outcome) => {
            println!(
                "Cache for {} holds {} rows",
                settings.symbol,
                outcome.series.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_data_settings(&adapter, symbol_override) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let resolved = match resolver::resolve(&settings.symbol) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let key = CacheKey {
        symbol: resolved.clean,
        qualifier: resolved.qualifier,
        adjust: settings.adjust.clone(),
    };

    let cache = CsvCacheAdapter::new(settings.cache_dir.clone());
    let cached = cache.load(&key);
    match (cached.series.first(), cached.series.last()) {
        (Some(first), Some(last)) => {
            println!(
                "{}: {} rows, {} to {}, chip columns: {}",
                settings.symbol,
                cached.series.len(),
                first.date,
                last.date,
                if cached.has_chip_columns { "yes" } else { "no" }
            );
            ExitCode::SUCCESS
        }
        _ => {
            println!("{}: no cached data", settings.symbol);
            ExitCode::SUCCESS
        }
    }
}

fn run_name(config_path: &PathBuf, symbol: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_data_settings(&adapter, Some(symbol)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let source = CsvSourceAdapter::new(settings.source_dir.clone());
    let names = JsonNameCache::load(&settings.cache_dir.join("stock_names.json"));
    match resolver::display_name(symbol, &names.into_map(), &source) {
        Ok(Some(name)) => {
            println!("{symbol}: {name}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("{symbol}: unknown");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
