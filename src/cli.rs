//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    read_double, read_int, resolve_tiers, validate_scan_config, validate_scoring_config,
};
use crate::domain::error::ScanError;
use crate::domain::evaluator::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MIN_SCORE,
    DEFAULT_VOLUME_FLOOR, EvaluationResult, ScanConfig,
};
use crate::domain::rule_parser;
use crate::domain::scan::{self, ScanReport};
use crate::domain::score::{Category, PRESET_NAMES, RuleSet, ScoreRule};
use crate::domain::universe::{Universe, load_watchlists, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_history_port::{Lookback, PriceHistoryProvider};

pub const DEFAULT_CSV_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "sniperscan", about = "Technical-analysis stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every ticker in the configured watchlists
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated tickers, replaces the watchlists
        #[arg(long)]
        tickers: Option<String>,
        /// Only scan this watchlist
        #[arg(long)]
        watchlist: Option<String>,
        /// Override [scan] min_score for the gem list
        #[arg(long)]
        min_score: Option<u8>,
        #[arg(long)]
        json: bool,
    },
    /// Score a single ticker
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file and its scoring rules
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the built-in scoring presets
    Presets,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Scan {
            config,
            tickers,
            watchlist,
            min_score,
            json,
        } => run_scan(&config, tickers.as_deref(), watchlist.as_deref(), min_score, json),
        Command::Evaluate {
            config,
            ticker,
            json,
        } => run_evaluate(&config, &ticker, json),
        Command::Validate { config } => run_validate(&config),
        Command::Presets => {
            print!("{}", render_presets());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScanError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Validates `[scan]` and `[scoring]`, then assembles the immutable scan
/// settings.
pub fn build_scan_config(adapter: &dyn ConfigPort) -> Result<ScanConfig, ScanError> {
    validate_scan_config(adapter)?;
    validate_scoring_config(adapter)?;

    let lookback = match adapter.get_string("scan", "lookback") {
        Some(raw) => raw.parse::<Lookback>().map_err(|reason| ScanError::ConfigInvalid {
            section: "scan".into(),
            key: "lookback".into(),
            reason,
        })?,
        None => Lookback::default(),
    };

    Ok(ScanConfig {
        volume_floor: read_double(adapter, "scan", "volume_floor", DEFAULT_VOLUME_FLOOR)?,
        rule_set: build_rule_set(adapter)?,
        max_concurrency: read_int(adapter, "scan", "max_concurrency", DEFAULT_MAX_CONCURRENCY as i64)?
            as usize,
        fetch_timeout: Duration::from_secs(read_int(
            adapter,
            "scan",
            "fetch_timeout_secs",
            DEFAULT_FETCH_TIMEOUT_SECS as i64,
        )? as u64),
        lookback,
        interval: adapter
            .get_string("scan", "interval")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "1d".to_string()),
        min_score: read_int(adapter, "scan", "min_score", DEFAULT_MIN_SCORE as i64)? as u8,
    })
}

/// Selected preset (platinum by default) or the `rule.N` lines of a custom
/// set, with any tier overrides applied.
pub fn build_rule_set(adapter: &dyn ConfigPort) -> Result<RuleSet, ScanError> {
    let preset = adapter
        .get_string("scoring", "preset")
        .map(|p| p.trim().to_lowercase())
        .unwrap_or_else(|| "platinum".to_string());

    let rule_set = if preset == "custom" {
        let rules = read_custom_rules(adapter)?;
        RuleSet::new("custom", rules, RuleSet::platinum().tiers)?
    } else {
        let rule_set = RuleSet::preset(&preset).ok_or_else(|| ScanError::ConfigInvalid {
            section: "scoring".into(),
            key: "preset".into(),
            reason: format!("unknown preset '{}'", preset),
        })?;
        if adapter.get_string("scoring", "rule.1").is_some() {
            warn!(preset = %preset, "rule.N lines are ignored unless preset = custom");
        }
        rule_set
    };

    let tiers = resolve_tiers(adapter, rule_set.tiers)?;
    rule_set.with_tiers(tiers)
}

fn read_custom_rules(adapter: &dyn ConfigPort) -> Result<Vec<ScoreRule>, ScanError> {
    let mut rules = Vec::new();
    for n in 1.. {
        let key = format!("rule.{}", n);
        let Some(line) = adapter.get_string("scoring", &key) else {
            break;
        };
        rules.push(parse_rule_line(&key, &line)?);
    }
    Ok(rules)
}

/// Parses `category | points | reason | condition`.
pub fn parse_rule_line(key: &str, line: &str) -> Result<ScoreRule, ScanError> {
    let parts: Vec<&str> = line.splitn(4, '|').map(str::trim).collect();
    let [category, points, reason, condition] = parts.as_slice() else {
        return Err(ScanError::RuleInvalid {
            reason: format!("{}: expected 'category | points | reason | condition'", key),
        });
    };

    let category = Category::parse(category).ok_or_else(|| ScanError::RuleInvalid {
        reason: format!(
            "{}: unknown category '{}', expected trend, momentum or structure",
            key, category
        ),
    })?;
    let points: i32 = points.parse().map_err(|_| ScanError::RuleInvalid {
        reason: format!("{}: points must be an integer, found '{}'", key, points),
    })?;
    let condition = rule_parser::parse(condition).map_err(|e| {
        error!("failed to parse {}:\n{}", key, e.display_with_context(condition));
        ScanError::from(e)
    })?;

    Ok(ScoreRule::new(category, points, reason, condition))
}

/// Tickers from `--tickers`, else one watchlist, else the union of all.
pub fn resolve_tickers(
    tickers_override: Option<&str>,
    watchlist: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, ScanError> {
    if let Some(raw) = tickers_override {
        return Ok(parse_tickers(raw));
    }

    let mut lists = load_watchlists(config);
    if let Some(name) = watchlist {
        let name = name.to_lowercase();
        lists.retain(|l| l.name == name);
        if lists.is_empty() {
            return Err(ScanError::ConfigMissing {
                section: "watchlists".into(),
                key: name,
            });
        }
    }
    Ok(Universe::from_watchlists(&lists).tickers)
}

pub fn csv_provider(config: &dyn ConfigPort) -> CsvAdapter {
    let dir = config
        .get_string("data", "csv_dir")
        .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
    CsvAdapter::new(PathBuf::from(dir))
}

/// Drives an async scan to completion on a fresh runtime.
pub fn run_scan_pipeline(
    provider: Arc<dyn PriceHistoryProvider>,
    tickers: &[String],
    config: Arc<ScanConfig>,
) -> Result<ScanReport, ScanError> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(scan::scan(provider, tickers, config)))
}

fn run_scan(
    config_path: &Path,
    tickers_override: Option<&str>,
    watchlist: Option<&str>,
    min_score_override: Option<u8>,
    json: bool,
) -> Result<(), ScanError> {
    let adapter = load_config(config_path)?;
    let mut config = build_scan_config(&adapter)?;
    if let Some(min_score) = min_score_override {
        config.min_score = min_score.min(100);
    }

    let tickers = resolve_tickers(tickers_override, watchlist, &adapter)?;
    if tickers.is_empty() {
        return Err(ScanError::ConfigMissing {
            section: "watchlists".into(),
            key: "family/etf/watch/market".into(),
        });
    }
    info!(
        tickers = tickers.len(),
        preset = %config.rule_set.name,
        max_concurrency = config.max_concurrency,
        "starting scan"
    );

    let provider: Arc<dyn PriceHistoryProvider> = Arc::new(csv_provider(&adapter));
    let min_score = config.min_score;
    let report = run_scan_pipeline(provider, &tickers, Arc::new(config))?;

    if json {
        println!("{}", to_json(&report)?);
    } else {
        print!("{}", render_report(&report, min_score));
    }
    Ok(())
}

fn run_evaluate(config_path: &Path, ticker: &str, json: bool) -> Result<(), ScanError> {
    let adapter = load_config(config_path)?;
    let config = Arc::new(build_scan_config(&adapter)?);
    let tickers = parse_tickers(ticker);

    let provider: Arc<dyn PriceHistoryProvider> = Arc::new(csv_provider(&adapter));
    let report = run_scan_pipeline(provider, &tickers, config)?;

    for result in &report.results {
        if json {
            println!("{}", to_json(result)?);
        } else {
            print!("{}", render_result(result));
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), ScanError> {
    let adapter = load_config(config_path)?;
    let config = build_scan_config(&adapter)?;
    let tickers = resolve_tickers(None, None, &adapter)?;

    println!("Scoring preset: {}", config.rule_set.name);
    print!("{}", render_rule_set(&config.rule_set));
    println!(
        "Scan: floor {:.0}, {} workers, {}s timeout, lookback {} @ {}",
        config.volume_floor,
        config.max_concurrency,
        config.fetch_timeout.as_secs(),
        config.lookback,
        config.interval
    );
    println!("Universe: {} tickers", tickers.len());
    println!("\nConfiguration is valid.");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ScanError> {
    serde_json::to_string_pretty(value).map_err(|e| ScanError::Io(std::io::Error::other(e)))
}

pub fn render_presets() -> String {
    let mut out = String::new();
    for name in PRESET_NAMES {
        if let Some(rule_set) = RuleSet::preset(name) {
            out.push_str(&format!("{}\n", name));
            out.push_str(&render_rule_set(&rule_set));
            out.push('\n');
        }
    }
    out
}

pub fn render_rule_set(rule_set: &RuleSet) -> String {
    let mut out = format!(
        "  tiers: elite >= {}, strong >= {}, weak <= {}\n",
        rule_set.tiers.elite, rule_set.tiers.strong, rule_set.tiers.weak
    );
    for rule in rule_set.rules() {
        out.push_str(&format!(
            "  [{:<9}] {:+4}  {}\n              {}\n",
            rule.category.to_string(), rule.points, rule.reason, rule.condition
        ));
    }
    out
}

pub fn render_result(result: &EvaluationResult) -> String {
    match result {
        EvaluationResult::Success {
            ticker,
            currency,
            price,
            change_percent,
            score,
            tier,
            reasons,
            squeeze,
            trade_plan,
            is_fund_like,
            rsi,
            average_volume,
        } => {
            let mut out = format!(
                "{:<10} {:>3} {:<7} {}{:.2} ({:+.2}%)",
                ticker, score, tier.to_string(), currency, price, change_percent
            );
            if *squeeze {
                out.push_str(" squeeze");
            }
            if *is_fund_like {
                out.push_str(" fund");
            }
            out.push('\n');
            out.push_str(&format!(
                "           rsi {} | avg volume {:.0}\n",
                rsi.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "n/a".into()),
                average_volume
            ));
            match trade_plan {
                Some(plan) => out.push_str(&format!(
                    "           stop {}{:.2} | target {}{:.2} | r/r {:.1}\n",
                    currency, plan.stop, currency, plan.target, plan.risk_reward
                )),
                None => out.push_str("           no trade plan (volatility undefined)\n"),
            }
            for reason in reasons {
                out.push_str(&format!("           - {}\n", reason));
            }
            out
        }
        EvaluationResult::Failure { ticker, reason, .. } => {
            format!("{:<10} skipped: {}\n", ticker, reason)
        }
    }
}

pub fn render_report(report: &ScanReport, min_score: u8) -> String {
    let gems = report.gems(min_score);
    let mut out = format!("Gems (score >= {}): {}\n", min_score, gems.len());
    for gem in &gems {
        out.push_str(&render_result(gem));
    }

    out.push_str("\nAll results\n");
    for result in &report.results {
        out.push_str(&render_result(result));
    }

    let failures = report.failures().len();
    out.push_str(&format!(
        "\n{} scanned, {} scored, {} skipped\n",
        report.results.len(),
        report.results.len() - failures,
        failures
    ));
    out
}
