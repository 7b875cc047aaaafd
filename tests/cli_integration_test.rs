//! CLI integration tests for the scan command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_scan_config, build_rule_set, parse_rule_line)
//! - Ticker resolution from watchlists and overrides
//! - Full scan over CSV files on disk via run_scan_pipeline
//! - Command dispatch exit codes with real INI files
//! - Text rendering of results

mod common;

use clap::Parser;
use common::*;
use sniperscan::adapters::csv_adapter::CsvAdapter;
use sniperscan::adapters::file_config_adapter::FileConfigAdapter;
use sniperscan::cli::{self, Cli};
use sniperscan::domain::error::ScanError;
use sniperscan::domain::evaluator::{EvaluationResult, FailureKind};
use sniperscan::domain::score::{Category, Tier};
use sniperscan::ports::price_history_port::{Lookback, PriceHistoryProvider};
use std::fs;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[scan]
volume_floor = 500000
max_concurrency = 2
fetch_timeout_secs = 5
lookback = 1y
interval = 1d
min_score = 80

[watchlists]
family = ZETA, NBIS
etf = VOO, QQQ, 0050.TW
watch = NVDA, zeta, AAPL

[scoring]
preset = godmode
elite = 85
"#;

const CUSTOM_INI: &str = r#"
[scoring]
preset = custom
strong = 60
rule.1 = structure | 15 | tight range | SQUEEZE
rule.2 = trend | 25 | above the 50-day | ABOVE(close, SMA(50))
rule.3 = momentum | -5 | hot | ABOVE(RSI(14), 80)
rule.5 = trend | 99 | never read | ABOVE(close, 0)
"#;

fn exit_debug(code: ExitCode) -> String {
    format!("{:?}", code)
}

mod config_loading {
    use super::*;

    #[test]
    fn build_scan_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_scan_config(&adapter).unwrap();

        assert_eq!(config.volume_floor, 500_000.0);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.lookback, Lookback::years(1));
        assert_eq!(config.interval, "1d");
        assert_eq!(config.min_score, 80);
        assert_eq!(config.rule_set.name, "godmode");
        assert_eq!(config.rule_set.tiers.elite, 85);
        assert_eq!(config.rule_set.tiers.strong, 60);
        assert_eq!(config.rule_set.tiers.weak, 40);
    }

    #[test]
    fn build_scan_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[scan]\n").unwrap();
        let config = cli::build_scan_config(&adapter).unwrap();

        assert_eq!(config.volume_floor, 1_000_000.0);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.lookback, Lookback::years(2));
        assert_eq!(config.min_score, 90);
        assert_eq!(config.rule_set.name, "platinum");
    }

    #[test]
    fn build_scan_config_rejects_bad_scan_values() {
        let adapter = FileConfigAdapter::from_string("[scan]\nmax_concurrency = 0\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, ScanError::ConfigInvalid { key, .. } if key == "max_concurrency"));
    }

    #[test]
    fn build_scan_config_rejects_malformed_numbers() {
        for (line, key) in [
            ("max_concurrency = four", "max_concurrency"),
            ("fetch_timeout_secs = 0.5", "fetch_timeout_secs"),
            ("min_score = ninety", "min_score"),
            ("volume_floor = plenty", "volume_floor"),
        ] {
            let adapter = FileConfigAdapter::from_string(&format!("[scan]\n{}\n", line)).unwrap();
            let err = cli::build_scan_config(&adapter).unwrap_err();
            assert!(
                matches!(&err, ScanError::ConfigInvalid { key: k, .. } if k == key),
                "{}: {:?}",
                line,
                err
            );
        }
    }

    #[test]
    fn build_scan_config_rejects_absurd_lookback() {
        let adapter = FileConfigAdapter::from_string("[scan]\nlookback = 1000000y\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, ScanError::ConfigInvalid { key, .. } if key == "lookback"));
    }

    #[test]
    fn custom_rules_read_until_first_gap() {
        let adapter = FileConfigAdapter::from_string(CUSTOM_INI).unwrap();
        let rule_set = cli::build_rule_set(&adapter).unwrap();

        assert_eq!(rule_set.name, "custom");
        let reasons: Vec<&str> = rule_set.rules().iter().map(|r| r.reason.as_str()).collect();
        // category order, rule.5 sits past the gap at rule.4
        assert_eq!(reasons, vec!["above the 50-day", "hot", "tight range"]);
        assert_eq!(rule_set.rules()[1].points, -5);
        assert_eq!(rule_set.tiers.strong, 60);
        assert_eq!(rule_set.tiers.elite, 90);
    }

    #[test]
    fn custom_preset_without_rules_is_invalid() {
        let adapter = FileConfigAdapter::from_string("[scoring]\npreset = custom\n").unwrap();
        assert!(matches!(
            cli::build_rule_set(&adapter),
            Err(ScanError::RuleInvalid { .. })
        ));
    }

    #[test]
    fn preset_ignores_rule_lines() {
        let ini = "[scoring]\npreset = platinum\nrule.1 = trend | 5 | x | SQUEEZE\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let rule_set = cli::build_rule_set(&adapter).unwrap();
        assert_eq!(rule_set.name, "platinum");
        assert!(rule_set.rules().iter().all(|r| r.reason != "x"));
    }
}

mod rule_lines {
    use super::*;

    #[test]
    fn parses_all_four_fields() {
        let rule = cli::parse_rule_line("rule.1", "Momentum | 30 | sweet spot | BETWEEN(RSI(14), 50, 75)")
            .unwrap();
        assert_eq!(rule.category, Category::Momentum);
        assert_eq!(rule.points, 30);
        assert_eq!(rule.reason, "sweet spot");
        assert_eq!(rule.condition.to_string(), "BETWEEN(RSI(14), 50, 75)");
    }

    #[test]
    fn missing_fields() {
        let err = cli::parse_rule_line("rule.2", "trend | 20 | no condition").unwrap_err();
        assert!(matches!(err, ScanError::RuleInvalid { reason } if reason.starts_with("rule.2")));
    }

    #[test]
    fn unknown_category() {
        let err = cli::parse_rule_line("rule.1", "volume | 20 | x | SQUEEZE").unwrap_err();
        assert!(matches!(err, ScanError::RuleInvalid { reason } if reason.contains("volume")));
    }

    #[test]
    fn non_integer_points() {
        let err = cli::parse_rule_line("rule.1", "trend | lots | x | SQUEEZE").unwrap_err();
        assert!(matches!(err, ScanError::RuleInvalid { reason } if reason.contains("lots")));
    }

    #[test]
    fn bad_condition_is_parse_error() {
        let err = cli::parse_rule_line("rule.1", "trend | 20 | x | ABOVE(close, SMA(30))").unwrap_err();
        match err {
            ScanError::RuleParse(e) => assert!(e.message.contains("30")),
            other => panic!("expected RuleParse, got {:?}", other),
        }
    }
}

mod ticker_resolution {
    use super::*;

    #[test]
    fn union_of_watchlists() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let tickers = cli::resolve_tickers(None, None, &adapter).unwrap();
        assert_eq!(
            tickers,
            vec!["ZETA", "NBIS", "VOO", "QQQ", "0050.TW", "NVDA", "AAPL"]
        );
    }

    #[test]
    fn single_watchlist() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let tickers = cli::resolve_tickers(None, Some("ETF"), &adapter).unwrap();
        assert_eq!(tickers, vec!["VOO", "QQQ", "0050.TW"]);
    }

    #[test]
    fn unknown_watchlist() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let err = cli::resolve_tickers(None, Some("crypto"), &adapter).unwrap_err();
        assert!(matches!(err, ScanError::ConfigMissing { key, .. } if key == "crypto"));
    }

    #[test]
    fn override_wins() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let tickers = cli::resolve_tickers(Some("tsla, msft"), Some("etf"), &adapter).unwrap();
        assert_eq!(tickers, vec!["TSLA", "MSFT"]);
    }
}

mod csv_pipeline {
    use super::*;

    fn seeded_dir() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("UP.csv"), csv_content(&uptrend_bars(400, 3_000_000))).unwrap();
        fs::write(dir.path().join("FLAT.csv"), csv_content(&flat_bars(300, 40.0, 3_000_000))).unwrap();
        fs::write(dir.path().join("SHORT.csv"), csv_content(&uptrend_bars(30, 3_000_000))).unwrap();
        dir
    }

    #[test]
    fn scan_over_csv_files() {
        let dir = seeded_dir();
        let adapter = FileConfigAdapter::from_string("[scan]\nlookback = 1y\n").unwrap();
        let config = Arc::new(cli::build_scan_config(&adapter).unwrap());
        let provider: Arc<dyn PriceHistoryProvider> =
            Arc::new(CsvAdapter::new(dir.path().to_path_buf()));

        let tickers: Vec<String> = ["UP", "FLAT", "SHORT", "MISSING"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let report = cli::run_scan_pipeline(provider, &tickers, config).unwrap();

        assert_eq!(report.results.len(), 4);
        assert!(matches!(
            &report.results[0],
            EvaluationResult::Success { tier: Tier::Strong | Tier::Elite, .. }
        ));
        assert!(matches!(
            &report.results[1],
            EvaluationResult::Success { tier: Tier::Weak, is_fund_like: true, .. }
        ));
        assert!(matches!(
            &report.results[2],
            EvaluationResult::Failure { kind: FailureKind::InsufficientData, .. }
        ));
        assert!(matches!(
            &report.results[3],
            EvaluationResult::Failure { kind: FailureKind::Provider, .. }
        ));

        let text = cli::render_report(&report, 70);
        assert!(text.starts_with("Gems (score >= 70): 1\n"));
        assert!(text.contains("MISSING    skipped: provider error"));
        assert!(text.contains("4 scanned, 2 scored, 2 skipped"));
    }

    #[test]
    fn scan_command_exit_codes() {
        let dir = seeded_dir();
        let ini = format!(
            "[data]\ncsv_dir = {}\n\n[watchlists]\nwatch = UP, FLAT\n",
            dir.path().display()
        );
        let file = write_temp_ini(&ini);

        let ok = Cli::try_parse_from([
            "sniperscan",
            "scan",
            "--config",
            file.path().to_str().unwrap(),
            "--json",
        ])
        .unwrap();
        assert_eq!(exit_debug(cli::run(ok)), exit_debug(ExitCode::SUCCESS));

        let missing = Cli::try_parse_from(["sniperscan", "scan", "--config", "/nonexistent/x.ini"])
            .unwrap();
        assert_eq!(exit_debug(cli::run(missing)), exit_debug(ExitCode::from(2)));
    }

    #[test]
    fn validate_command_rejects_bad_rule() {
        let file = write_temp_ini("[scoring]\npreset = custom\nrule.1 = trend | 5 | x | ABOVE(close\n");
        let cli = Cli::try_parse_from([
            "sniperscan",
            "validate",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(exit_debug(cli::run(cli)), exit_debug(ExitCode::from(4)));
    }

    #[test]
    fn presets_command_succeeds() {
        let cli = Cli::try_parse_from(["sniperscan", "presets"]).unwrap();
        assert_eq!(exit_debug(cli::run(cli)), exit_debug(ExitCode::SUCCESS));
    }
}

mod rendering {
    use super::*;

    #[test]
    fn failure_line() {
        let result = EvaluationResult::failure("ABC", &ScanError::UnorderedBars);
        assert_eq!(
            cli::render_result(&result),
            "ABC        skipped: bars are not strictly ordered by date\n"
        );
    }

    #[test]
    fn presets_listing_shows_both() {
        let text = cli::render_presets();
        assert!(text.starts_with("platinum\n"));
        assert!(text.contains("\ngodmode\n"));
        assert!(text.contains("SQUEEZE"));
        assert!(text.contains("tiers: elite >= 80, strong >= 60, weak <= 40"));
    }
}
