//! Startup validation of scan and scoring configuration.
//!
//! Every check here is fatal: a bad config stops the process before any
//! ticker is fetched.

use crate::domain::error::ScanError;
use crate::domain::score::{PRESET_NAMES, RuleSet, TierThresholds};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_history_port::Lookback;

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_volume_floor(config)?;
    validate_max_concurrency(config)?;
    validate_fetch_timeout(config)?;
    validate_lookback(config)?;
    validate_interval(config)?;
    validate_min_score(config)?;
    Ok(())
}

pub fn validate_scoring_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_preset(config)?;
    validate_tiers(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScanError {
    ScanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Integer value of `section.key`, `default` when absent. A value that is
/// present but not an integer is a config error, never silently defaulted.
pub fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, ScanError> {
    config
        .get_int(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|e| invalid(section, key, &format!("{} must be an integer: {}", key, e)))
}

pub fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ScanError> {
    config
        .get_double(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|e| invalid(section, key, &format!("{} must be a number: {}", key, e)))
}

fn validate_volume_floor(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let value = read_double(config, "scan", "volume_floor", 0.0)?;
    if value < 0.0 || !value.is_finite() {
        return Err(invalid("scan", "volume_floor", "volume_floor must be non-negative"));
    }
    Ok(())
}

fn validate_max_concurrency(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let value = read_int(config, "scan", "max_concurrency", 1)?;
    if value < 1 {
        return Err(invalid("scan", "max_concurrency", "max_concurrency must be at least 1"));
    }
    Ok(())
}

fn validate_fetch_timeout(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let value = read_int(config, "scan", "fetch_timeout_secs", 1)?;
    if value <= 0 {
        return Err(invalid("scan", "fetch_timeout_secs", "fetch_timeout_secs must be positive"));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), ScanError> {
    if let Some(raw) = config.get_string("scan", "lookback") {
        raw.parse::<Lookback>()
            .map_err(|reason| invalid("scan", "lookback", &reason))?;
    }
    Ok(())
}

fn validate_interval(config: &dyn ConfigPort) -> Result<(), ScanError> {
    if let Some(raw) = config.get_string("scan", "interval") {
        if raw.trim().is_empty() {
            return Err(invalid("scan", "interval", "interval must not be empty"));
        }
    }
    Ok(())
}

fn validate_min_score(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let value = read_int(config, "scan", "min_score", 0)?;
    if !(0..=100).contains(&value) {
        return Err(invalid("scan", "min_score", "min_score must be between 0 and 100"));
    }
    Ok(())
}

fn validate_preset(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let Some(preset) = config.get_string("scoring", "preset") else {
        return Ok(());
    };
    let preset = preset.trim().to_lowercase();
    if preset != "custom" && !PRESET_NAMES.contains(&preset.as_str()) {
        return Err(invalid(
            "scoring",
            "preset",
            &format!("unknown preset '{}', expected one of {}, custom", preset, PRESET_NAMES.join(", ")),
        ));
    }
    Ok(())
}

/// Reads a 0-100 threshold, `None` when the key is absent.
pub fn read_threshold(config: &dyn ConfigPort, key: &str) -> Result<Option<u8>, ScanError> {
    let Some(raw) = config.get_string("scoring", key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|v| *v <= 100)
        .map(Some)
        .ok_or_else(|| invalid("scoring", key, "threshold must be an integer between 0 and 100"))
}

/// Applies any `elite`/`strong`/`weak` overrides on top of `base`.
pub fn resolve_tiers(
    config: &dyn ConfigPort,
    base: TierThresholds,
) -> Result<TierThresholds, ScanError> {
    let tiers = TierThresholds {
        elite: read_threshold(config, "elite")?.unwrap_or(base.elite),
        strong: read_threshold(config, "strong")?.unwrap_or(base.strong),
        weak: read_threshold(config, "weak")?.unwrap_or(base.weak),
    };
    tiers.validate()?;
    Ok(tiers)
}

fn validate_tiers(config: &dyn ConfigPort) -> Result<(), ScanError> {
    // partial overrides fill in from the selected preset, platinum for custom
    let base = config
        .get_string("scoring", "preset")
        .and_then(|name| RuleSet::preset(&name))
        .unwrap_or_else(RuleSet::platinum)
        .tiers;
    resolve_tiers(config, base).map(|_| ())
}
