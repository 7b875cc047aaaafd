//! Per-ticker evaluation pipeline.
//!
//! length check → liquidity filter → indicator frame → score + trade plan.
//! Every error on the way becomes [`EvaluationResult::Failure`]; nothing
//! escapes this boundary.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::currency::Currency;
use crate::domain::error::ScanError;
use crate::domain::indicator::frame::{self, IndicatorFrame, MIN_BARS};
use crate::domain::liquidity;
use crate::domain::ohlcv::PriceBar;
use crate::domain::plan::{self, TradePlan};
use crate::domain::score::{RuleSet, Tier};
use crate::ports::price_history_port::Lookback;

pub const DEFAULT_VOLUME_FLOOR: f64 = 1_000_000.0;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MIN_SCORE: u8 = 90;

/// Immutable settings shared by every evaluation in a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub volume_floor: f64,
    pub rule_set: RuleSet,
    pub max_concurrency: usize,
    pub fetch_timeout: Duration,
    pub lookback: Lookback,
    pub interval: String,
    pub min_score: u8,
}

impl ScanConfig {
    pub fn with_rule_set(rule_set: RuleSet) -> Self {
        Self {
            volume_floor: DEFAULT_VOLUME_FLOOR,
            rule_set,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            lookback: Lookback::default(),
            interval: "1d".to_string(),
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_rule_set(RuleSet::platinum())
    }
}

/// Coarse classification of a per-ticker failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientData,
    UnorderedBars,
    LowLiquidity,
    UndefinedVolatility,
    Provider,
    Timeout,
    Other,
}

impl From<&ScanError> for FailureKind {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::InsufficientData { .. } => FailureKind::InsufficientData,
            ScanError::UnorderedBars => FailureKind::UnorderedBars,
            ScanError::LowLiquidity { .. } => FailureKind::LowLiquidity,
            ScanError::UndefinedVolatility => FailureKind::UndefinedVolatility,
            ScanError::Provider { .. } => FailureKind::Provider,
            ScanError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EvaluationResult {
    Success {
        ticker: String,
        currency: Currency,
        price: f64,
        change_percent: f64,
        score: u8,
        tier: Tier,
        reasons: Vec<String>,
        squeeze: bool,
        trade_plan: Option<TradePlan>,
        is_fund_like: bool,
        rsi: Option<f64>,
        average_volume: f64,
    },
    Failure {
        ticker: String,
        kind: FailureKind,
        reason: String,
    },
}

impl EvaluationResult {
    pub fn failure(ticker: &str, err: &ScanError) -> Self {
        EvaluationResult::Failure {
            ticker: ticker.to_string(),
            kind: FailureKind::from(err),
            reason: err.to_string(),
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            EvaluationResult::Success { ticker, .. } | EvaluationResult::Failure { ticker, .. } => {
                ticker
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationResult::Success { .. })
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            EvaluationResult::Success { score, .. } => Some(*score),
            EvaluationResult::Failure { .. } => None,
        }
    }
}

pub fn evaluate(ticker: &str, bars: &[PriceBar], config: &ScanConfig) -> EvaluationResult {
    evaluate_with_frame(ticker, bars, config).0
}

/// Same as [`evaluate`], also handing back the indicator frame for charting.
/// The frame is `None` whenever the result is a failure.
pub fn evaluate_with_frame(
    ticker: &str,
    bars: &[PriceBar],
    config: &ScanConfig,
) -> (EvaluationResult, Option<IndicatorFrame>) {
    match try_evaluate(ticker, bars, config) {
        Ok((result, frame)) => {
            debug!(ticker, score = ?result.score(), "evaluated");
            (result, Some(frame))
        }
        Err(err) => {
            warn!(ticker, error = %err, "evaluation failed");
            (EvaluationResult::failure(ticker, &err), None)
        }
    }
}

fn try_evaluate(
    ticker: &str,
    bars: &[PriceBar],
    config: &ScanConfig,
) -> Result<(EvaluationResult, IndicatorFrame), ScanError> {
    if bars.len() < MIN_BARS {
        return Err(ScanError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    let average_volume = liquidity::require(bars, config.volume_floor)?;
    let frame = frame::compute(bars)?;

    let last = bars.len() - 1;
    let latest = &bars[last];
    let previous_close = bars[last - 1].close;

    let scored = config.rule_set.score(&frame);
    let trade_plan = match plan::plan(latest.close, frame.atr[last]) {
        Ok(p) => Some(p),
        Err(err) => {
            debug!(ticker, error = %err, "no trade plan");
            None
        }
    };

    let change_percent = if previous_close != 0.0 {
        (latest.close - previous_close) / previous_close * 100.0
    } else {
        0.0
    };

    let result = EvaluationResult::Success {
        ticker: ticker.to_string(),
        currency: Currency::from_ticker(ticker),
        price: latest.close,
        change_percent,
        score: scored.score,
        tier: scored.tier,
        reasons: scored.reasons,
        squeeze: frame.squeeze_at(last),
        trade_plan,
        is_fund_like: latest.is_flat(),
        rsi: frame.rsi[last],
        average_volume,
    };
    Ok((result, frame))
}
