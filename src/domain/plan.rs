//! ATR-based trade plan.
//!
//! Stop sits two ATRs below the close, target three ATRs above, so the
//! reward-to-risk ratio is fixed at 1.5.

use serde::Serialize;

use crate::domain::error::ScanError;

pub const STOP_ATR_MULT: f64 = 2.0;
pub const TARGET_ATR_MULT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePlan {
    pub stop: f64,
    pub target: f64,
    pub risk_reward: f64,
}

pub fn plan(close: f64, atr: Option<f64>) -> Result<TradePlan, ScanError> {
    let atr = match atr {
        Some(a) if a.is_finite() && a > 0.0 => a,
        _ => return Err(ScanError::UndefinedVolatility),
    };

    Ok(TradePlan {
        stop: close - STOP_ATR_MULT * atr,
        target: close + TARGET_ATR_MULT * atr,
        risk_reward: TARGET_ATR_MULT / STOP_ATR_MULT,
    })
}
