//! Technical indicator implementations.
//!
//! Every calculator takes the full bar history and returns an
//! [`IndicatorSeries`] aligned 1:1 with the input. Point `i` only ever reads
//! bars `0..=i`; points inside the warmup window are marked `valid: false`.
//!
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod frame;
pub mod keltner;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use frame::{IndicatorFrame, MIN_BARS, compute};
pub use keltner::calculate_keltner;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Band {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Keltner {
        period: usize,
        atr_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The value at `index`, or `None` when out of range or still warming up.
    pub fn value_at(&self, index: usize) -> Option<IndicatorValue> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    /// Scalar column for single-valued indicators.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| match (p.valid, p.value) {
                (true, IndicatorValue::Simple(v)) => Some(v),
                _ => None,
            })
            .collect()
    }
}

/// Series with every point invalid, used when inputs cannot produce values.
pub(crate) fn invalid_series(
    indicator_type: IndicatorType,
    dates: impl Iterator<Item = NaiveDate>,
    value: IndicatorValue,
) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type,
        values: dates
            .map(|date| IndicatorPoint {
                date,
                valid: false,
                value,
            })
            .collect(),
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Keltner {
                period,
                atr_mult_x100,
            } => {
                let mult = *atr_mult_x100 as f64 / 100.0;
                write!(f, "KELTNER({},{})", period, mult)
            }
        }
    }
}
