//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, invalid_series,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    let empty = IndicatorValue::Macd {
        line: 0.0,
        signal: 0.0,
        histogram: 0.0,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return invalid_series(indicator_type, bars.iter().map(|b| b.date), empty);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The signal EMA is seeded from the first defined MACD values only.
    let line_start = fast.max(slow) - 1;
    let mut signal_line = vec![None; bars.len()];
    if bars.len() > line_start {
        let defined: Vec<f64> = macd_line[line_start..].iter().flatten().copied().collect();
        for (offset, v) in ema_values(&defined, signal_period).into_iter().enumerate() {
            signal_line[line_start + offset] = v;
        }
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match (macd_line[i], signal_line[i]) {
            (Some(line), Some(signal)) => IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            },
            _ => IndicatorPoint {
                date: bar.date,
                valid: false,
                value: empty,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
