//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low, TR[i] = max(high-low, |high-prevClose|, |low-prevClose|).
//! Seed: mean of the first n true ranges, then ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, invalid_series,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period {
        return invalid_series(
            IndicatorType::Atr(period),
            bars.iter().map(|b| b.date),
            IndicatorValue::Simple(0.0),
        );
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let mut results: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let valid = i + 1 >= period;
        if i + 1 == period {
            atr = tr_values[..period].iter().sum::<f64>() / period as f64;
        } else if valid {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        }

        results.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(if valid { atr } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values: results,
    }
}
