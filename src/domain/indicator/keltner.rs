//! Keltner Channel around the close SMA.
//!
//! Middle = SMA(n) of close, Upper/Lower = Middle ± multiplier × ATR(atr_period).
//! A point is valid only once both the SMA and the ATR are defined.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, calculate_atr, calculate_sma,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_ATR_MULT_X100: u32 = 150;

pub fn calculate_keltner(
    bars: &[PriceBar],
    period: usize,
    atr_period: usize,
    atr_mult_x100: u32,
) -> IndicatorSeries {
    let mult = atr_mult_x100 as f64 / 100.0;
    let sma = calculate_sma(bars, period).simple_values();
    let atr = calculate_atr(bars, atr_period).simple_values();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match (sma[i], atr[i]) {
            (Some(middle), Some(atr)) => IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Band {
                    upper: middle + mult * atr,
                    middle,
                    lower: middle - mult * atr,
                },
            },
            _ => IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Band {
                    upper: 0.0,
                    middle: 0.0,
                    lower: 0.0,
                },
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Keltner {
            period,
            atr_mult_x100,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(ranges: &[(f64, f64, f64)]) -> Vec<PriceBar> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high,
                low,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn keltner_constant_range() {
        let bars = make_bars(&[(102.0, 98.0, 100.0); 4]);
        let series = calculate_keltner(&bars, 3, 3, 150);

        assert!(!series.values[1].valid);
        match series.value_at(3) {
            Some(IndicatorValue::Band {
                upper,
                middle,
                lower,
            }) => {
                assert!((middle - 100.0).abs() < 1e-12);
                assert!((upper - 106.0).abs() < 1e-12);
                assert!((lower - 94.0).abs() < 1e-12);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn keltner_waits_for_slower_window() {
        let bars = make_bars(&[(102.0, 98.0, 100.0); 5]);
        let series = calculate_keltner(&bars, 2, 4, 150);

        assert!(!series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn keltner_indicator_type() {
        let series = calculate_keltner(&[], 20, 14, 150);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Keltner {
                period: 20,
                atr_mult_x100: 150
            }
        );
    }
}
