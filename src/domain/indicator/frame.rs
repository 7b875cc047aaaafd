//! Per-bar indicator frame: every derived column the scorer and trade plan read.
//!
//! Columns are aligned 1:1 with the input bars. A column holds `None` until its
//! window is filled, e.g. `sma200` is `None` for the first 199 bars.

use serde::Serialize;
use std::fmt;

use crate::domain::error::ScanError;
use crate::domain::indicator::{
    IndicatorPoint, IndicatorValue, atr, bollinger, calculate_atr, calculate_bollinger, calculate_keltner,
    calculate_macd, calculate_rsi, calculate_sma, keltner, macd, rsi,
};
use crate::domain::ohlcv::{PriceBar, is_strictly_ordered};

/// Bars required before the frame is considered stable enough to score.
pub const MIN_BARS: usize = 50;

/// A named column of the frame, addressable from rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Sma20,
    Sma50,
    Sma200,
    Rsi,
    MacdLine,
    MacdSignal,
    Atr,
    BollingerUpper,
    BollingerLower,
    BollingerWidth,
    KeltnerUpper,
    KeltnerLower,
}

/// Renders the field the way the rule parser reads it.
impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameField::Open => "open",
            FrameField::High => "high",
            FrameField::Low => "low",
            FrameField::Close => "close",
            FrameField::Volume => "volume",
            FrameField::Sma20 => "SMA(20)",
            FrameField::Sma50 => "SMA(50)",
            FrameField::Sma200 => "SMA(200)",
            FrameField::Rsi => "RSI(14)",
            FrameField::MacdLine => "MACD_LINE",
            FrameField::MacdSignal => "MACD_SIGNAL",
            FrameField::Atr => "ATR(14)",
            FrameField::BollingerUpper => "BOLLINGER_UPPER",
            FrameField::BollingerLower => "BOLLINGER_LOWER",
            FrameField::BollingerWidth => "BOLLINGER_WIDTH",
            FrameField::KeltnerUpper => "KELTNER_UPPER",
            FrameField::KeltnerLower => "KELTNER_LOWER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub bars: Vec<PriceBar>,
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
    pub sma200: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd_line: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub bb_width: Vec<Option<f64>>,
    pub kc_upper: Vec<Option<f64>>,
    pub kc_lower: Vec<Option<f64>>,
    pub squeeze: Vec<bool>,
}

/// Builds the frame. Fails with `InsufficientData` below [`MIN_BARS`] and
/// with `UnorderedBars` when dates are not strictly increasing.
pub fn compute(bars: &[PriceBar]) -> Result<IndicatorFrame, ScanError> {
    if bars.len() < MIN_BARS {
        return Err(ScanError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    if !is_strictly_ordered(bars) {
        return Err(ScanError::UnorderedBars);
    }

    let macd = calculate_macd(
        bars,
        macd::DEFAULT_FAST,
        macd::DEFAULT_SLOW,
        macd::DEFAULT_SIGNAL,
    );
    let (macd_line, macd_signal): (Vec<Option<f64>>, Vec<Option<f64>>) = macd
        .values
        .iter()
        .map(|p| match (p.valid, p.value) {
            (true, IndicatorValue::Macd { line, signal, .. }) => (Some(line), Some(signal)),
            _ => (None, None),
        })
        .unzip();

    let (bb_upper, bb_lower, bb_mid) = split_band(
        &calculate_bollinger(
            bars,
            bollinger::DEFAULT_PERIOD,
            bollinger::DEFAULT_STDDEV_MULT_X100,
        )
        .values,
    );
    let (kc_upper, kc_lower, _) = split_band(
        &calculate_keltner(
            bars,
            keltner::DEFAULT_PERIOD,
            atr::DEFAULT_PERIOD,
            keltner::DEFAULT_ATR_MULT_X100,
        )
        .values,
    );

    let bb_width = bb_upper
        .iter()
        .zip(&bb_lower)
        .zip(&bb_mid)
        .map(|((u, l), m)| match (u, l, m) {
            (Some(u), Some(l), Some(m)) if *m != 0.0 => Some((u - l) / m),
            _ => None,
        })
        .collect();

    let squeeze = (0..bars.len())
        .map(|i| is_squeeze(bb_upper[i], bb_lower[i], kc_upper[i], kc_lower[i]))
        .collect();

    Ok(IndicatorFrame {
        bars: bars.to_vec(),
        sma20: calculate_sma(bars, 20).simple_values(),
        sma50: calculate_sma(bars, 50).simple_values(),
        sma200: calculate_sma(bars, 200).simple_values(),
        rsi: calculate_rsi(bars, rsi::DEFAULT_PERIOD).simple_values(),
        macd_line,
        macd_signal,
        atr: calculate_atr(bars, atr::DEFAULT_PERIOD).simple_values(),
        bb_upper,
        bb_lower,
        bb_width,
        kc_upper,
        kc_lower,
        squeeze,
    })
}

/// Bollinger band fully inside the Keltner channel. Undefined bands never squeeze.
pub fn is_squeeze(
    bb_upper: Option<f64>,
    bb_lower: Option<f64>,
    kc_upper: Option<f64>,
    kc_lower: Option<f64>,
) -> bool {
    match (bb_upper, bb_lower, kc_upper, kc_lower) {
        (Some(bu), Some(bl), Some(ku), Some(kl)) => bu < ku && bl > kl,
        _ => false,
    }
}

type BandColumns = (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>);

fn split_band(points: &[IndicatorPoint]) -> BandColumns {
    let mut upper = Vec::with_capacity(points.len());
    let mut lower = Vec::with_capacity(points.len());
    let mut middle = Vec::with_capacity(points.len());
    for p in points {
        match (p.valid, p.value) {
            (
                true,
                IndicatorValue::Band {
                    upper: u,
                    middle: m,
                    lower: l,
                },
            ) => {
                upper.push(Some(u));
                lower.push(Some(l));
                middle.push(Some(m));
            }
            _ => {
                upper.push(None);
                lower.push(None);
                middle.push(None);
            }
        }
    }
    (upper, lower, middle)
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    /// Value of `field` at `index`; `None` while the column is warming up.
    pub fn value(&self, field: FrameField, index: usize) -> Option<f64> {
        let bar = self.bars.get(index)?;
        match field {
            FrameField::Open => Some(bar.open),
            FrameField::High => Some(bar.high),
            FrameField::Low => Some(bar.low),
            FrameField::Close => Some(bar.close),
            FrameField::Volume => Some(bar.volume as f64),
            FrameField::Sma20 => self.sma20[index],
            FrameField::Sma50 => self.sma50[index],
            FrameField::Sma200 => self.sma200[index],
            FrameField::Rsi => self.rsi[index],
            FrameField::MacdLine => self.macd_line[index],
            FrameField::MacdSignal => self.macd_signal[index],
            FrameField::Atr => self.atr[index],
            FrameField::BollingerUpper => self.bb_upper[index],
            FrameField::BollingerLower => self.bb_lower[index],
            FrameField::BollingerWidth => self.bb_width[index],
            FrameField::KeltnerUpper => self.kc_upper[index],
            FrameField::KeltnerLower => self.kc_lower[index],
        }
    }

    pub fn squeeze_at(&self, index: usize) -> bool {
        self.squeeze.get(index).copied().unwrap_or(false)
    }
}
