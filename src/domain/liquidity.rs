//! Liquidity filter: skip instruments nobody is trading.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::PriceBar;

/// Number of most recent bars averaged for the volume check.
pub const VOLUME_WINDOW: usize = 5;

/// Mean volume over the last `window` bars (fewer if the history is shorter).
pub fn average_volume(bars: &[PriceBar], window: usize) -> Option<f64> {
    if bars.is_empty() || window == 0 {
        return None;
    }
    let tail = &bars[bars.len().saturating_sub(window)..];
    let total: f64 = tail.iter().map(|b| b.volume as f64).sum();
    Some(total / tail.len() as f64)
}

/// True when the recent average volume meets `volume_floor`.
pub fn check(bars: &[PriceBar], volume_floor: f64) -> bool {
    require(bars, volume_floor).is_ok()
}

/// Like [`check`] but reports the measured average on failure.
/// Returns the average volume when the filter passes.
pub fn require(bars: &[PriceBar], volume_floor: f64) -> Result<f64, ScanError> {
    let average = average_volume(bars, VOLUME_WINDOW).unwrap_or(0.0);
    if average < volume_floor {
        return Err(ScanError::LowLiquidity {
            average_volume: average,
            floor: volume_floor,
        });
    }
    Ok(average)
}
