//! Daily OHLCV price bar.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// A bar with no intraday range, typical of end-of-day NAV quotes.
    pub fn is_flat(&self) -> bool {
        self.high == self.low
    }
}

/// True when dates are strictly increasing (sorted, no duplicates).
pub fn is_strictly_ordered(bars: &[PriceBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_bar() {
        let mut bar = sample_bar();
        assert!(!bar.is_flat());
        bar.high = 100.0;
        bar.low = 100.0;
        assert!(bar.is_flat());
    }

    #[test]
    fn ordering_rejects_duplicates() {
        let a = sample_bar();
        let mut b = sample_bar();
        assert!(!is_strictly_ordered(&[a.clone(), b.clone()]));
        b.date = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert!(is_strictly_ordered(&[a.clone(), b.clone()]));
        assert!(!is_strictly_ordered(&[b, a]));
    }

    #[test]
    fn ordering_trivial_cases() {
        assert!(is_strictly_ordered(&[]));
        assert!(is_strictly_ordered(&[sample_bar()]));
    }
}
