//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = EMA[i-1] + k*(C[i] - EMA[i-1]).
//! The incremental form keeps a constant input exactly constant.
//! Warmup: first (n-1) bars are invalid.

/// EMA over an arbitrary input column. MACD runs it over closes for the fast
/// and slow lines and over the defined MACD values for the signal line.
pub(crate) fn ema_values(input: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; input.len()];
    }

    let mut out = Vec::with_capacity(input.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in input.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema += k * (x - ema);
            out.push(Some(ema));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let values = ema_values(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert!(values[2..].iter().all(Option::is_some));
    }

    #[test]
    fn ema_period_1() {
        assert_eq!(
            ema_values(&[10.0, 20.0, 30.0], 1),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn ema_recursive_calculation() {
        let values = ema_values(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((values[2].unwrap() - sma).abs() < 1e-9);
        assert!((values[3].unwrap() - ema_3).abs() < 1e-9);
        assert!((values[4].unwrap() - ema_4).abs() < 1e-9);
    }

    #[test]
    fn ema_equal_prices() {
        for v in ema_values(&[100.0; 5], 3).iter().skip(2) {
            assert_eq!(v.unwrap(), 100.0);
        }
    }

    #[test]
    fn ema_empty_input() {
        assert!(ema_values(&[], 3).is_empty());
    }

    #[test]
    fn ema_period_0() {
        assert_eq!(ema_values(&[10.0, 20.0], 0), vec![None, None]);
    }
}
