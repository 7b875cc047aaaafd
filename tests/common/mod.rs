#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use sniperscan::domain::error::ScanError;
pub use sniperscan::domain::ohlcv::PriceBar;
use sniperscan::ports::price_history_port::{Lookback, PriceHistoryProvider};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory provider with per-ticker errors and delays. Tracks how many
/// fetches are in flight at once.
#[derive(Default)]
pub struct MockProvider {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub delays: HashMap<String, Duration>,
    pub panics: Vec<String>,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub fetched: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_delay(mut self, ticker: &str, delay: Duration) -> Self {
        self.delays.insert(ticker.to_string(), delay);
        self
    }

    pub fn with_panic(mut self, ticker: &str) -> Self {
        self.panics.push(ticker.to_string());
        self
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for MockProvider {
    async fn fetch(
        &self,
        ticker: &str,
        _lookback: Lookback,
        _interval: &str,
    ) -> Result<Vec<PriceBar>, ScanError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(ticker.to_string());

        let delay = self
            .delays
            .get(ticker)
            .copied()
            .unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panics.iter().any(|t| t == ticker) {
            panic!("provider blew up on {}", ticker);
        }
        if let Some(reason) = self.errors.get(ticker) {
            return Err(ScanError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bars from a close series, one per calendar day, range ±1 around close.
pub fn bars_from_closes(closes: &[f64], volume: i64) -> Vec<PriceBar> {
    let start = date(2023, 1, 2);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        })
        .collect()
}

/// Flat tape: every bar opens, closes and trades at `price`.
pub fn flat_bars(count: usize, price: f64, volume: i64) -> Vec<PriceBar> {
    let start = date(2023, 1, 2);
    (0..count)
        .map(|i| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        })
        .collect()
}

/// Net uptrend with regular pullbacks (+2, +2, -2), RSI settles near 67.
pub fn uptrend_bars(count: usize, volume: i64) -> Vec<PriceBar> {
    let mut close = 100.0;
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            close += if i % 3 == 2 { -2.0 } else { 2.0 };
            close
        })
        .collect();
    bars_from_closes(&closes, volume)
}

/// Mirror image of [`uptrend_bars`].
pub fn downtrend_bars(count: usize, volume: i64) -> Vec<PriceBar> {
    let mut close = 500.0;
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            close += if i % 3 == 2 { 2.0 } else { -2.0 };
            close
        })
        .collect();
    bars_from_closes(&closes, volume)
}

pub fn csv_content(bars: &[PriceBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
