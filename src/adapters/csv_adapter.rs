//! CSV price history adapter.
//!
//! One file per ticker at `<base_path>/<TICKER>.csv` with the header
//! `date,open,high,low,close,volume` and ISO dates.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::error::ScanError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::price_history_port::{Lookback, PriceHistoryProvider};

pub const SUPPORTED_INTERVAL: &str = "1d";

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn provider_error(reason: String) -> ScanError {
    ScanError::Provider { reason }
}

/// Parses CSV content into bars sorted by date. Duplicate dates are rejected.
pub fn parse_bars(content: &str) -> Result<Vec<PriceBar>, ScanError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut bars = Vec::new();
    for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(|e| provider_error(format!("CSV parse error: {}", e)))?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
            provider_error(format!("invalid date '{}' on row {}: {}", row.date, line + 1, e))
        })?;
        bars.push(PriceBar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.round() as i64,
        });
    }

    bars.sort_by_key(|b| b.date);
    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(provider_error(format!("duplicate bar for {}", pair[0].date)));
    }
    Ok(bars)
}

/// Keeps the bars inside `lookback`, measured back from the newest bar.
pub fn trim_to_lookback(bars: Vec<PriceBar>, lookback: Lookback) -> Vec<PriceBar> {
    let Some(last) = bars.last().map(|b| b.date) else {
        return bars;
    };
    // a window reaching past the calendar keeps everything
    let Some(cutoff) =
        Duration::try_days(lookback.days()).and_then(|span| last.checked_sub_signed(span))
    else {
        return bars;
    };
    bars.into_iter().filter(|b| b.date > cutoff).collect()
}

#[async_trait]
impl PriceHistoryProvider for CsvAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: &str,
    ) -> Result<Vec<PriceBar>, ScanError> {
        if interval != SUPPORTED_INTERVAL {
            return Err(provider_error(format!(
                "interval '{}' not available from CSV files, only {}",
                interval, SUPPORTED_INTERVAL
            )));
        }

        let path = self.csv_path(ticker);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| provider_error(format!("failed to read {}: {}", path.display(), e)))?;

        let bars = parse_bars(&content)?;
        Ok(trim_to_lookback(bars, lookback))
    }
}
