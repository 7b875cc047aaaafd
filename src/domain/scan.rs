//! Batch scan over a ticker universe.
//!
//! Tickers are independent: each one runs in its own task, a semaphore
//! bounds how many fetch at once, and every fetch has its own timeout. A
//! failing, slow or panicking ticker only ever produces a `Failure` for
//! itself.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::domain::error::ScanError;
use crate::domain::evaluator::{self, EvaluationResult, ScanConfig};
use crate::ports::price_history_port::PriceHistoryProvider;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// One entry per input ticker, in input order.
    pub results: Vec<EvaluationResult>,
}

impl ScanReport {
    /// Successes scoring at least `min_score`, best first. Ties keep
    /// input order.
    pub fn gems(&self, min_score: u8) -> Vec<&EvaluationResult> {
        let mut gems: Vec<&EvaluationResult> = self
            .results
            .iter()
            .filter(|r| r.score().is_some_and(|s| s >= min_score))
            .collect();
        gems.sort_by(|a, b| b.score().cmp(&a.score()));
        gems
    }

    pub fn successes(&self) -> Vec<&EvaluationResult> {
        self.results.iter().filter(|r| r.is_success()).collect()
    }

    pub fn failures(&self) -> Vec<&EvaluationResult> {
        self.results.iter().filter(|r| !r.is_success()).collect()
    }
}

pub async fn scan(
    provider: Arc<dyn PriceHistoryProvider>,
    tickers: &[String],
    config: Arc<ScanConfig>,
) -> ScanReport {
    let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, ticker) in tickers.iter().enumerate() {
        let provider = Arc::clone(&provider);
        let config = Arc::clone(&config);
        let permits = Arc::clone(&permits);
        let ticker = ticker.clone();

        tasks.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => scan_one(provider.as_ref(), &ticker, &config).await,
                Err(_) => EvaluationResult::failure(
                    &ticker,
                    &ScanError::Provider {
                        reason: "worker pool closed".to_string(),
                    },
                ),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<EvaluationResult>> = vec![None; tickers.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(err) => warn!(error = %err, "scan task did not complete"),
        }
    }

    let results: Vec<EvaluationResult> = slots
        .into_iter()
        .zip(tickers)
        .map(|(slot, ticker)| {
            slot.unwrap_or_else(|| {
                EvaluationResult::failure(
                    ticker,
                    &ScanError::Provider {
                        reason: "evaluation task aborted".to_string(),
                    },
                )
            })
        })
        .collect();

    let report = ScanReport { results };
    info!(
        tickers = tickers.len(),
        succeeded = report.successes().len(),
        failed = report.failures().len(),
        "scan complete"
    );
    report
}

async fn scan_one(
    provider: &dyn PriceHistoryProvider,
    ticker: &str,
    config: &ScanConfig,
) -> EvaluationResult {
    let fetch = provider.fetch(ticker, config.lookback, &config.interval);
    let bars = match tokio::time::timeout(config.fetch_timeout, fetch).await {
        Ok(Ok(bars)) => bars,
        Ok(Err(err)) => {
            warn!(ticker, error = %err, "fetch failed");
            return EvaluationResult::failure(ticker, &err);
        }
        Err(_) => {
            let err = ScanError::Timeout {
                seconds: config.fetch_timeout.as_secs(),
            };
            warn!(ticker, error = %err, "fetch timed out");
            return EvaluationResult::failure(ticker, &err);
        }
    };
    evaluator::evaluate(ticker, &bars, config)
}
