//! Ticker universe built from configured watchlists.
//!
//! Watchlists are comma-separated ticker lists. The scan universe is their
//! union: tokens trimmed and upper-cased, blanks skipped, first occurrence
//! wins so the configured order is preserved.

use std::collections::HashSet;

use crate::ports::config_port::ConfigPort;

/// Watchlist keys read from `[watchlists]`, in merge order.
pub const WATCHLIST_KEYS: [&str; 4] = ["family", "etf", "watch", "market"];

#[derive(Debug, Clone, PartialEq)]
pub struct Watchlist {
    pub name: String,
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    pub tickers: Vec<String>,
}

impl Universe {
    /// Union of watchlists, de-duplicated in first-seen order.
    pub fn from_watchlists(lists: &[Watchlist]) -> Self {
        let mut seen = HashSet::new();
        let mut tickers = Vec::new();
        for list in lists {
            for ticker in &list.tickers {
                if seen.insert(ticker.clone()) {
                    tickers.push(ticker.clone());
                }
            }
        }
        Self { tickers }
    }
}

pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Reads every known watchlist that is present in the config.
pub fn load_watchlists(config: &dyn ConfigPort) -> Vec<Watchlist> {
    WATCHLIST_KEYS
        .iter()
        .filter_map(|key| {
            config.get_string("watchlists", key).map(|raw| Watchlist {
                name: key.to_string(),
                tickers: parse_tickers(&raw),
            })
        })
        .collect()
}
