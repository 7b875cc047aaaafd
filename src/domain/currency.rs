//! Quote currency inferred from the ticker's exchange suffix.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Currency {
    Usd,
    Jpy,
    Twd,
}

impl Currency {
    /// `.TW` and `.TWO` trade in New Taiwan dollars, `.T` (Tokyo) and `.F`
    /// (Fukuoka) in yen, everything else is quoted in US dollars.
    pub fn from_ticker(ticker: &str) -> Self {
        let upper = ticker.trim().to_uppercase();
        match upper.rsplit_once('.') {
            Some((_, "TW" | "TWO")) => Currency::Twd,
            Some((_, "T" | "F")) => Currency::Jpy,
            _ => Currency::Usd,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Jpy => "¥",
            Currency::Twd => "NT$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
