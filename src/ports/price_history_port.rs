//! Price history port.
//!
//! The only suspension point in a scan is fetching bars, so this is the one
//! async capability the core depends on. Implementations return raw bars in
//! any order; the evaluator validates ordering itself.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::ScanError;
use crate::domain::ohlcv::PriceBar;

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: &str,
    ) -> Result<Vec<PriceBar>, ScanError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// Longest accepted lookback, one hundred years of calendar days.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// How far back to fetch, e.g. `2y`, `6mo`, `90d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    pub count: u32,
    pub unit: LookbackUnit,
}

impl Lookback {
    pub fn years(count: u32) -> Self {
        Self {
            count,
            unit: LookbackUnit::Years,
        }
    }

    /// Calendar days covered, months counted as 30 and years as 365.
    pub fn days(&self) -> i64 {
        let per_unit = match self.unit {
            LookbackUnit::Days => 1,
            LookbackUnit::Weeks => 7,
            LookbackUnit::Months => 30,
            LookbackUnit::Years => 365,
        };
        i64::from(self.count) * per_unit
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::years(2)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            LookbackUnit::Days => "d",
            LookbackUnit::Weeks => "w",
            LookbackUnit::Months => "mo",
            LookbackUnit::Years => "y",
        };
        write!(f, "{}{}", self.count, suffix)
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, suffix) = s.split_at(split);

        let count: u32 = digits
            .parse()
            .map_err(|_| format!("expected a number before the unit in '{}'", s))?;
        if count == 0 {
            return Err("lookback must be at least 1".to_string());
        }
        let unit = match suffix {
            "d" => LookbackUnit::Days,
            "w" | "wk" => LookbackUnit::Weeks,
            "mo" => LookbackUnit::Months,
            "y" => LookbackUnit::Years,
            other => return Err(format!("unknown lookback unit '{}'", other)),
        };
        let lookback = Self { count, unit };
        if lookback.days() > MAX_LOOKBACK_DAYS {
            return Err(format!(
                "lookback '{}' exceeds {} days",
                lookback, MAX_LOOKBACK_DAYS
            ));
        }
        Ok(lookback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!("2y".parse::<Lookback>().unwrap(), Lookback::years(2));
        assert_eq!(
            "6mo".parse::<Lookback>().unwrap(),
            Lookback {
                count: 6,
                unit: LookbackUnit::Months
            }
        );
        assert_eq!("90D".parse::<Lookback>().unwrap().days(), 90);
        assert_eq!("3w".parse::<Lookback>().unwrap().days(), 21);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Lookback>().is_err());
        assert!("y".parse::<Lookback>().is_err());
        assert!("0y".parse::<Lookback>().is_err());
        assert!("2h".parse::<Lookback>().is_err());
    }

    #[test]
    fn parse_bounds_total_days() {
        assert_eq!("100y".parse::<Lookback>().unwrap().days(), MAX_LOOKBACK_DAYS);
        assert!("101y".parse::<Lookback>().is_err());
        assert!("1000000y".parse::<Lookback>().is_err());
        assert!("36501d".parse::<Lookback>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for s in ["2y", "6mo", "90d", "3w"] {
            assert_eq!(s.parse::<Lookback>().unwrap().to_string(), s);
        }
    }
}
