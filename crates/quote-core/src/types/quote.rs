//! Quote (Open, High, Low, Close, Volume) and symbol types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market identifier (ticker).
///
/// The canonical name is trimmed and upper-cased, so `" kgh"` and `"KGH"`
/// refer to the same instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from a raw ticker.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_uppercase())
    }

    /// Canonical ticker name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One OHLCV record for a symbol at a point in time.
///
/// Daily records are stamped at midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument
    pub symbol: Symbol,
    /// Session day or intraday timestamp
    pub date: NaiveDateTime,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

impl Quote {
    /// Create a new quote.
    pub fn new(
        symbol: Symbol,
        date: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calendar day of the quote.
    #[inline]
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Copy of this quote re-dated to another session day.
    ///
    /// Used when a day has no record for the symbol and the last known
    /// values are carried forward.
    pub fn carried_to(&self, day: NaiveDate) -> Self {
        Self {
            date: day.and_time(chrono::NaiveTime::MIN),
            ..self.clone()
        }
    }

    /// Price range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
