//! Quote stream dialects and their detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fields in an intraday record.
pub const INTRADAY_FIELDS: usize = 10;

/// Text layout of a quote stream.
///
/// Fixed once per stream by [`detect`] on the first non-empty line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Nothing to detect from
    Unknown,
    /// Daily records preceded by a `<TICKER>,<DTYYYYMMDD>,...` header
    Tagged,
    /// `ticker,reserved,yyyyMMdd,hhmmss,O,H,L,C,volume,open-interest`
    Intraday,
    /// `ticker,yyyyMMdd,O,H,L,C,volume[,open-interest]`
    Daily,
    /// Daily records preceded by a quoted header
    Quoted,
}

impl Format {
    /// Whether header lines may appear between records.
    pub fn has_headers(self) -> bool {
        matches!(self, Format::Tagged | Format::Quoted)
    }

    /// Whether this line is a header of a header-bearing dialect.
    pub fn is_header(line: &str) -> bool {
        line.starts_with('<') || line.starts_with('"')
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Unknown => "unknown",
            Format::Tagged => "tagged",
            Format::Intraday => "intraday",
            Format::Daily => "daily",
            Format::Quoted => "quoted",
        };
        f.write_str(s)
    }
}

/// Detect the dialect of a stream from its first non-empty line.
pub fn detect(first_line: &str) -> Format {
    let line = first_line.trim_start();
    if line.is_empty() {
        Format::Unknown
    } else if line.starts_with('"') {
        Format::Quoted
    } else if line.starts_with('<') {
        Format::Tagged
    } else if line.split(',').count() == INTRADAY_FIELDS {
        Format::Intraday
    } else {
        Format::Daily
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(
            detect("<TICKER>,<DTYYYYMMDD>,<OPEN>,<HIGH>,<LOW>,<CLOSE>,<VOL>"),
            Format::Tagged
        );
        assert_eq!(
            detect("\"Ticker\",\"Date\",\"Open\",\"High\",\"Low\",\"Close\",\"Volume\""),
            Format::Quoted
        );
        assert_eq!(
            detect("KGH,0,20110104,90000,142.5,143.0,142.0,142.8,1200,0"),
            Format::Intraday
        );
        assert_eq!(
            detect("KGH,20110104,142.5,143.0,142.0,142.8,120000"),
            Format::Daily
        );
        assert_eq!(
            detect("FW20H11,20110104,2700,2720,2690,2710,5000,31000"),
            Format::Daily
        );
        assert_eq!(detect("   "), Format::Unknown);
    }

    #[test]
    fn test_headers() {
        assert!(Format::Tagged.has_headers());
        assert!(Format::Quoted.has_headers());
        assert!(!Format::Daily.has_headers());
        assert!(Format::is_header("<TICKER>"));
        assert!(!Format::is_header("KGH,20110104"));
    }
}
