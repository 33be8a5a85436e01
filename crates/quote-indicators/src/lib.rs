//! Technical indicators over quote chains.
//!
//! This crate provides pure indicator functions evaluated at a position of a
//! [`QuoteChain`](quote_core::types::QuoteChain):
//! - Moving averages (SMA, EMA, WMA, HMA)
//! - Momentum (close derivative, EMA of the derivative)
//!
//! Each indicator walks `prev` links for its lookback window and keeps no
//! state, so generators can share them freely.

pub mod momentum;
pub mod moving_average;

pub use momentum::{derivative, emad, Derivative, Emad};
pub use moving_average::{
    ema, hma, hma_required_history, sma, wma, Ema, Hma, Sma, StreamingEma, Wma,
};

#[cfg(test)]
pub(crate) fn test_chain(closes: &[f64]) -> quote_core::types::QuoteChain {
    use chrono::{Duration, NaiveDate};
    use quote_core::types::{Quote, QuoteChain, Symbol};

    let start = NaiveDate::from_ymd_opt(2011, 1, 3)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    QuoteChain::from_quotes(closes.iter().enumerate().map(|(i, &close)| {
        Quote::new(
            Symbol::new("TEST"),
            start + Duration::days(i as i64),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1000,
        )
    }))
    .unwrap()
}
