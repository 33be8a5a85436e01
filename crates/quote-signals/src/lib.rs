//! Signal generators over quote chains.
//!
//! This crate provides the moving-average crossover generators:
//! - HMAC: Hull moving average crossover with a momentum filter
//! - MAVD: EMA divergence against its signal line
//!
//! Generators are created from typed configurations or by name through the
//! [`GeneratorRegistry`], and run with [`evaluate_signal`].

pub mod evaluate;
pub mod hmac;
pub mod mavd;
pub mod registry;

pub use evaluate::{evaluate, evaluate_signal, Evaluation, GeneratorConfig, SignalOutput};
pub use hmac::{HmacConfig, HmacGenerator};
pub use mavd::{MavdConfig, MavdGenerator};
pub use registry::{GeneratorInfo, GeneratorRegistry};

#[cfg(test)]
pub(crate) fn test_chain(closes: &[f64]) -> quote_core::types::QuoteChain {
    use chrono::{Duration, NaiveDate};
    use quote_core::types::{Quote, QuoteChain, Symbol};

    let start = NaiveDate::from_ymd_opt(2012, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    QuoteChain::from_quotes(closes.iter().enumerate().map(|(i, &close)| {
        Quote::new(
            Symbol::new("KGHM"),
            start + Duration::days(i as i64),
            close,
            close.max(close * 1.01),
            close.min(close * 0.99),
            close,
            500,
        )
    }))
    .unwrap()
}
