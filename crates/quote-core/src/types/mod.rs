//! Core data types for the quote engine.

mod chain;
mod quote;
mod signal;

pub use chain::{QuoteChain, QuoteId, QuoteRef};
pub use quote::{Quote, Symbol};
pub use signal::{Signal, SignalType, SignalValue};
