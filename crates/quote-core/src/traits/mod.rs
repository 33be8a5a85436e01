//! Core traits for the quote engine.

mod generator;
mod indicator;
mod provider;

pub use generator::{check_window, Parameters, SignalGenerator, WindowConfig, MIN_WINDOW};
pub use indicator::ChainIndicator;
pub use provider::{EmptyRegistry, HistoryProvider, HistoryScope, QuoteRegistry};
