//! Trading signals.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Quote, QuoteId, QuoteRef};

/// Signal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Wait => "WAIT",
        };
        f.write_str(s)
    }
}

/// Named diagnostic reading attached to a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalValue {
    pub name: String,
    pub value: f64,
}

/// Classification of one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Position of the triggering quote in its chain
    pub quote_id: QuoteId,
    /// Triggering quote
    pub quote: Quote,
    /// BUY, SELL or WAIT
    pub signal_type: SignalType,
    /// Ordered diagnostic values (verbose generators only)
    pub values: Vec<SignalValue>,
    /// Signed crossover magnitude
    pub level: f64,
}

impl Signal {
    /// Create a signal for a quote.
    pub fn new(quote: QuoteRef<'_>, signal_type: SignalType) -> Self {
        Self {
            quote_id: quote.id(),
            quote: quote.quote().clone(),
            signal_type,
            values: Vec::new(),
            level: 0.0,
        }
    }

    /// WAIT signal for a quote.
    pub fn wait(quote: QuoteRef<'_>) -> Self {
        Self::new(quote, SignalType::Wait)
    }

    /// Set the crossover level.
    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    /// Append a diagnostic value.
    pub fn add_value(&mut self, name: &str, value: f64) {
        self.values.push(SignalValue {
            name: name.to_string(),
            value,
        });
    }

    /// Look up a diagnostic value by name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    #[inline]
    pub fn is_buy(&self) -> bool {
        self.signal_type == SignalType::Buy
    }

    #[inline]
    pub fn is_sell(&self) -> bool {
        self.signal_type == SignalType::Sell
    }
}
