//! Signal generator trait definitions.

use crate::error::GeneratorError;
use crate::types::{QuoteChain, QuoteRef, Signal};
use std::collections::BTreeMap;

/// Named integer windows of a generator.
pub type Parameters = BTreeMap<String, i64>;

/// Smallest accepted window length.
pub const MIN_WINDOW: i64 = 2;

/// Typed window configuration of a generator variant.
pub trait WindowConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), GeneratorError>;

    /// Windows as named integers.
    fn to_parameters(&self) -> Parameters;

    /// Copy of this configuration with the named windows overridden.
    ///
    /// Unknown names are rejected; the result is not validated.
    fn with_parameters(&self, params: &Parameters) -> Result<Self, GeneratorError>;
}

/// Check that a named window is at least [`MIN_WINDOW`] and convert it.
pub fn check_window(name: &str, value: i64) -> Result<usize, GeneratorError> {
    if value < MIN_WINDOW {
        return Err(GeneratorError::InvalidParameter {
            name: name.to_string(),
            value,
        });
    }
    usize::try_from(value).map_err(|_| GeneratorError::InvalidParameter {
        name: name.to_string(),
        value,
    })
}

/// Core signal generator trait.
///
/// Generators classify quotes of a chain as BUY, SELL or WAIT. The
/// classification depends only on the chain; the generator holds nothing
/// but its configuration.
pub trait SignalGenerator: Send + Sync {
    /// Get the unique name of this generator.
    fn name(&self) -> &str;

    /// Classify a single quote.
    ///
    /// Quotes without enough history for the configured windows are WAIT.
    fn generate(&self, quote: QuoteRef<'_>) -> Result<Signal, GeneratorError>;

    /// Classify the last `lookback` quotes of a chain, oldest first.
    ///
    /// The default implementation calls [`generate`](Self::generate) for every
    /// quote in order.
    fn generate_batch(
        &self,
        chain: &QuoteChain,
        lookback: usize,
    ) -> Result<Vec<Signal>, GeneratorError> {
        chain.last_n(lookback).map(|q| self.generate(q)).collect()
    }

    /// Current windows.
    fn parameters(&self) -> Parameters;

    /// Replace the named windows.
    ///
    /// Every window must be at least 2. On error the generator keeps its
    /// previous configuration.
    fn set_parameters(&mut self, params: &Parameters) -> Result<(), GeneratorError>;

    /// Number of quotes needed before the generator can emit BUY or SELL.
    fn warmup_period(&self) -> usize;

    /// Whether diagnostic values are attached to signals.
    fn is_verbose(&self) -> bool;

    /// Enable or disable diagnostic values.
    fn set_verbose(&mut self, verbose: bool);

    /// Get a description of the generator.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_window() {
        assert_eq!(check_window("fast", 2).unwrap(), 2);
        assert_eq!(
            check_window("fast", 1).unwrap_err(),
            GeneratorError::InvalidParameter {
                name: "fast".into(),
                value: 1
            }
        );
        assert!(check_window("slow", -5).is_err());
    }
}
