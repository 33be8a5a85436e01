//! Indicator trait definitions.

use crate::error::IndicatorError;
use crate::types::QuoteRef;

/// Technical indicator evaluated at a position of a quote chain.
///
/// Implementations walk `prev` links from the given quote and keep no
/// state between calls, so one instance may serve several generators.
pub trait ChainIndicator: Send + Sync {
    /// Indicator value at the given quote.
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError>;

    /// Configured window length.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Number of quotes (including the evaluated one) needed for a value.
    fn required_history(&self) -> usize {
        self.period()
    }

    /// Validate that the quote has enough history.
    fn validate_history(&self, at: QuoteRef<'_>) -> Result<(), IndicatorError> {
        let available = at.history_len();
        if available < self.required_history() {
            return Err(IndicatorError::InsufficientData {
                required: self.required_history(),
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quote, QuoteChain, Symbol};
    use chrono::{Duration, NaiveDate};

    struct LastClose;

    impl ChainIndicator for LastClose {
        fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
            self.validate_history(at)?;
            Ok(at.close)
        }

        fn period(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_indicator_validation() {
        let start = NaiveDate::from_ymd_opt(2011, 1, 3).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let chain = QuoteChain::from_quotes((0..4).map(|i| {
            Quote::new(Symbol::new("KGH"), start + Duration::days(i), 1.0, 1.0, 1.0, i as f64, 10)
        }))
        .unwrap();

        let err = LastClose.value(chain.at(1).unwrap()).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 3,
                available: 2
            }
        );
        assert_eq!(LastClose.value(chain.at(3).unwrap()).unwrap(), 3.0);
    }
}
