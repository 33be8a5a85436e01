//! Momentum indicators.

use quote_core::error::IndicatorError;
use quote_core::traits::ChainIndicator;
use quote_core::types::QuoteRef;

use crate::moving_average::exponential;

/// First difference of closes at `at`.
pub fn derivative(at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
    let prev = at.prev().ok_or(IndicatorError::InsufficientData {
        required: 2,
        available: 1,
    })?;
    Ok(at.close - prev.close)
}

/// Exponential moving average of the first difference of closes.
///
/// The difference series starts at the second quote of the chain, which
/// seeds the recurrence. Undefined at the head.
pub fn emad(at: QuoteRef<'_>, period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "Period must be greater than 0".into(),
        ));
    }

    let mut closes: Vec<f64> = at.history().map(|q| q.close).collect();
    if closes.len() < 2 {
        return Err(IndicatorError::InsufficientData {
            required: 2,
            available: closes.len(),
        });
    }
    closes.reverse();

    let diffs = closes.windows(2).map(|w| w[1] - w[0]);
    exponential(diffs, period).ok_or(IndicatorError::InsufficientData {
        required: 2,
        available: 1,
    })
}

/// Close-to-close derivative.
#[derive(Debug, Clone, Copy, Default)]
pub struct Derivative;

impl ChainIndicator for Derivative {
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
        derivative(at)
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "Derivative"
    }

    fn required_history(&self) -> usize {
        2
    }
}

/// EMA of the close-to-close derivative.
#[derive(Debug, Clone)]
pub struct Emad {
    period: usize,
}

impl Emad {
    /// Create a new EMAD with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl ChainIndicator for Emad {
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
        emad(at, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMAD"
    }

    fn required_history(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_chain;

    #[test]
    fn test_derivative() {
        let chain = test_chain(&[10.0, 12.5, 11.0]);

        assert!(derivative(chain.head().unwrap()).is_err());
        assert!((derivative(chain.at(1).unwrap()).unwrap() - 2.5).abs() < 1e-10);
        assert!((derivative(chain.at(2).unwrap()).unwrap() + 1.5).abs() < 1e-10);
        assert_eq!(Derivative.value(chain.at(2).unwrap()), derivative(chain.at(2).unwrap()));
        assert!(Derivative.validate_history(chain.head().unwrap()).is_err());
    }

    #[test]
    fn test_emad() {
        // diffs: 2, 4, -2 ; mult = 0.5
        // 2 ; 4*0.5 + 2*0.5 = 3 ; -2*0.5 + 3*0.5 = 0.5
        let chain = test_chain(&[10.0, 12.0, 16.0, 14.0]);

        assert!(emad(chain.head().unwrap(), 3).is_err());
        assert!((emad(chain.at(1).unwrap(), 3).unwrap() - 2.0).abs() < 1e-10);
        assert!((emad(chain.at(2).unwrap(), 3).unwrap() - 3.0).abs() < 1e-10);
        assert!((Emad::new(3).value(chain.at(3).unwrap()).unwrap() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_emad_sign_follows_trend() {
        let rising: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let falling: Vec<f64> = (0..40).map(|i| 100.0 - i as f64).collect();

        assert!(emad(test_chain(&rising).tail().unwrap(), 10).unwrap() > 0.0);
        assert!(emad(test_chain(&falling).tail().unwrap(), 10).unwrap() < 0.0);
    }
}
