//! Moving Average Divergence (MAVD).
//!
//! Tracks the divergence between a fast and a slow EMA of closes together
//! with an EMA of that divergence (the signal line), and signals when the
//! histogram `divergence - signal` changes sign.

use serde::{Deserialize, Serialize};
use tracing::debug;

use quote_core::{
    error::GeneratorError,
    traits::{check_window, Parameters, SignalGenerator, WindowConfig},
    types::{QuoteChain, QuoteRef, Signal, SignalType},
};
use quote_indicators::StreamingEma;

/// Configuration for the MAVD generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MavdConfig {
    /// Fast EMA window
    pub fast: usize,
    /// Slow EMA window
    pub slow: usize,
    /// EMA window of the divergence
    pub signal: usize,
}

impl Default for MavdConfig {
    fn default() -> Self {
        Self {
            fast: 3,
            slow: 14,
            signal: 30,
        }
    }
}

impl WindowConfig for MavdConfig {
    fn validate(&self) -> Result<(), GeneratorError> {
        for (name, value) in self.to_parameters() {
            check_window(&name, value)?;
        }
        Ok(())
    }

    fn to_parameters(&self) -> Parameters {
        Parameters::from([
            ("fast".to_string(), self.fast as i64),
            ("slow".to_string(), self.slow as i64),
            ("signal".to_string(), self.signal as i64),
        ])
    }

    fn with_parameters(&self, params: &Parameters) -> Result<Self, GeneratorError> {
        let mut config = self.clone();
        for (name, &value) in params {
            let slot = match name.as_str() {
                "fast" => &mut config.fast,
                "slow" => &mut config.slow,
                "signal" => &mut config.signal,
                _ => return Err(GeneratorError::UnknownParameter(name.clone())),
            };
            *slot = check_window(name, value)?;
        }
        Ok(config)
    }
}

/// Divergence and signal line at one quote.
#[derive(Debug, Clone, Copy)]
struct Reading {
    divergence: f64,
    signal: f64,
}

impl Reading {
    fn histogram(&self) -> f64 {
        self.divergence - self.signal
    }
}

/// Moving Average Divergence generator.
///
/// Only batch evaluation is supported: the signal line depends on the whole
/// chain, so it is computed in a single forward pass.
#[derive(Debug, Clone)]
pub struct MavdGenerator {
    config: MavdConfig,
    verbose: bool,
}

impl MavdGenerator {
    /// Create a new MAVD generator from a validated configuration.
    pub fn new(config: MavdConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(Self {
            config,
            verbose: false,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MavdConfig {
        &self.config
    }

    /// Divergence and signal line for every quote, oldest first.
    fn readings(&self, chain: &QuoteChain) -> Vec<Reading> {
        let mut fast = StreamingEma::new(self.config.fast);
        let mut slow = StreamingEma::new(self.config.slow);
        let mut signal = StreamingEma::new(self.config.signal);

        chain
            .iter()
            .map(|q| {
                let divergence = fast.update(q.close) - slow.update(q.close);
                Reading {
                    divergence,
                    signal: signal.update(divergence),
                }
            })
            .collect()
    }

    fn classify(&self, history_len: usize, prev: Reading, current: Reading) -> SignalType {
        if history_len < self.config.slow + 1 {
            return SignalType::Wait;
        }

        let (h_prev, h) = (prev.histogram(), current.histogram());
        if h_prev <= 0.0 && h > 0.0 {
            SignalType::Buy
        } else if h_prev >= 0.0 && h < 0.0 {
            SignalType::Sell
        } else {
            SignalType::Wait
        }
    }
}

impl Default for MavdGenerator {
    fn default() -> Self {
        Self {
            config: MavdConfig::default(),
            verbose: false,
        }
    }
}

impl SignalGenerator for MavdGenerator {
    fn name(&self) -> &str {
        "MAVD"
    }

    fn description(&self) -> &str {
        "Sign changes of the fast/slow EMA divergence against its signal line"
    }

    fn generate(&self, _quote: QuoteRef<'_>) -> Result<Signal, GeneratorError> {
        Err(GeneratorError::Unsupported(
            "MAVD only evaluates whole chains; use generate_batch".into(),
        ))
    }

    fn generate_batch(
        &self,
        chain: &QuoteChain,
        lookback: usize,
    ) -> Result<Vec<Signal>, GeneratorError> {
        let readings = self.readings(chain);
        let start = chain.len().saturating_sub(lookback);
        debug!(quotes = chain.len(), start, "MAVD batch evaluation");

        chain
            .last_n(lookback)
            .map(|q| {
                let i = q.id().index();
                let current = readings[i];
                let signal_type = match i.checked_sub(1) {
                    Some(p) => self.classify(q.history_len(), readings[p], current),
                    None => SignalType::Wait,
                };

                let mut signal = Signal::new(q, signal_type).with_level(current.histogram());
                if self.verbose {
                    signal.add_value("divergence", current.divergence);
                    signal.add_value("signal", current.signal);
                }
                Ok(signal)
            })
            .collect()
    }

    fn parameters(&self) -> Parameters {
        self.config.to_parameters()
    }

    fn set_parameters(&mut self, params: &Parameters) -> Result<(), GeneratorError> {
        self.config = self.config.with_parameters(params)?;
        Ok(())
    }

    fn warmup_period(&self) -> usize {
        self.config.slow + 1
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}
