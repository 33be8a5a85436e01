//! Entry point for running a generator over a quote chain.

use serde::{Deserialize, Serialize};
use tracing::info;

use quote_core::{
    error::GeneratorError,
    traits::SignalGenerator,
    types::{QuoteChain, Signal, SignalType},
};

use crate::{HmacConfig, HmacGenerator, MavdConfig, MavdGenerator};

/// Generator variant together with its windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeneratorConfig {
    Hmac(HmacConfig),
    Mavd(MavdConfig),
}

impl GeneratorConfig {
    /// Registry key of the variant.
    pub fn key(&self) -> &'static str {
        match self {
            GeneratorConfig::Hmac(_) => "hmac",
            GeneratorConfig::Mavd(_) => "mavd",
        }
    }

    /// Build the generator.
    pub fn build(&self, verbose: bool) -> Result<Box<dyn SignalGenerator>, GeneratorError> {
        let mut generator: Box<dyn SignalGenerator> = match self {
            GeneratorConfig::Hmac(config) => Box::new(HmacGenerator::new(config.clone())?),
            GeneratorConfig::Mavd(config) => Box::new(MavdGenerator::new(config.clone())?),
        };
        generator.set_verbose(verbose);
        Ok(generator)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::Hmac(HmacConfig::default())
    }
}

/// Which quotes of the chain to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    /// Only the tail of the chain
    Latest,
    /// The last `lookback` quotes
    Backtest { lookback: usize },
}

/// Result of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOutput {
    Single(Signal),
    Batch(Vec<Signal>),
}

impl SignalOutput {
    /// Signals in chronological order.
    pub fn signals(&self) -> &[Signal] {
        match self {
            SignalOutput::Single(signal) => std::slice::from_ref(signal),
            SignalOutput::Batch(signals) => signals,
        }
    }
}

/// Classify a chain with a generator built from `config`.
pub fn evaluate_signal(
    chain: &QuoteChain,
    config: &GeneratorConfig,
    evaluation: Evaluation,
) -> Result<SignalOutput, GeneratorError> {
    let generator = config.build(false)?;
    evaluate(generator.as_ref(), chain, evaluation)
}

/// Classify a chain with an existing generator.
pub fn evaluate(
    generator: &dyn SignalGenerator,
    chain: &QuoteChain,
    evaluation: Evaluation,
) -> Result<SignalOutput, GeneratorError> {
    let output = match evaluation {
        Evaluation::Latest => {
            // Batch of one works for generators without single-step support
            let signal = generator
                .generate_batch(chain, 1)?
                .pop()
                .ok_or(GeneratorError::EmptyChain)?;
            SignalOutput::Single(signal)
        }
        Evaluation::Backtest { lookback } => {
            SignalOutput::Batch(generator.generate_batch(chain, lookback)?)
        }
    };

    let signals = output.signals();
    let count = |t: SignalType| signals.iter().filter(|s| s.signal_type == t).count();
    info!(
        generator = generator.name(),
        symbol = chain.symbol().map(|s| s.name()).unwrap_or_default(),
        quotes = signals.len(),
        buys = count(SignalType::Buy),
        sells = count(SignalType::Sell),
        "Signals evaluated"
    );

    Ok(output)
}
