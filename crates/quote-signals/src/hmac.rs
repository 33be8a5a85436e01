//! Hull Moving Average Crossover (HMAC).
//!
//! Buys when the fast Hull average crosses above the slow one while the
//! smoothed close derivative is positive. Sells on the opposite crossover or
//! when the smoothed derivative turns negative, unless the fast average is
//! still rising.

use serde::{Deserialize, Serialize};
use tracing::trace;

use quote_core::{
    error::GeneratorError,
    traits::{check_window, Parameters, SignalGenerator, WindowConfig},
    types::{QuoteRef, Signal, SignalType},
};
use quote_indicators::{emad, hma, hma_required_history};

/// Configuration for the HMAC generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmacConfig {
    /// Fast Hull window (A)
    pub fast: usize,
    /// Slow Hull window (B)
    pub slow: usize,
    /// EMA window of the close derivative (C)
    pub smoothing: usize,
}

impl Default for HmacConfig {
    fn default() -> Self {
        Self {
            fast: 20,
            slow: 40,
            smoothing: 30,
        }
    }
}

impl WindowConfig for HmacConfig {
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
            ("smoothing".to_string(), self.smoothing as i64),
        ])
    }

    fn with_parameters(&self, params: &Parameters) -> Result<Self, GeneratorError> {
        let mut config = self.clone();
        for (name, &value) in params {
            let slot = match name.as_str() {
                "fast" => &mut config.fast,
                "slow" => &mut config.slow,
                "smoothing" => &mut config.smoothing,
                _ => return Err(GeneratorError::UnknownParameter(name.clone())),
            };
            *slot = check_window(name, value)?;
        }
        Ok(config)
    }
}

/// Indicator readings at a quote and its predecessor.
#[derive(Debug, Clone, Copy)]
struct Crossover {
    f1: f64,
    s1: f64,
    f2: f64,
    s2: f64,
    dec: f64,
    dep: f64,
}

impl Crossover {
    fn classify(&self) -> SignalType {
        let spread = self.f1 - self.s1;
        let prev_spread = self.f2 - self.s2;

        if spread > 0.0 && prev_spread <= 0.0 && self.dec > 0.0 {
            return SignalType::Buy;
        }

        let crossed_down = spread < 0.0 && prev_spread >= 0.0;
        let momentum_turned = self.dec < 0.0 && self.dep > 0.0;
        // A rising fast average vetoes the sell
        if (crossed_down || momentum_turned) && self.f1 - self.f2 <= 0.0 {
            return SignalType::Sell;
        }

        SignalType::Wait
    }
}

/// Hull Moving Average Crossover generator.
#[derive(Debug, Clone)]
pub struct HmacGenerator {
    config: HmacConfig,
    verbose: bool,
}

impl HmacGenerator {
    /// Create a new HMAC generator from a validated configuration.
    pub fn new(config: HmacConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(Self {
            config,
            verbose: false,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &HmacConfig {
        &self.config
    }

    fn readings(&self, quote: QuoteRef<'_>, prev: QuoteRef<'_>) -> Result<Crossover, GeneratorError> {
        let HmacConfig {
            fast,
            slow,
            smoothing,
        } = self.config;

        Ok(Crossover {
            f1: hma(quote, fast)?,
            s1: hma(quote, slow)?,
            f2: hma(prev, fast)?,
            s2: hma(prev, slow)?,
            dec: emad(quote, smoothing)?,
            dep: emad(prev, smoothing)?,
        })
    }
}

impl Default for HmacGenerator {
    fn default() -> Self {
        Self {
            config: HmacConfig::default(),
            verbose: false,
        }
    }
}

impl SignalGenerator for HmacGenerator {
    fn name(&self) -> &str {
        "HMAC"
    }

    fn description(&self) -> &str {
        "Hull moving average crossover confirmed by the smoothed close derivative"
    }

    fn generate(&self, quote: QuoteRef<'_>) -> Result<Signal, GeneratorError> {
        if quote.history_len() < self.warmup_period() {
            return Ok(Signal::wait(quote));
        }
        let Some(prev) = quote.prev() else {
            return Ok(Signal::wait(quote));
        };

        let readings = self.readings(quote, prev)?;
        let signal_type = readings.classify();
        trace!(date = %quote.date, ?readings, %signal_type, "HMAC classified quote");

        let mut signal = Signal::new(quote, signal_type).with_level(readings.f1 - readings.s1);
        if self.verbose {
            signal.add_value("fast_hma", readings.f1);
            signal.add_value("slow_hma", readings.s1);
        }
        Ok(signal)
    }

    fn parameters(&self) -> Parameters {
        self.config.to_parameters()
    }

    fn set_parameters(&mut self, params: &Parameters) -> Result<(), GeneratorError> {
        self.config = self.config.with_parameters(params)?;
        Ok(())
    }

    fn warmup_period(&self) -> usize {
        // The predecessor needs the full Hull window of the longer average
        let longest = self.config.fast.max(self.config.slow);
        (hma_required_history(longest) + 1).max(3)
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_chain;
    use quote_core::types::QuoteChain;

    fn small_generator() -> HmacGenerator {
        HmacGenerator::new(HmacConfig {
            fast: 4,
            slow: 9,
            smoothing: 3,
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let generator = HmacGenerator::default();
        let params = generator.parameters();

        assert_eq!(params["fast"], 20);
        assert_eq!(params["slow"], 40);
        assert_eq!(params["smoothing"], 30);
        // 40 + 6
        assert_eq!(generator.warmup_period(), 46);
    }

    #[test]
    fn test_warmup_is_wait() {
        let generator = small_generator();
        let chain = test_chain(&(0..11).map(|i| 100.0 + i as f64).collect::<Vec<_>>());

        for q in chain.iter() {
            let signal = generator.generate(q).unwrap();
            assert_eq!(signal.signal_type, SignalType::Wait);
            assert_eq!(signal.level, 0.0);
        }
    }

    #[test]
    fn test_rising_fast_average_suppresses_sell() {
        // Flat, a sharp drop, a full rebound, then a smaller drop. At the last
        // bar the smoothed derivative has just turned negative, but the fast
        // Hull average is still rising because the dip is leaving its window.
        let mut closes = vec![100.0; 15];
        closes.extend([90.0, 100.0, 92.0]);
        let chain = test_chain(&closes);
        let generator = small_generator();

        let q = chain.tail().unwrap();
        let p = q.prev().unwrap();

        // Raw sell condition holds
        let dec = emad(q, 3).unwrap();
        let dep = emad(p, 3).unwrap();
        assert!(dec < 0.0);
        assert!(dep > 0.0);

        // Fast average still rising
        let f1 = hma(q, 4).unwrap();
        let f2 = hma(p, 4).unwrap();
        assert!(f1 - f2 > 0.0);

        let signal = generator.generate(q).unwrap();
        assert_eq!(signal.signal_type, SignalType::Wait);
    }

    #[test]
    fn test_sell_on_momentum_turn() {
        let readings = Crossover {
            f1: 99.0,
            s1: 98.0,
            f2: 100.0,
            s2: 98.5,
            dec: -0.5,
            dep: 0.2,
        };
        assert_eq!(readings.classify(), SignalType::Sell);

        let vetoed = Crossover { f1: 100.5, ..readings };
        assert_eq!(vetoed.classify(), SignalType::Wait);
    }

    #[test]
    fn test_buy_requires_positive_momentum() {
        let readings = Crossover {
            f1: 101.0,
            s1: 100.0,
            f2: 99.0,
            s2: 99.5,
            dec: 0.3,
            dep: 0.1,
        };
        assert_eq!(readings.classify(), SignalType::Buy);

        let flat = Crossover { dec: 0.0, ..readings };
        assert_eq!(flat.classify(), SignalType::Wait);
    }

    #[test]
    fn test_buy_after_reversal() {
        // Decline then a sharp rally: the fast average crosses the lagging slow one
        let mut closes: Vec<f64> = (0..30).map(|i| 130.0 - i as f64).collect();
        closes.extend((1..=15).map(|i| 101.0 + 3.0 * i as f64));
        let chain = test_chain(&closes);

        let generator = HmacGenerator::new(HmacConfig {
            fast: 4,
            slow: 16,
            smoothing: 3,
        })
        .unwrap();
        let signals = generator.generate_batch(&chain, chain.len()).unwrap();

        assert_eq!(signals.len(), chain.len());
        assert!(signals.iter().any(|s| s.is_buy()));
        // The fast average rises through the whole rally
        assert!(signals[30..].iter().all(|s| !s.is_sell()));
    }

    #[test]
    fn test_batch_matches_single_step() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.2).sin() * 8.0 + (i as f64 * 0.05).cos() * 3.0)
            .collect();
        let chain = test_chain(&closes);
        let generator = small_generator();

        let batch = generator.generate_batch(&chain, 50).unwrap();
        let single: Vec<SignalType> = chain
            .last_n(50)
            .map(|q| generator.generate(q).unwrap().signal_type)
            .collect();

        assert_eq!(batch.len(), 50);
        assert_eq!(batch.iter().map(|s| s.signal_type).collect::<Vec<_>>(), single);
        assert_eq!(batch[0].quote_id, chain.at(70).unwrap().id());
    }

    #[test]
    fn test_batch_lookback_is_clamped() {
        let chain = test_chain(&[100.0; 5]);
        let signals = small_generator().generate_batch(&chain, 100).unwrap();
        assert_eq!(signals.len(), 5);

        let empty = QuoteChain::new();
        assert!(small_generator().generate_batch(&empty, 10).unwrap().is_empty());
    }

    #[test]
    fn test_verbose_values() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let chain = test_chain(&closes);
        let mut generator = small_generator();

        let quiet = generator.generate(chain.tail().unwrap()).unwrap();
        assert!(quiet.values.is_empty());

        generator.set_verbose(true);
        assert!(generator.is_verbose());
        let signal = generator.generate(chain.tail().unwrap()).unwrap();
        let names: Vec<&str> = signal.values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["fast_hma", "slow_hma"]);

        let level = signal.value("fast_hma").unwrap() - signal.value("slow_hma").unwrap();
        assert!((signal.level - level).abs() < 1e-12);
    }

    #[test]
    fn test_set_parameters() {
        let mut generator = HmacGenerator::default();

        generator
            .set_parameters(&Parameters::from([("fast".to_string(), 10)]))
            .unwrap();
        assert_eq!(generator.config().fast, 10);
        assert_eq!(generator.config().slow, 40);

        let invalid = Parameters::from([("slow".to_string(), 60), ("smoothing".to_string(), 1)]);
        assert_eq!(
            generator.set_parameters(&invalid).unwrap_err(),
            GeneratorError::InvalidParameter {
                name: "smoothing".into(),
                value: 1
            }
        );
        // Unchanged after a failed update
        assert_eq!(generator.config().slow, 40);

        let unknown = Parameters::from([("period".to_string(), 5)]);
        assert!(matches!(
            generator.set_parameters(&unknown),
            Err(GeneratorError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = HmacConfig {
            fast: 1,
            ..HmacConfig::default()
        };
        assert!(HmacGenerator::new(config).is_err());
    }
}
