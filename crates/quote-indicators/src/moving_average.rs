//! Moving average indicators over a quote chain.

use quote_core::error::IndicatorError;
use quote_core::traits::ChainIndicator;
use quote_core::types::QuoteRef;

/// Closes of the quote and its predecessors, newest first.
///
/// Fails when fewer than `n` quotes are available.
pub(crate) fn recent_closes(at: QuoteRef<'_>, n: usize) -> Result<Vec<f64>, IndicatorError> {
    let closes: Vec<f64> = at.history().take(n).map(|q| q.close).collect();
    if closes.len() < n {
        return Err(IndicatorError::InsufficientData {
            required: n,
            available: closes.len(),
        });
    }
    Ok(closes)
}

fn check_period(period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "Period must be greater than 0".into(),
        ));
    }
    Ok(())
}

/// Linearly weighted mean of a newest-first window.
///
/// The newest sample weighs `len`, the oldest 1.
fn weighted_mean(newest_first: &[f64]) -> f64 {
    let n = newest_first.len();
    // Sum of weights: 1 + 2 + ... + n = n(n+1)/2
    let weights_sum = (n * (n + 1)) as f64 / 2.0;
    let weighted_sum: f64 = newest_first
        .iter()
        .enumerate()
        .map(|(i, &price)| price * (n - i) as f64)
        .sum();
    weighted_sum / weights_sum
}

/// Exponential recurrence over an oldest-first series, seeded with its first value.
pub(crate) fn exponential(oldest_first: impl IntoIterator<Item = f64>, period: usize) -> Option<f64> {
    let mut ema = StreamingEma::new(period);
    oldest_first.into_iter().for_each(|value| {
        ema.update(value);
    });
    ema.current()
}

/// Simple moving average of the last `period` closes ending at `at`.
pub fn sma(at: QuoteRef<'_>, period: usize) -> Result<f64, IndicatorError> {
    check_period(period)?;
    let closes = recent_closes(at, period)?;
    Ok(closes.iter().sum::<f64>() / period as f64)
}

/// Exponential moving average at `at`.
///
/// `EMA(q) = α·close(q) + (1-α)·EMA(prev(q))` with `α = 2/(period+1)`; the
/// head of the chain seeds the recurrence with its close.
pub fn ema(at: QuoteRef<'_>, period: usize) -> Result<f64, IndicatorError> {
    check_period(period)?;
    let mut closes: Vec<f64> = at.history().map(|q| q.close).collect();
    closes.reverse();
    // history() always yields `at` itself
    Ok(exponential(closes, period).unwrap_or(at.close))
}

/// Weighted moving average of the last `period` closes ending at `at`.
pub fn wma(at: QuoteRef<'_>, period: usize) -> Result<f64, IndicatorError> {
    check_period(period)?;
    let closes = recent_closes(at, period)?;
    Ok(weighted_mean(&closes))
}

/// Number of quotes the Hull moving average of `period` needs.
pub fn hma_required_history(period: usize) -> usize {
    period + hull_root(period) - 1
}

fn hull_root(period: usize) -> usize {
    ((period as f64).sqrt().floor() as usize).max(1)
}

/// Hull moving average at `at`.
///
/// `WMA(2·WMA(period/2) − WMA(period))` taken over `⌊√period⌋` samples.
pub fn hma(at: QuoteRef<'_>, period: usize) -> Result<f64, IndicatorError> {
    check_period(period)?;
    let half = (period / 2).max(1);
    let root = hull_root(period);
    let closes = recent_closes(at, hma_required_history(period))?;

    // raw[i] is the Hull input at the i-th quote back from `at`
    let raw: Vec<f64> = (0..root)
        .map(|i| {
            let window = &closes[i..i + period];
            2.0 * weighted_mean(&window[..half]) - weighted_mean(window)
        })
        .collect();

    Ok(weighted_mean(&raw))
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N closes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl ChainIndicator for Sma {
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
        sma(at, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay. Defined
/// for every quote of a chain.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl ChainIndicator for Ema {
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
        ema(at, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }

    fn required_history(&self) -> usize {
        1
    }
}

/// Weighted Moving Average (WMA).
///
/// Gives linearly decreasing weights to older prices.
#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
}

impl Wma {
    /// Create a new WMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl ChainIndicator for Wma {
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
        wma(at, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "WMA"
    }
}

/// Hull Moving Average (HMA).
///
/// Combines weighted averages of the full and half window to reduce lag.
#[derive(Debug, Clone)]
pub struct Hma {
    period: usize,
}

impl Hma {
    /// Create a new HMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl ChainIndicator for Hma {
    fn value(&self, at: QuoteRef<'_>) -> Result<f64, IndicatorError> {
        hma(at, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "HMA"
    }

    fn required_history(&self) -> usize {
        hma_required_history(self.period)
    }
}

/// Streaming EMA that maintains state for incremental updates.
///
/// Seeded with the first value, matching [`ema`] evaluated along a chain.
#[derive(Debug, Clone)]
pub struct StreamingEma {
    multiplier: f64,
    current: Option<f64>,
}

impl StreamingEma {
    /// Create a new streaming EMA.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self {
            multiplier,
            current: None,
        }
    }

    /// Update with a new value and return the current EMA.
    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.current {
            None => value,
            Some(prev) => value * self.multiplier + prev * (1.0 - self.multiplier),
        };
        self.current = Some(next);
        next
    }

    /// Get the current EMA value.
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    /// Reset the indicator.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
