//! History provider trait definitions.

use crate::error::{DataError, Operation, ProviderError, ProviderErrorKind};
use crate::types::{Quote, QuoteChain, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much history to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryScope {
    /// Daily quotes of the last few sessions
    #[default]
    Last,
    /// The complete daily history
    All,
    /// Intraday ticks of the current period
    Intraday,
}

impl HistoryScope {
    /// Scope large enough to cover `missing` absent sessions.
    pub fn for_gap(missing: usize) -> Self {
        if missing <= 6 {
            HistoryScope::Last
        } else {
            HistoryScope::All
        }
    }

    fn operation(self) -> Operation {
        match self {
            HistoryScope::Last => Operation::LastQuotes,
            HistoryScope::All => Operation::AllQuotes,
            HistoryScope::Intraday => Operation::IntradayQuotes,
        }
    }
}

impl fmt::Display for HistoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryScope::Last => "last",
            HistoryScope::All => "all",
            HistoryScope::Intraday => "intraday",
        };
        f.write_str(s)
    }
}

impl FromStr for HistoryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last" => Ok(HistoryScope::Last),
            "all" => Ok(HistoryScope::All),
            "intraday" => Ok(HistoryScope::Intraday),
            _ => Err(format!("Unknown history scope: {}", s)),
        }
    }
}

/// Source of the most recent known quote per symbol.
///
/// Providers consult it when a session has no record for a symbol.
pub trait QuoteRegistry: Send + Sync {
    /// Latest stored quote for the symbol.
    fn last_quote(&self, symbol: &Symbol) -> Option<Quote>;
}

/// Registry that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl QuoteRegistry for EmptyRegistry {
    fn last_quote(&self, _symbol: &Symbol) -> Option<Quote> {
        None
    }
}

/// Trait for historical quote sources.
pub trait HistoryProvider {
    /// Resumable iterator over intraday quotes.
    type Intraday: Iterator<Item = Result<Quote, DataError>>;

    /// Daily quotes of the last few sessions, linked into a chain.
    fn last_quotes(&self, symbol: &Symbol) -> Result<QuoteChain, ProviderError>;

    /// Complete daily history, linked into a chain.
    fn all_quotes(&self, symbol: &Symbol) -> Result<QuoteChain, ProviderError>;

    /// Intraday quotes as a lazy iterator.
    fn intraday_quotes(&self, symbol: &Symbol) -> Result<Self::Intraday, ProviderError>;

    /// Fetch history of the given scope as a chain.
    fn fetch_history(
        &self,
        symbol: &Symbol,
        scope: HistoryScope,
    ) -> Result<QuoteChain, ProviderError> {
        match scope {
            HistoryScope::Last => self.last_quotes(symbol),
            HistoryScope::All => self.all_quotes(symbol),
            HistoryScope::Intraday => {
                let fail = |kind: ProviderErrorKind| {
                    ProviderError::new(symbol.name(), scope.operation(), kind)
                };
                let mut chain = QuoteChain::new();
                for quote in self.intraday_quotes(symbol)? {
                    let quote = quote.map_err(|e| fail(e.into()))?;
                    chain.push(quote).map_err(|e| fail(e.into()))?;
                }
                Ok(chain)
            }
        }
    }

    /// Get the provider name.
    fn name(&self) -> &str;
}
