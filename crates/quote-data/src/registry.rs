//! In-memory quote registry.

use std::collections::HashMap;
use std::sync::RwLock;

use quote_core::traits::QuoteRegistry;
use quote_core::types::{Quote, QuoteChain, Symbol};

/// Keeps the latest known quote per symbol.
#[derive(Debug, Default)]
pub struct MemoryQuoteRegistry {
    quotes: RwLock<HashMap<Symbol, Quote>>,
}

impl MemoryQuoteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a quote unless a later one is already known.
    pub fn record(&self, quote: Quote) {
        let mut quotes = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        match quotes.get(&quote.symbol) {
            Some(known) if known.date >= quote.date => {}
            _ => {
                quotes.insert(quote.symbol.clone(), quote);
            }
        }
    }

    /// Store the tail of a chain.
    pub fn record_chain(&self, chain: &QuoteChain) {
        if let Some(tail) = chain.tail() {
            self.record(tail.quote().clone());
        }
    }

    /// Forget a symbol.
    pub fn clear(&self, symbol: &Symbol) {
        self.quotes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(symbol);
    }

    /// Number of symbols with a known quote.
    pub fn len(&self) -> usize {
        self.quotes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no quote is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuoteRegistry for MemoryQuoteRegistry {
    fn last_quote(&self, symbol: &Symbol) -> Option<Quote> {
        self.quotes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(symbol)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(day: u32, close: f64) -> Quote {
        Quote::new(
            Symbol::new("PKOBP"),
            NaiveDate::from_ymd_opt(2011, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            close,
            close,
            close,
            close,
            10,
        )
    }

    #[test]
    fn test_keeps_latest() {
        let registry = MemoryQuoteRegistry::new();
        assert!(registry.is_empty());

        registry.record(quote(4, 36.0));
        registry.record(quote(3, 35.0));
        assert_eq!(registry.last_quote(&Symbol::new("pkobp")).unwrap().close, 36.0);

        registry.record(quote(5, 37.0));
        assert_eq!(registry.last_quote(&Symbol::new("PKOBP")).unwrap().close, 37.0);
        assert_eq!(registry.len(), 1);

        registry.clear(&Symbol::new("PKOBP"));
        assert!(registry.last_quote(&Symbol::new("PKOBP")).is_none());
    }

    #[test]
    fn test_record_chain() {
        let registry = MemoryQuoteRegistry::new();
        let chain = QuoteChain::from_quotes([quote(3, 35.0), quote(4, 36.5)]).unwrap();

        registry.record_chain(&chain);
        assert_eq!(registry.last_quote(&Symbol::new("PKOBP")).unwrap().close, 36.5);
    }
}
