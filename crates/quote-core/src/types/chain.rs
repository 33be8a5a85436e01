//! Doubly-linked quote chain backed by an arena.
//!
//! Quotes are stored in a `Vec` and linked through `QuoteId` indices instead of
//! owning references, so a whole chain is released by dropping the arena.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use super::{Quote, Symbol};
use crate::error::ChainError;

/// Position of a quote inside its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuoteId(usize);

impl QuoteId {
    /// Arena index of the quote.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    quote: Quote,
    prev: Option<QuoteId>,
    next: Option<QuoteId>,
}

/// Chronological chain of quotes for one symbol.
#[derive(Debug, Clone, Default)]
pub struct QuoteChain {
    nodes: Vec<Node>,
}

impl QuoteChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create an empty chain with room for `capacity` quotes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Build a chain from quotes in chronological order.
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Result<Self, ChainError> {
        let mut chain = Self::new();
        for quote in quotes {
            chain.push(quote)?;
        }
        Ok(chain)
    }

    /// Append a quote at the tail and link it to the previous tail.
    ///
    /// The quote must belong to the chain's symbol and be strictly newer than
    /// the tail; otherwise the chain is left untouched.
    pub fn push(&mut self, quote: Quote) -> Result<QuoteId, ChainError> {
        let id = QuoteId(self.nodes.len());
        let prev = self.nodes.len().checked_sub(1).map(QuoteId);

        if let Some(tail) = self.nodes.last() {
            if tail.quote.symbol != quote.symbol {
                return Err(ChainError::SymbolMismatch {
                    expected: tail.quote.symbol.to_string(),
                    found: quote.symbol.to_string(),
                });
            }
            if quote.date <= tail.quote.date {
                return Err(ChainError::OutOfOrder {
                    previous: tail.quote.date,
                    next: quote.date,
                });
            }
        }

        if let Some(tail) = self.nodes.last_mut() {
            tail.next = Some(id);
        }
        self.nodes.push(Node {
            quote,
            prev,
            next: None,
        });

        Ok(id)
    }

    /// Number of quotes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the chain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Symbol of the chain, if any quote has been appended.
    pub fn symbol(&self) -> Option<&Symbol> {
        self.nodes.first().map(|n| &n.quote.symbol)
    }

    /// Oldest quote.
    pub fn head(&self) -> Option<QuoteRef<'_>> {
        self.get(QuoteId(0))
    }

    /// Newest quote.
    pub fn tail(&self) -> Option<QuoteRef<'_>> {
        self.nodes.len().checked_sub(1).and_then(|i| self.get(QuoteId(i)))
    }

    /// Cursor at the given position.
    pub fn get(&self, id: QuoteId) -> Option<QuoteRef<'_>> {
        (id.0 < self.nodes.len()).then_some(QuoteRef { chain: self, id })
    }

    /// Cursor at the given arena index.
    pub fn at(&self, index: usize) -> Option<QuoteRef<'_>> {
        self.get(QuoteId(index))
    }

    /// Walk the chain from head to tail following `next` links.
    pub fn iter(&self) -> impl Iterator<Item = QuoteRef<'_>> {
        std::iter::successors(self.head(), |q| q.next())
    }

    /// Walk the chain from tail to head following `prev` links.
    pub fn iter_rev(&self) -> impl Iterator<Item = QuoteRef<'_>> {
        std::iter::successors(self.tail(), |q| q.prev())
    }

    /// Cursors for the last `n` quotes, oldest first.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = QuoteRef<'_>> {
        let start = self.nodes.len().saturating_sub(n);
        (start..self.nodes.len()).map(move |i| QuoteRef {
            chain: self,
            id: QuoteId(i),
        })
    }

    /// Borrow the quotes in chronological order.
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.nodes.iter().map(|n| &n.quote)
    }

    /// Extract close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.quote.close).collect()
    }

    /// Consume the chain, returning the quotes in chronological order.
    pub fn into_quotes(self) -> Vec<Quote> {
        self.nodes.into_iter().map(|n| n.quote).collect()
    }
}

/// Cursor over one quote of a chain.
///
/// Dereferences to the [`Quote`] and navigates through its links.
#[derive(Debug, Clone, Copy)]
pub struct QuoteRef<'a> {
    chain: &'a QuoteChain,
    id: QuoteId,
}

impl<'a> QuoteRef<'a> {
    /// Position of the quote.
    #[inline]
    pub fn id(&self) -> QuoteId {
        self.id
    }

    /// The quote itself.
    #[inline]
    pub fn quote(&self) -> &'a Quote {
        &self.chain.nodes[self.id.0].quote
    }

    /// Owning chain.
    pub fn chain(&self) -> &'a QuoteChain {
        self.chain
    }

    /// Previous (older) quote.
    pub fn prev(&self) -> Option<QuoteRef<'a>> {
        self.chain.nodes[self.id.0].prev.map(|id| QuoteRef {
            chain: self.chain,
            id,
        })
    }

    /// Next (newer) quote.
    pub fn next(&self) -> Option<QuoteRef<'a>> {
        self.chain.nodes[self.id.0].next.map(|id| QuoteRef {
            chain: self.chain,
            id,
        })
    }

    /// This quote followed by its predecessors, newest first.
    pub fn history(&self) -> impl Iterator<Item = QuoteRef<'a>> {
        std::iter::successors(Some(*self), |q| q.prev())
    }

    /// Number of quotes up to and including this one.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.id.0 + 1
    }
}

impl Deref for QuoteRef<'_> {
    type Target = Quote;

    fn deref(&self) -> &Quote {
        self.quote()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn day(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2011, 5, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(offset)
    }

    fn quote(symbol: &str, offset: i64, close: f64) -> Quote {
        Quote::new(Symbol::new(symbol), day(offset), close, close + 1.0, close - 1.0, close, 1000)
    }

    #[test]
    fn test_chain_walks_mirror() {
        let chain =
            QuoteChain::from_quotes((0..7).map(|i| quote("KGH", i, 100.0 + i as f64))).unwrap();

        let forward: Vec<f64> = chain.iter().map(|q| q.close).collect();
        let mut backward: Vec<f64> = chain.iter_rev().map(|q| q.close).collect();

        assert_eq!(forward.len(), 7);
        assert_eq!(backward.len(), 7);
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_chain_links_are_consistent() {
        let chain = QuoteChain::from_quotes((0..5).map(|i| quote("KGH", i, 10.0))).unwrap();

        assert!(chain.head().unwrap().prev().is_none());
        assert!(chain.tail().unwrap().next().is_none());

        for q in chain.iter() {
            if let Some(next) = q.next() {
                assert_eq!(next.prev().unwrap().id(), q.id());
            }
        }
        assert_eq!(chain.iter().filter(|q| q.prev().is_none()).count(), 1);
        assert_eq!(chain.iter().filter(|q| q.next().is_none()).count(), 1);
    }

    #[test]
    fn test_push_rejects_out_of_order() {
        let mut chain = QuoteChain::new();
        chain.push(quote("KGH", 1, 10.0)).unwrap();

        let err = chain.push(quote("KGH", 1, 11.0)).unwrap_err();
        assert!(matches!(err, ChainError::OutOfOrder { .. }));
        assert!(chain.push(quote("KGH", 0, 11.0)).is_err());
        assert_eq!(chain.len(), 1);
        assert!(chain.tail().unwrap().next().is_none());
    }

    #[test]
    fn test_push_rejects_other_symbol() {
        let mut chain = QuoteChain::new();
        chain.push(quote("KGH", 0, 10.0)).unwrap();

        let err = chain.push(quote("PKN", 1, 10.0)).unwrap_err();
        assert!(matches!(err, ChainError::SymbolMismatch { .. }));
        assert_eq!(chain.symbol(), Some(&Symbol::new("KGH")));
    }

    #[test]
    fn test_history_and_last_n() {
        let chain = QuoteChain::from_quotes((0..6).map(|i| quote("KGH", i, i as f64))).unwrap();
        let q = chain.at(3).unwrap();

        let closes: Vec<f64> = q.history().map(|q| q.close).collect();
        assert_eq!(closes, vec![3.0, 2.0, 1.0, 0.0]);
        assert_eq!(q.history_len(), 4);

        let last: Vec<f64> = chain.last_n(2).map(|q| q.close).collect();
        assert_eq!(last, vec![4.0, 5.0]);
        assert_eq!(chain.last_n(100).count(), 6);
    }
}
