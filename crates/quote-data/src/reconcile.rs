//! Filling gaps in stored history from a provider.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::info;

use quote_core::error::ProviderError;
use quote_core::traits::{HistoryProvider, HistoryScope};
use quote_core::types::{Quote, Symbol};

/// Fetch the quotes of `symbol` for the given missing session days.
///
/// Small gaps are served from the last-sessions bundle, larger ones from the
/// complete history. Days the provider has no quote for are left out.
pub fn reconcile<P: HistoryProvider + ?Sized>(
    provider: &P,
    symbol: &Symbol,
    missing: &[NaiveDate],
) -> Result<Vec<Quote>, ProviderError> {
    let days: BTreeSet<NaiveDate> = missing.iter().copied().collect();
    if days.is_empty() {
        return Ok(Vec::new());
    }

    let scope = HistoryScope::for_gap(days.len());
    let chain = provider.fetch_history(symbol, scope)?;

    let found: Vec<Quote> = chain
        .into_quotes()
        .into_iter()
        .filter(|q| days.contains(&q.day()))
        .collect();

    info!(
        %symbol,
        %scope,
        provider = provider.name(),
        missing = days.len(),
        found = found.len(),
        "Reconciled missing sessions"
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::error::{DataError, Operation, ProviderErrorKind};
    use quote_core::types::QuoteChain;
    use std::cell::RefCell;

    /// Serves a fixed daily history and records the requested scopes.
    struct StubProvider {
        quotes: Vec<Quote>,
        scopes: RefCell<Vec<HistoryScope>>,
    }

    impl StubProvider {
        fn new(days: u32) -> Self {
            let quotes = (1..=days)
                .map(|d| {
                    Quote::new(
                        Symbol::new("KGHM"),
                        date(d).and_hms_opt(0, 0, 0).unwrap(),
                        150.0,
                        152.0,
                        149.0,
                        150.0 + d as f64,
                        1000,
                    )
                })
                .collect();
            Self {
                quotes,
                scopes: RefCell::new(Vec::new()),
            }
        }

        fn serve(&self, scope: HistoryScope, keep: usize) -> Result<QuoteChain, ProviderError> {
            self.scopes.borrow_mut().push(scope);
            let skip = self.quotes.len().saturating_sub(keep);
            QuoteChain::from_quotes(self.quotes[skip..].iter().cloned())
                .map_err(|e| ProviderError::new("KGHM", Operation::AllQuotes, e))
        }
    }

    impl HistoryProvider for StubProvider {
        type Intraday = std::vec::IntoIter<Result<Quote, DataError>>;

        fn last_quotes(&self, _symbol: &Symbol) -> Result<QuoteChain, ProviderError> {
            self.serve(HistoryScope::Last, 5)
        }

        fn all_quotes(&self, _symbol: &Symbol) -> Result<QuoteChain, ProviderError> {
            self.serve(HistoryScope::All, usize::MAX)
        }

        fn intraday_quotes(&self, symbol: &Symbol) -> Result<Self::Intraday, ProviderError> {
            Err(ProviderError::new(
                symbol.name(),
                Operation::IntradayQuotes,
                ProviderErrorKind::EntryNotFound(format!("{}.prn", symbol)),
            ))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 3, d).unwrap()
    }

    #[test]
    fn test_small_gap_uses_last_quotes() {
        let provider = StubProvider::new(20);
        let quotes = reconcile(&provider, &Symbol::new("KGHM"), &[date(18), date(19)]).unwrap();

        assert_eq!(provider.scopes.borrow().as_slice(), [HistoryScope::Last]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].day(), date(18));
        assert_eq!(quotes[1].day(), date(19));
    }

    #[test]
    fn test_large_gap_uses_all_quotes() {
        let provider = StubProvider::new(20);
        let missing: Vec<NaiveDate> = (2..=8).map(date).collect();
        let quotes = reconcile(&provider, &Symbol::new("KGHM"), &missing).unwrap();

        assert_eq!(provider.scopes.borrow().as_slice(), [HistoryScope::All]);
        assert_eq!(quotes.len(), 7);
    }

    #[test]
    fn test_unknown_days_are_dropped() {
        let provider = StubProvider::new(10);
        // Duplicates count once; the 25th is beyond the served history
        let missing = [date(9), date(9), date(25)];
        let quotes = reconcile(&provider, &Symbol::new("KGHM"), &missing).unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].day(), date(9));
    }

    #[test]
    fn test_nothing_missing() {
        let provider = StubProvider::new(10);
        let quotes = reconcile(&provider, &Symbol::new("KGHM"), &[]).unwrap();

        assert!(quotes.is_empty());
        assert!(provider.scopes.borrow().is_empty());
    }
}
