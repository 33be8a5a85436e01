//! Quote streams and history providers.
//!
//! This crate provides:
//! - Format detection and parsing of quote streams ([`QuoteReader`])
//! - Writing quotes back in the supported dialects ([`QuoteWriter`])
//! - A resumable file iterator for intraday data ([`QuoteIterator`])
//! - The bossa.pl history provider with a day cache and archive retry
//! - Gap reconciliation against a provider

pub mod archive;
pub mod bossa;
pub mod cache;
pub mod download;
mod format;
mod iterator;
mod reader;
pub mod reconcile;
mod registry;
mod writer;

pub use bossa::{BossaProvider, InstrumentCategory, ProviderSettings};
pub use cache::{Clock, DayCache, FixedClock, LocalClock};
pub use download::{Downloader, HttpDownloader, RetryPolicy};
pub use format::{detect, Format, INTRADAY_FIELDS};
pub use iterator::QuoteIterator;
pub use reader::QuoteReader;
pub use reconcile::reconcile;
pub use registry::MemoryQuoteRegistry;
pub use writer::QuoteWriter;

use std::io::Cursor;

/// Parse quotes from an in-memory buffer.
pub fn stream_quotes(bytes: impl Into<Vec<u8>>) -> QuoteReader<Cursor<Vec<u8>>> {
    QuoteReader::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_quotes() {
        let data = "KGHM,20101220,156.70,158.20,155.00,157.90,394584\n\
            KGHM,20101221,157.90,160.00,157.10,159.50,412007\n";

        let quotes: Vec<_> = stream_quotes(data).collect::<Result<_, _>>().unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].volume, 412007);
    }
}
