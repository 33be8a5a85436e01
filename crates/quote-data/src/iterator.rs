//! Resumable iterator over a quote file.

use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

use quote_core::error::DataError;
use quote_core::types::Quote;

use crate::reader::QuoteReader;

/// Iterates the quotes of one file.
///
/// Moving forward skips lines without decoding them; moving back reopens
/// the file.
#[derive(Debug)]
pub struct QuoteIterator {
    path: PathBuf,
    reader: QuoteReader<BufReader<File>>,
}

impl QuoteIterator {
    /// Open a quote file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref().to_path_buf();
        let reader = QuoteReader::from_path(&path)?;
        Ok(Self { path, reader })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Skip ahead to the first quote recorded on `date`.
    ///
    /// Returns `false`, leaving the iterator exhausted, when no later line
    /// carries that date.
    pub fn forward(&mut self, date: NaiveDate) -> Result<bool, DataError> {
        let found = self.reader.seek(date)?;
        debug!(path = %self.path.display(), %date, found, "Forwarded quote iterator");
        Ok(found)
    }

    /// Restart from the beginning of the file.
    pub fn rewind(&mut self) -> Result<(), DataError> {
        self.reader.close();
        self.reader = QuoteReader::from_path(&self.path)?;
        Ok(())
    }

    /// Whether more quotes may follow. A closed iterator has none.
    pub fn has_next(&mut self) -> Result<bool, DataError> {
        if self.reader.is_closed() {
            return Ok(false);
        }
        self.reader.ready()
    }
}

impl Iterator for QuoteIterator {
    type Item = Result<Quote, DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn intraday_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for (day, time) in [(11, 90000), (11, 170000), (12, 90000), (12, 120000), (13, 90000)] {
            writeln!(
                file,
                "FW20H11,0,201105{},{},2800,2810,2790,2805,12,4000",
                day, time
            )
            .unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_iterates_file() {
        let file = intraday_file();
        let quotes: Vec<Quote> = QuoteIterator::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(quotes.len(), 5);
        assert_eq!(quotes[0].symbol.name(), "FW20H11");
    }

    #[test]
    fn test_forward() {
        let file = intraday_file();
        let mut iter = QuoteIterator::open(file.path()).unwrap();

        assert!(iter.forward(NaiveDate::from_ymd_opt(2011, 5, 12).unwrap()).unwrap());
        let quote = iter.next().unwrap().unwrap();
        assert_eq!(quote.date.date(), NaiveDate::from_ymd_opt(2011, 5, 12).unwrap());
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn test_rewind() {
        let file = intraday_file();
        let mut iter = QuoteIterator::open(file.path()).unwrap();

        assert!(!iter.forward(NaiveDate::from_ymd_opt(2011, 5, 20).unwrap()).unwrap());
        assert!(iter.next().is_none());
        assert!(!iter.has_next().unwrap());

        iter.rewind().unwrap();
        assert!(iter.has_next().unwrap());
        let first = iter.next().unwrap().unwrap();
        assert_eq!(first.date.date(), NaiveDate::from_ymd_opt(2011, 5, 11).unwrap());
    }

    #[test]
    fn test_has_next_after_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "KGHM,20110103,1,2,0.5,1.5,100\nbroken\nKGHM,20110105,1,2,0.5,1.5,100").unwrap();
        file.flush().unwrap();
        let mut iter = QuoteIterator::open(file.path()).unwrap();

        assert!(iter.next().unwrap().is_ok());
        assert!(iter.has_next().unwrap());
        assert!(iter.next().unwrap().is_err());
        // The failed read closed the stream
        assert!(!iter.has_next().unwrap());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            QuoteIterator::open("/nonexistent/quotes.prn"),
            Err(DataError::Io(_))
        ));
    }
}
