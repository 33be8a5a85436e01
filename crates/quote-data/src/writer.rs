//! Writes quotes in the supported text dialects.

use csv::{Writer, WriterBuilder};
use std::io::{self, Write};

use quote_core::error::DataError;
use quote_core::types::Quote;

use crate::format::Format;

const TAGGED_HEADER: [&str; 7] = [
    "<TICKER>",
    "<DTYYYYMMDD>",
    "<OPEN>",
    "<HIGH>",
    "<LOW>",
    "<CLOSE>",
    "<VOL>",
];

/// Quote writer for the Daily, Tagged and Intraday layouts.
///
/// Output is readable by [`QuoteReader`](crate::QuoteReader).
pub struct QuoteWriter<W: Write> {
    inner: Writer<W>,
    format: Format,
    header_written: bool,
}

impl<W: Write> QuoteWriter<W> {
    /// Create a writer for the given layout.
    pub fn new(inner: W, format: Format) -> Result<Self, DataError> {
        if !matches!(format, Format::Daily | Format::Tagged | Format::Intraday) {
            return Err(DataError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot write {} quotes", format),
            )));
        }

        let inner = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(inner);
        Ok(Self {
            inner,
            format,
            header_written: false,
        })
    }

    /// Write one quote.
    pub fn write(&mut self, quote: &Quote) -> Result<(), DataError> {
        if self.format == Format::Tagged && !self.header_written {
            self.inner.write_record(TAGGED_HEADER).map_err(io::Error::from)?;
            self.header_written = true;
        }

        let ticker = quote.symbol.name().to_string();
        let day = quote.date.format("%Y%m%d").to_string();
        let prices = [quote.open, quote.high, quote.low, quote.close].map(|p| p.to_string());
        let volume = quote.volume.to_string();

        let record: Vec<String> = match self.format {
            Format::Intraday => {
                let time = quote.date.format("%H%M%S").to_string();
                [ticker, "0".into(), day, time]
                    .into_iter()
                    .chain(prices)
                    .chain([volume, "0".into()])
                    .collect()
            }
            _ => [ticker, day]
                .into_iter()
                .chain(prices)
                .chain([volume])
                .collect(),
        };

        self.inner.write_record(&record).map_err(io::Error::from)?;
        Ok(())
    }

    /// Write every quote of an iterator.
    pub fn write_all<'a>(&mut self, quotes: impl IntoIterator<Item = &'a Quote>) -> Result<(), DataError> {
        for quote in quotes {
            self.write(quote)?;
        }
        Ok(())
    }

    /// Flush buffered records.
    pub fn flush(&mut self) -> Result<(), DataError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, DataError> {
        self.inner
            .into_inner()
            .map_err(|e| DataError::Io(e.into_error()))
    }
}
