//! Streaming quote reader with lazy dialect detection.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use quote_core::error::DataError;
use quote_core::types::{Quote, QuoteChain, Symbol};

use crate::format::{detect, Format, INTRADAY_FIELDS};

/// Minimum number of fields of a daily record.
const DAILY_FIELDS: usize = 7;

/// Reads quotes line by line from any buffered source.
///
/// The dialect is detected on the first read or seek from the first
/// non-empty line, which stays buffered so it is still decoded. Format and
/// parse errors carry the 1-based line number of the offending line.
#[derive(Debug)]
pub struct QuoteReader<R> {
    inner: Option<R>,
    line_no: usize,
    pending: Option<(usize, String)>,
    format: Option<Format>,
}

impl<R: BufRead> QuoteReader<R> {
    /// Create a reader over a buffered source.
    pub fn new(inner: R) -> Self {
        Self {
            inner: Some(inner),
            line_no: 0,
            pending: None,
            format: None,
        }
    }

    /// Detected dialect, `None` before the first read.
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Read the next quote; `Ok(None)` at the end of the stream.
    pub fn read(&mut self) -> Result<Option<Quote>, DataError> {
        let format = self.ensure_format()?;

        while let Some((line_no, line)) = self.next_content_line()? {
            if format.has_headers() && Format::is_header(&line) {
                continue;
            }
            return decode(format, line_no, &line).map(Some);
        }
        Ok(None)
    }

    /// Read the next quote of `symbol`; `Ok(None)` when none follows.
    ///
    /// Records of other tickers are skipped without being decoded.
    pub fn find(&mut self, symbol: &Symbol) -> Result<Option<Quote>, DataError> {
        let format = self.ensure_format()?;

        while let Some((line_no, line)) = self.next_content_line()? {
            if format.has_headers() && Format::is_header(&line) {
                continue;
            }
            if ticker(&line) == symbol.name() {
                return decode(format, line_no, &line).map(Some);
            }
        }
        Ok(None)
    }

    /// Read up to `max` quotes. Fewer are returned at the end of the stream.
    pub fn read_batch(&mut self, max: usize) -> Result<Vec<Quote>, DataError> {
        let mut quotes = Vec::with_capacity(max.min(1024));
        while quotes.len() < max {
            match self.read()? {
                Some(quote) => quotes.push(quote),
                None => break,
            }
        }
        Ok(quotes)
    }

    /// Whether more input is available without blocking on an empty buffer.
    pub fn ready(&mut self) -> Result<bool, DataError> {
        if self.pending.is_some() {
            return Ok(true);
        }
        let inner = self.inner.as_mut().ok_or(DataError::Closed)?;
        Ok(!inner.fill_buf()?.is_empty())
    }

    /// Skip forward to the first line recorded on `date`.
    ///
    /// The matching line is kept for the next [`read`](Self::read). Lines
    /// passed over are lost; seeking backwards requires reopening the source.
    /// Returns `false` when the stream ends without a match.
    pub fn seek(&mut self, date: NaiveDate) -> Result<bool, DataError> {
        self.ensure_format()?;
        let needle = format!(",{},", date.format("%Y%m%d"));

        while let Some((line_no, line)) = self.next_line()? {
            if line.contains(&needle) {
                self.pending = Some((line_no, line));
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Release the underlying source. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            self.pending = None;
            debug!(lines = self.line_no, "Quote stream closed");
        }
    }

    /// Read the remaining quotes into a chain.
    pub fn read_chain(&mut self) -> Result<QuoteChain, DataError> {
        let mut chain = QuoteChain::new();
        while let Some(quote) = self.read()? {
            chain.push(quote)?;
        }
        Ok(chain)
    }

    fn ensure_format(&mut self) -> Result<Format, DataError> {
        if self.is_closed() {
            return Err(DataError::Closed);
        }

        let format = match self.format {
            Some(format) => format,
            None => {
                let first = self.next_content_line()?;
                let format = first
                    .as_ref()
                    .map_or(Format::Unknown, |(_, line)| detect(line));
                debug!(%format, "Detected quote stream format");
                self.pending = first;
                self.format = Some(format);
                format
            }
        };

        match format {
            Format::Unknown => Err(DataError::UnknownFormat),
            format => Ok(format),
        }
    }

    fn next_line(&mut self) -> Result<Option<(usize, String)>, DataError> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }

        let inner = self.inner.as_mut().ok_or(DataError::Closed)?;
        let mut line = String::new();
        if inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some((self.line_no, line)))
    }

    fn next_content_line(&mut self) -> Result<Option<(usize, String)>, DataError> {
        while let Some((line_no, line)) = self.next_line()? {
            if !line.trim().is_empty() {
                return Ok(Some((line_no, line)));
            }
        }
        Ok(None)
    }
}

impl QuoteReader<BufReader<File>> {
    /// Open a quote file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl QuoteReader<Cursor<Vec<u8>>> {
    /// Read quotes from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }
}

impl<R: BufRead> Iterator for QuoteReader<R> {
    type Item = Result<Quote, DataError>;

    /// Yields quotes until the end of the stream or the first error, after
    /// which the reader is closed.
    fn next(&mut self) -> Option<Self::Item> {
        if self.is_closed() {
            return None;
        }
        match self.read() {
            Ok(Some(quote)) => Some(Ok(quote)),
            Ok(None) => None,
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

fn ticker(line: &str) -> &str {
    line.split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"')
}

/// Decode one record of the given dialect.
fn decode(format: Format, line_no: usize, line: &str) -> Result<Quote, DataError> {
    let fields: Vec<&str> = line
        .split(',')
        .map(|field| field.trim().trim_matches('"'))
        .collect();
    let record = Record {
        fields: &fields,
        line_no,
    };

    let (date, prices_at) = match format {
        Format::Intraday => {
            record.expect_len(INTRADAY_FIELDS, INTRADAY_FIELDS)?;
            let stamp = format!("{}{:0>6}", fields[2], fields[3]);
            let date = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S")
                .map_err(|e| DataError::parse(line_no, format!("bad timestamp {}: {}", stamp, e)))?;
            (date, 4)
        }
        Format::Daily | Format::Tagged | Format::Quoted => {
            record.expect_len(DAILY_FIELDS, DAILY_FIELDS + 1)?;
            (record.day(1)?, 2)
        }
        Format::Unknown => return Err(DataError::UnknownFormat),
    };

    if fields[0].is_empty() {
        return Err(DataError::parse(line_no, "empty ticker"));
    }

    Ok(Quote::new(
        Symbol::new(fields[0]),
        date,
        record.number(prices_at, "open")?,
        record.number(prices_at + 1, "high")?,
        record.number(prices_at + 2, "low")?,
        record.number(prices_at + 3, "close")?,
        record.number(prices_at + 4, "volume")?,
    ))
}

struct Record<'a> {
    fields: &'a [&'a str],
    line_no: usize,
}

impl Record<'_> {
    fn expect_len(&self, min: usize, max: usize) -> Result<(), DataError> {
        let n = self.fields.len();
        if n < min || n > max {
            return Err(DataError::parse(
                self.line_no,
                format!("expected {} to {} fields, found {}", min, max, n),
            ));
        }
        Ok(())
    }

    fn day(&self, index: usize) -> Result<NaiveDateTime, DataError> {
        let raw = self.fields[index];
        NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| DataError::parse(self.line_no, format!("bad date {}", raw)))
    }

    fn number<T: FromStr>(&self, index: usize, name: &str) -> Result<T, DataError> {
        let raw = self.fields[index];
        raw.parse()
            .map_err(|_| DataError::parse(self.line_no, format!("bad {} value {:?}", name, raw)))
    }
}
