//! Error types for the quote engine.

use chrono::NaiveDateTime;
use std::fmt;
use thiserror::Error;

/// Top-level quote engine error.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Quote stream errors.
///
/// Format and parse errors are fatal to the stream that produced them.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unknown stream format")]
    UnknownFormat,

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Stream is already closed and cannot be read")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

impl DataError {
    /// Build a parse error for a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Whether this error comes from format detection or line decoding.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::UnknownFormat | Self::Parse { .. })
    }
}

/// Quote chain linkage errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Quote dated {next} does not follow chain tail dated {previous}")]
    OutOfOrder {
        previous: NaiveDateTime,
        next: NaiveDateTime,
    },

    #[error("Quote for {found} cannot join chain of {expected}")]
    SymbolMismatch { expected: String, found: String },
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} quotes, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Signal generator errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Invalid parameter {name}={value}: windows must be at least 2")]
    InvalidParameter { name: String, value: i64 },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Generator not found: {0}")]
    NotFound(String),

    #[error("Quote chain is empty")]
    EmptyChain,

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Archive download errors.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// History provider operation, used as error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LastQuotes,
    AllQuotes,
    IntradayQuotes,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::LastQuotes => "last quotes",
            Operation::AllQuotes => "all quotes",
            Operation::IntradayQuotes => "intraday quotes",
        };
        write!(f, "{}", s)
    }
}

/// Underlying cause of a provider failure.
#[derive(Error, Debug)]
pub enum ProviderErrorKind {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Archive cannot be opened after {attempts} attempts: {reason}")]
    ArchiveCorrupt { attempts: u32, reason: String },

    #[error("Archive entry not found: {0}")]
    EntryNotFound(String),

    #[error("Data mismatch: {0}")]
    Mismatch(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// History provider error carrying the symbol and operation that failed.
///
/// Batch callers log it and move on to the next symbol.
#[derive(Error, Debug)]
#[error("Fetching {operation} for {symbol} failed: {kind}")]
pub struct ProviderError {
    pub symbol: String,
    pub operation: Operation,
    #[source]
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    /// Wrap a lower-level failure with its context.
    pub fn new(symbol: impl Into<String>, operation: Operation, kind: impl Into<ProviderErrorKind>) -> Self {
        Self {
            symbol: symbol.into(),
            operation,
            kind: kind.into(),
        }
    }
}

/// Result type alias for quote engine operations.
pub type QuoteResult<T> = Result<T, QuoteError>;
