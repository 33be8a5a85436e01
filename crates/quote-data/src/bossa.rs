//! History provider for the bossa.pl public quote archives.
//!
//! Three bundles are used:
//! - `few_last.zip`: one `yyyyMMdd.prn` file per recent session
//! - `mstcgl.zip`: the complete daily history, one `SYMBOL.mst` per symbol
//! - `<category>/SYMBOL.zip`: intraday ticks of one symbol
//!
//! Each bundle is downloaded at most once per calendar day and kept in the
//! cache directory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use quote_core::error::{DataError, DownloadError, Operation, ProviderError, ProviderErrorKind};
use quote_core::traits::{EmptyRegistry, HistoryProvider, QuoteRegistry};
use quote_core::types::{Quote, QuoteChain, Symbol};

use crate::archive::{self, MAX_OPEN_ATTEMPTS};
use crate::cache::{Clock, DayCache, LocalClock};
use crate::download::{Downloader, HttpDownloader, RetryPolicy};
use crate::format::Format;
use crate::iterator::QuoteIterator;
use crate::reader::QuoteReader;

/// Symbol prefixes of futures and options, served from the `fut` bucket.
pub const DERIVATIVE_PREFIXES: [&str; 15] = [
    "FW20", "FW40", "FACP", "FKGH", "FPEO", "FPGE", "FPGN", "FPKN", "FPKO", "FPZU", "FTPS",
    "FEUR", "FUSD", "OW20", "MW20",
];

/// Provider locations and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Directory for downloaded and extracted files
    pub cache_dir: PathBuf,
    /// Bundle with the last few sessions
    pub last_quotes_url: String,
    /// Bundle with the complete daily history
    pub all_quotes_url: String,
    /// Base of the per-symbol intraday bundles
    pub intraday_base_url: String,
    /// Attempts to open a downloaded archive before giving up
    pub max_open_attempts: u32,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Download retry policy
    pub retry: RetryPolicy,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/tmp"),
            last_quotes_url: "http://bossa.pl/pub/metastock/mstock/sesjaall/few_last.zip".into(),
            all_quotes_url: "http://bossa.pl/pub/metastock/cgl/mstcgl.zip".into(),
            intraday_base_url: "http://bossa.pl/pub/intraday/mstock".into(),
            max_open_attempts: MAX_OPEN_ATTEMPTS,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// Bucket of the intraday archives a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentCategory {
    /// Futures and options
    Derivatives,
    /// Everything else
    Equities,
}

impl InstrumentCategory {
    /// Category of a symbol, from its ticker prefix.
    pub fn of(symbol: &Symbol) -> Self {
        let name = symbol.name();
        if DERIVATIVE_PREFIXES.iter().any(|p| name.starts_with(p)) {
            InstrumentCategory::Derivatives
        } else {
            InstrumentCategory::Equities
        }
    }

    /// URL path segment of the bucket.
    pub fn path(self) -> &'static str {
        match self {
            InstrumentCategory::Derivatives => "fut",
            InstrumentCategory::Equities => "cgl",
        }
    }
}

/// History provider backed by bossa.pl archives.
pub struct BossaProvider {
    settings: ProviderSettings,
    cache: DayCache,
    downloader: Arc<dyn Downloader>,
    registry: Arc<dyn QuoteRegistry>,
}

impl BossaProvider {
    /// Create a provider from its collaborators.
    pub fn new(
        settings: ProviderSettings,
        downloader: Arc<dyn Downloader>,
        clock: Arc<dyn Clock>,
        registry: Arc<dyn QuoteRegistry>,
    ) -> Self {
        let cache = DayCache::new(settings.cache_dir.clone(), clock);
        Self {
            settings,
            cache,
            downloader,
            registry,
        }
    }

    /// Create a provider that downloads over HTTP and uses the local clock.
    pub fn from_settings(
        settings: ProviderSettings,
        registry: Option<Arc<dyn QuoteRegistry>>,
    ) -> Result<Self, DownloadError> {
        let downloader = HttpDownloader::new(
            Duration::from_secs(settings.timeout_secs),
            settings.retry.clone(),
        )?;
        Ok(Self::new(
            settings,
            Arc::new(downloader),
            Arc::new(LocalClock),
            registry.unwrap_or_else(|| Arc::new(EmptyRegistry)),
        ))
    }

    /// Get the provider settings.
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Intraday bundle URL of a symbol.
    pub fn intraday_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/{}/{}.zip",
            self.settings.intraday_base_url.trim_end_matches('/'),
            InstrumentCategory::of(symbol).path(),
            symbol.name()
        )
    }

    /// Download `url` to `path` unless today's copy is already there, then
    /// open it as an archive.
    fn cached_archive(&self, url: &str, path: &Path) -> Result<ZipArchive<File>, ProviderErrorKind> {
        self.cache.ensure_dir(None)?;
        if self.cache.is_fresh(path)? {
            debug!(path = %path.display(), "Using cached archive");
        } else {
            self.downloader.download(url, path)?;
        }
        self.open_archive(url, path)
    }

    fn open_archive(&self, url: &str, path: &Path) -> Result<ZipArchive<File>, ProviderErrorKind> {
        archive::open_with_retry(path, self.settings.max_open_attempts, || {
            self.downloader.download(url, path)
        })
    }

    fn last_quotes_inner(&self, symbol: &Symbol) -> Result<QuoteChain, ProviderErrorKind> {
        let path = self.cache.path("few_last.zip");
        let mut archive = self.cached_archive(&self.settings.last_quotes_url, &path)?;
        let days = archive::day_entry_names(&archive);

        let mut chain = QuoteChain::with_capacity(days.len());
        let mut last: Option<Quote> = None;

        for name in days {
            let bytes = archive::read_entry(&mut archive, &name)?;
            let session = scan_session(bytes, symbol)?;

            let quote = match session.quote {
                Some(quote) => quote,
                None => {
                    let Some(day) = day_from_entry(&name).or(session.first_day) else {
                        warn!(entry = %name, "Session file has no date, skipping");
                        continue;
                    };
                    match last.clone().or_else(|| self.registry.last_quote(symbol)) {
                        Some(known) => {
                            warn!(%symbol, %day, "No quote in session, carrying the last one forward");
                            known.carried_to(day)
                        }
                        None => {
                            debug!(%symbol, %day, "No quote in session and none known, skipping day");
                            continue;
                        }
                    }
                }
            };

            chain.push(quote.clone())?;
            last = Some(quote);
        }

        info!(%symbol, quotes = chain.len(), "Loaded last quotes");
        Ok(chain)
    }

    fn all_quotes_inner(&self, symbol: &Symbol) -> Result<QuoteChain, ProviderErrorKind> {
        let path = self.cache.path("mstcgl.zip");
        let mut archive = self.cached_archive(&self.settings.all_quotes_url, &path)?;

        let entry = format!("{}.mst", symbol.name());
        let dest = self.cache.ensure_dir(Some("mstcgl"))?.join(&entry);
        archive::extract_entry(&mut archive, &entry, &dest)?;

        let mut chain = QuoteChain::new();
        for quote in QuoteReader::from_path(&dest)? {
            let quote = quote?;
            if quote.symbol != *symbol {
                return Err(ProviderErrorKind::Mismatch(format!(
                    "expected {} but read {} from {}",
                    symbol, quote.symbol, entry
                )));
            }
            chain.push(quote)?;
        }

        info!(%symbol, quotes = chain.len(), "Loaded complete history");
        Ok(chain)
    }

    fn intraday_inner(&self, symbol: &Symbol) -> Result<QuoteIterator, ProviderErrorKind> {
        let prn_name = format!("{}.prn", symbol.name());
        let prn = self.cache.ensure_dir(Some("intraday"))?.join(&prn_name);

        if self.cache.is_fresh(&prn)? {
            debug!(%symbol, path = %prn.display(), "Using cached intraday quotes");
        } else {
            let url = self.intraday_url(symbol);
            let zip_path = self.cache.path(&format!("{}.zip", symbol.name()));
            self.downloader.download(&url, &zip_path)?;

            let extracted = self
                .open_archive(&url, &zip_path)
                .and_then(|mut archive| archive::extract_entry(&mut archive, &prn_name, &prn));
            if let Err(e) = fs::remove_file(&zip_path) {
                warn!(path = %zip_path.display(), error = %e, "Cannot remove downloaded archive");
            }
            extracted?;
        }

        Ok(QuoteIterator::open(&prn)?)
    }
}

impl HistoryProvider for BossaProvider {
    type Intraday = QuoteIterator;

    fn last_quotes(&self, symbol: &Symbol) -> Result<QuoteChain, ProviderError> {
        self.last_quotes_inner(symbol)
            .map_err(|kind| ProviderError::new(symbol.name(), Operation::LastQuotes, kind))
    }

    fn all_quotes(&self, symbol: &Symbol) -> Result<QuoteChain, ProviderError> {
        self.all_quotes_inner(symbol)
            .map_err(|kind| ProviderError::new(symbol.name(), Operation::AllQuotes, kind))
    }

    fn intraday_quotes(&self, symbol: &Symbol) -> Result<QuoteIterator, ProviderError> {
        self.intraday_inner(symbol)
            .map_err(|kind| ProviderError::new(symbol.name(), Operation::IntradayQuotes, kind))
    }

    fn name(&self) -> &str {
        "bossa"
    }
}

/// What one session file holds for a symbol.
struct Session {
    quote: Option<Quote>,
    first_day: Option<NaiveDate>,
}

/// Only the record of `symbol` is decoded; other tickers may be malformed.
fn scan_session(bytes: Vec<u8>, symbol: &Symbol) -> Result<Session, DataError> {
    let first_day = first_record_day(&bytes);
    let quote = match QuoteReader::from_bytes(bytes).find(symbol) {
        Ok(quote) => quote,
        Err(DataError::UnknownFormat) => None,
        Err(e) => return Err(e),
    };
    Ok(Session { quote, first_day })
}

/// Date field of the first daily record, if it parses.
fn first_record_day(bytes: &[u8]) -> Option<NaiveDate> {
    let text = String::from_utf8_lossy(bytes);
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !Format::is_header(line))?;
    let raw = line.split(',').nth(1)?.trim();
    NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
}

fn day_from_entry(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".prn")?;
    NaiveDate::parse_from_str(stem, "%Y%m%d").ok()
}
