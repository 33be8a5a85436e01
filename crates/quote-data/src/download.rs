//! HTTP download of quote archives with bounded retry.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use quote_core::error::DownloadError;

/// Fetches a remote resource into a local file.
pub trait Downloader: Send + Sync {
    /// Download `url` to `dest`, replacing any existing file.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Retry policy with capped exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds
    pub initial_backoff_ms: u64,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Upper bound of a single delay in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            multiplier: 2.0,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let ms = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        let capped = ms.min(self.max_backoff_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    /// Whether a failure is worth another attempt.
    pub fn is_retryable(error: &DownloadError) -> bool {
        match error {
            DownloadError::Network(_) => true,
            DownloadError::Http { status, .. } => *status >= 500,
            DownloadError::Client(_) | DownloadError::Io(_) => false,
        }
    }
}

/// Blocking HTTP downloader.
///
/// The body is written to a temporary sibling file and renamed into place,
/// so an interrupted transfer never leaves a truncated archive behind.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl HttpDownloader {
    /// Create a downloader with a request timeout.
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, DownloadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quotes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DownloadError::Client(e.to_string()))?;

        Ok(Self { client, retry })
    }

    fn fetch_once(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_builder() {
                DownloadError::Client(e.to_string())
            } else {
                DownloadError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| DownloadError::Network(e.to_string()))?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = dest.with_extension("part");
        fs::write(&partial, &body)?;
        fs::rename(&partial, dest)?;

        Ok(body.len() as u64)
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url, dest) {
                Ok(bytes) => {
                    info!(url, dest = %dest.display(), bytes, attempt, "Downloaded archive");
                    return Ok(());
                }
                Err(e) if attempt < max_attempts && RetryPolicy::is_retryable(&e) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(url, attempt, error = %e, delay_ms = delay.as_millis() as u64, "Download failed, retrying");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
