//! Day-granular cache of downloaded artefacts.

use chrono::{DateTime, Duration, Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    /// Today in the local calendar.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that reports a settable day.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    /// Create a clock stopped at `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Move the clock to another day.
    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap_or_else(|e| e.into_inner()) = today;
    }

    /// Move the clock by a number of days.
    pub fn advance(&self, days: i64) {
        let mut today = self.today.lock().unwrap_or_else(|e| e.into_inner());
        *today += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Directory of cached files, each valid for the day it was written.
#[derive(Clone)]
pub struct DayCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl DayCache {
    /// Create a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    /// Get cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a cached file.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Create the cache directory and `subdir` inside it if missing.
    pub fn ensure_dir(&self, subdir: Option<&str>) -> io::Result<PathBuf> {
        let dir = match subdir {
            Some(sub) => self.dir.join(sub),
            None => self.dir.clone(),
        };
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Today according to the cache's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Whether `path` exists and was last modified today.
    pub fn is_fresh(&self, path: &Path) -> io::Result<bool> {
        let modified = match fs::metadata(path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        let day = DateTime::<Local>::from(modified).date_naive();
        let fresh = day == self.clock.today();
        debug!(path = %path.display(), %day, fresh, "Checked cached file");
        Ok(fresh)
    }
}

impl std::fmt::Debug for DayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DayCache")
            .field("dir", &self.dir)
            .field("today", &self.clock.today())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2011, 5, 12).unwrap());
        clock.advance(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2011, 5, 13).unwrap());

        clock.set(NaiveDate::from_ymd_opt(2012, 1, 2).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2012, 1, 2).unwrap());
    }

    #[test]
    fn test_freshness_follows_clock() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::new(LocalClock.today()));
        let cache = DayCache::new(dir.path(), clock.clone());

        let path = cache.path("few_last.zip");
        assert!(!cache.is_fresh(&path).unwrap());

        fs::write(&path, b"data").unwrap();
        assert!(cache.is_fresh(&path).unwrap());

        clock.advance(1);
        assert!(!cache.is_fresh(&path).unwrap());
    }

    #[test]
    fn test_ensure_dir() {
        let dir = TempDir::new().unwrap();
        let cache = DayCache::new(dir.path().join("cache"), Arc::new(LocalClock));

        let sub = cache.ensure_dir(Some("intraday")).unwrap();
        assert!(sub.is_dir());
        assert_eq!(sub, cache.dir().join("intraday"));
    }
}
