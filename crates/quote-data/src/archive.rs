//! Zip archive opening and extraction.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::{info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use quote_core::error::{DownloadError, ProviderErrorKind};

/// Default number of attempts to open a downloaded archive.
pub const MAX_OPEN_ATTEMPTS: u32 = 5;

const MAX_PREALLOCATED_BYTES: u64 = 1 << 20;

/// Open a zip archive, fetching a fresh copy whenever it is corrupt.
///
/// `refetch` is called between attempts, so at most `max_attempts - 1`
/// extra downloads happen. A missing file is reported as an I/O error
/// without retrying.
pub fn open_with_retry<F>(
    path: &Path,
    max_attempts: u32,
    mut refetch: F,
) -> Result<ZipArchive<File>, ProviderErrorKind>
where
    F: FnMut() -> Result<(), DownloadError>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let file = File::open(path)?;
        match ZipArchive::new(file) {
            Ok(archive) => return Ok(archive),
            Err(e) if attempt >= max_attempts => {
                return Err(ProviderErrorKind::ArchiveCorrupt {
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    attempt,
                    max_attempts,
                    error = %e,
                    "Cannot open archive, downloading it again"
                );
                refetch()?;
                attempt += 1;
            }
        }
    }
}

/// Names of the archive entries accepted by `filter`, sorted.
pub fn entry_names(archive: &ZipArchive<File>, filter: impl Fn(&str) -> bool) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| filter(name))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// Names of the session entries, in numeric order of their stems.
pub fn day_entry_names(archive: &ZipArchive<File>) -> Vec<String> {
    let mut names = entry_names(archive, is_day_entry);
    names.sort_by(|a, b| day_key(a).cmp(&day_key(b)).then_with(|| a.cmp(b)));
    names
}

/// Orders digit stems by value without parsing them.
fn day_key(name: &str) -> (usize, &str) {
    let digits = name.trim_end_matches(".prn").trim_start_matches('0');
    (digits.len(), digits)
}

/// Contents of the named entry.
pub fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>, ProviderErrorKind> {
    let mut entry = archive.by_name(name).map_err(|e| entry_error(name, e))?;
    // Header sizes of a damaged archive cannot be trusted
    let capacity = entry.size().min(MAX_PREALLOCATED_BYTES) as usize;
    let mut bytes = Vec::with_capacity(capacity);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Extract the named entry to `dest`, replacing any existing file.
pub fn extract_entry(
    archive: &mut ZipArchive<File>,
    name: &str,
    dest: &Path,
) -> Result<u64, ProviderErrorKind> {
    let mut entry = archive.by_name(name).map_err(|e| entry_error(name, e))?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(dest)?;
    let bytes = io::copy(&mut entry, &mut out)?;
    info!(entry = name, dest = %dest.display(), bytes, "Extracted archive entry");
    Ok(bytes)
}

fn entry_error(name: &str, error: ZipError) -> ProviderErrorKind {
    match error {
        ZipError::FileNotFound => ProviderErrorKind::EntryNotFound(name.to_string()),
        ZipError::Io(e) => ProviderErrorKind::Io(e),
        other => ProviderErrorKind::ArchiveCorrupt {
            attempts: 1,
            reason: other.to_string(),
        },
    }
}

/// Whether an entry name is a session file named after its date.
pub fn is_day_entry(name: &str) -> bool {
    name.strip_suffix(".prn")
        .is_some_and(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()))
}
