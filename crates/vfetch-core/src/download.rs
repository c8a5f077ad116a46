//! Raw image download to the variants directory.
//!
//! The body is fetched in one GET, written to `<dest>.part` and renamed onto
//! `dest`, so an interrupted write never leaves a half file under the final name.

use crate::http::{FetchError, HttpClient};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("write failed {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Path for the temp file: appends `.part` to the final path (e.g. `a.jpg` → `a.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Fetches the raw bytes at `url` in a single attempt.
pub fn fetch_bytes(
    client: &HttpClient,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, DownloadError> {
    client
        .get(url, &[], timeout)
        .map_err(|source| DownloadError::Fetch {
            url: url.to_string(),
            source,
        })
}

/// Downloads `url` into `dest`, creating the parent directory if needed.
/// An existing file at `dest` is overwritten. Returns the number of bytes written.
pub fn download_to(
    client: &HttpClient,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<u64, DownloadError> {
    let data = fetch_bytes(client, url, timeout)?;
    write_atomic(dest, &data)?;
    tracing::debug!(url, path = %dest.display(), bytes = data.len(), "downloaded");
    Ok(data.len() as u64)
}

fn write_err(path: &Path) -> impl FnOnce(io::Error) -> DownloadError {
    let path = path.to_path_buf();
    move |source| DownloadError::Write { path, source }
}

fn write_atomic(dest: &Path, data: &[u8]) -> Result<(), DownloadError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(write_err(parent))?;
    }
    let tmp = temp_path(dest);
    if let Err(e) = fs::write(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(&tmp)(e));
    }
    fs::rename(&tmp, dest).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(dest)(e)
    })
}
