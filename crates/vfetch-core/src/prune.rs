//! Directory cap: keep the newest `max_files` PNGs, delete the rest.
//!
//! Membership and age come from the filesystem only (`*.png` + mtime). One
//! directory scan per run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("prune failed {}: {source}", path.display())]
pub struct PruneError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A PNG in the variants directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Outcome of one prune pass.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// PNGs present before pruning.
    pub scanned: usize,
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PruneError>,
}

fn is_png(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "png")
}

/// Lists `*.png` regular files in `dir`, oldest first (ties broken by path).
/// A missing directory lists as empty.
pub fn list_variants(dir: &Path) -> io::Result<Vec<VariantFile>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !is_png(&path) {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push(VariantFile { path, modified });
    }
    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

/// Deletes the oldest PNGs so at most `max_files` remain. `max_files == 0` disables pruning.
///
/// Deletion failures are collected in the report, never returned as errors.
pub fn prune(dir: &Path, max_files: usize) -> PruneReport {
    let mut report = PruneReport::default();
    if max_files == 0 {
        return report;
    }
    let files = match list_variants(dir) {
        Ok(files) => files,
        Err(source) => {
            tracing::warn!("prune scan failed {}: {}", dir.display(), source);
            report.failed.push(PruneError {
                path: dir.to_path_buf(),
                source,
            });
            return report;
        }
    };
    report.scanned = files.len();
    if files.len() <= max_files {
        return report;
    }

    let excess = files.len() - max_files;
    for file in files.into_iter().take(excess) {
        match fs::remove_file(&file.path) {
            Ok(()) => {
                tracing::info!("pruned {}", file.path.display());
                report.removed.push(file.path);
            }
            Err(source) => {
                let err = PruneError {
                    path: file.path,
                    source,
                };
                tracing::warn!("{}", err);
                report.failed.push(err);
            }
        }
    }
    report
}
