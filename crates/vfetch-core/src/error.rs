//! Error taxonomy of a pipeline run.
//!
//! Stage errors live next to their stage; this module gathers them. Only
//! [`PipelineError`] escapes a run, and of its kinds only `NoCandidates` is
//! expected in normal operation.

use crate::download::DownloadError;
use crate::normalize::NormalizeError;
use crate::source::SourceKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use crate::prune::PruneError;
pub use crate::source::SourceError;

/// Why one candidate did not become a variant file. Never aborts the run.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("rejected by safety filter: {title}")]
    Rejected { title: String },
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl CandidateError {
    /// Short kind name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateError::Rejected { .. } => "candidate_rejected",
            CandidateError::Download(DownloadError::Fetch { source, .. }) if source.is_timeout() => {
                "download_timeout"
            }
            CandidateError::Download(_) => "download_failed",
            CandidateError::Normalize(e) if e.is_decode_failure() => "decode_failed",
            CandidateError::Normalize(_) => "normalize_failed",
        }
    }
}

/// Run-level failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no images fetched from {source_kind}; nothing to do")]
    NoCandidates { source_kind: SourceKind },
    #[error("create variants dir {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
