//! One-pass driver: source → filter → name → download → normalize → prune.
//!
//! Fully sequential. Per-candidate errors stop at the candidate loop; the run
//! fails only when the source yields no candidates at all.

use crate::config::VfetchConfig;
use crate::download::download_to;
use crate::error::{CandidateError, PipelineError};
use crate::http::HttpClient;
use crate::normalize::{normalize, ShapeMode};
use crate::prune::prune;
use crate::safety::is_safe;
use crate::slug::{pick_ext, slug};
use crate::source::{Candidate, SourceKind, SourceProvider};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-run settings, resolved from config and CLI overrides.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub variants_dir: PathBuf,
    /// Target number of saved files.
    pub count: usize,
    /// Directory cap after the run; 0 disables pruning.
    pub max_files: usize,
    pub shape: ShapeMode,
    pub download_timeout: Duration,
    /// Seed for the run's RNG; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl PipelineOptions {
    pub fn from_config(cfg: &VfetchConfig, variants_dir: PathBuf) -> Self {
        Self {
            variants_dir,
            count: cfg.count,
            max_files: cfg.max_files,
            shape: cfg.shape,
            download_timeout: cfg.download_timeout(),
            seed: None,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source: SourceKind,
    pub variants_dir: PathBuf,
    /// Candidates the source produced.
    pub candidates: usize,
    /// Final PNG paths, in the order they were saved.
    pub saved: Vec<PathBuf>,
    pub rejected: usize,
    pub failed: usize,
    pub pruned: Vec<PathBuf>,
    pub prune_failures: usize,
}

pub struct Pipeline {
    provider: SourceProvider,
    client: HttpClient,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(provider: SourceProvider, client: HttpClient, options: PipelineOptions) -> Self {
        Self {
            provider,
            client,
            options,
        }
    }

    /// Runs once with a freshly seeded RNG (see [`PipelineOptions::seed`]).
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run_with_rng(&mut rng)
    }

    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunSummary, PipelineError> {
        let opts = &self.options;
        let source = self.provider.kind();

        let candidates = self.provider.fetch(&self.client, opts.count, rng);
        if candidates.is_empty() {
            tracing::warn!(%source, "no images fetched; nothing to do");
            return Err(PipelineError::NoCandidates {
                source_kind: source,
            });
        }

        fs::create_dir_all(&opts.variants_dir).map_err(|e| PipelineError::CreateDir {
            path: opts.variants_dir.clone(),
            source: e,
        })?;

        let mut summary = RunSummary {
            source,
            variants_dir: opts.variants_dir.clone(),
            candidates: candidates.len(),
            saved: Vec::new(),
            rejected: 0,
            failed: 0,
            pruned: Vec::new(),
            prune_failures: 0,
        };

        for (idx, candidate) in candidates.iter().enumerate() {
            match self.process_candidate(candidate, idx + 1) {
                Ok(path) => {
                    tracing::info!("saved {}", path.display());
                    summary.saved.push(path);
                    if summary.saved.len() >= opts.count {
                        break;
                    }
                }
                Err(CandidateError::Rejected { title }) => {
                    tracing::debug!(title = %title, "candidate rejected by safety filter");
                    summary.rejected += 1;
                }
                Err(e) => {
                    tracing::warn!(kind = e.kind(), url = %candidate.url, "{}", e);
                    if let CandidateError::Normalize(ne) = &e {
                        if ne.is_decode_failure() && ne.path().exists() {
                            tracing::warn!("raw file left in place: {}", ne.path().display());
                        }
                    }
                    summary.failed += 1;
                }
            }
        }

        let report = prune(&opts.variants_dir, opts.max_files);
        summary.pruned = report.removed;
        summary.prune_failures = report.failed.len();

        tracing::info!(
            saved = summary.saved.len(),
            rejected = summary.rejected,
            failed = summary.failed,
            pruned = summary.pruned.len(),
            "done. saved {} file(s) to {}",
            summary.saved.len(),
            summary.variants_dir.display()
        );
        Ok(summary)
    }

    /// Filter, name, download and normalize one candidate. `ordinal` is 1-based.
    fn process_candidate(
        &self,
        candidate: &Candidate,
        ordinal: usize,
    ) -> Result<PathBuf, CandidateError> {
        if !is_safe(&candidate.title, &candidate.url) {
            return Err(CandidateError::Rejected {
                title: candidate.title.clone(),
            });
        }
        let dest = raw_destination(&self.options.variants_dir, candidate, ordinal);
        download_to(
            &self.client,
            &candidate.url,
            &dest,
            self.options.download_timeout,
        )?;
        Ok(normalize(&dest, self.options.shape)?)
    }
}

/// `<dir>/<slug><ext>` where the extension comes from the URL suffix.
pub fn raw_destination(dir: &Path, candidate: &Candidate, ordinal: usize) -> PathBuf {
    let name = slug(&candidate.title, &format!("img-{}", ordinal));
    dir.join(format!("{}{}", name, pick_ext(&candidate.url)))
}
