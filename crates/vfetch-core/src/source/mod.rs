//! Candidate sources.
//!
//! A run picks exactly one [`SourceProvider`] from configuration. Every
//! provider degrades to an empty candidate list on network, auth or format
//! trouble; only the driver decides whether "nothing" is fatal.

mod forum;
mod placeholder;
mod stock;

pub use forum::ForumProvider;
pub use placeholder::PlaceholderProvider;
pub use stock::StockProvider;

use crate::config::VfetchConfig;
use crate::http::{FetchError, HttpClient};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Headroom factor: providers gather up to `HEADROOM * count` candidates before trimming.
pub const HEADROOM: usize = 3;

/// Largest `count` a single run will act on.
pub const MAX_COUNT: usize = 1000;

/// A (title, url) pair proposed for download. Lives for one run only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Which provider a run draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Top posts of public image-forum categories.
    #[default]
    Forum,
    /// Random seeded placeholder photos.
    Placeholder,
    /// Random stock photos; needs an access key.
    Stock,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Forum => "forum",
            SourceKind::Placeholder => "placeholder",
            SourceKind::Stock => "stock",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    /// Accepts the canonical names and the service names (`reddit`, `picsum`, `unsplash`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forum" | "reddit" => Ok(SourceKind::Forum),
            "placeholder" | "picsum" => Ok(SourceKind::Placeholder),
            "stock" | "unsplash" => Ok(SourceKind::Stock),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// Provider-level failure. Always degraded to an empty candidate list.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("access key not set (${var})")]
    MissingCredential { var: String },
    #[error("invalid endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {endpoint} failed: {source}")]
    Fetch {
        endpoint: String,
        #[source]
        source: FetchError,
    },
    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// Closed set of candidate providers; selected once per run.
#[derive(Debug, Clone)]
pub enum SourceProvider {
    Forum(ForumProvider),
    Placeholder(PlaceholderProvider),
    Stock(StockProvider),
}

impl SourceProvider {
    /// Maps configuration to a provider. The stock access key is read from the
    /// environment variable named in `cfg.stock.access_key_env`.
    pub fn from_config(kind: SourceKind, cfg: &VfetchConfig) -> Self {
        match kind {
            SourceKind::Forum => SourceProvider::Forum(ForumProvider::from_config(&cfg.forum)),
            SourceKind::Placeholder => {
                SourceProvider::Placeholder(PlaceholderProvider::from_config(&cfg.placeholder))
            }
            SourceKind::Stock => SourceProvider::Stock(StockProvider::from_env(&cfg.stock)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceProvider::Forum(_) => SourceKind::Forum,
            SourceProvider::Placeholder(_) => SourceKind::Placeholder,
            SourceProvider::Stock(_) => SourceKind::Stock,
        }
    }

    /// Lists at most `count` candidates in random order.
    ///
    /// Provider errors are logged and yield an empty list.
    pub fn fetch<R: Rng + ?Sized>(
        &self,
        client: &HttpClient,
        count: usize,
        rng: &mut R,
    ) -> Vec<Candidate> {
        if count == 0 {
            return Vec::new();
        }
        if count > MAX_COUNT {
            tracing::warn!(requested = count, max = MAX_COUNT, "count clamped");
        }
        let count = count.min(MAX_COUNT);
        let listed = match self {
            SourceProvider::Forum(p) => p.list_candidates(client, count),
            SourceProvider::Placeholder(p) => Ok(p.list_candidates(count, rng)),
            SourceProvider::Stock(p) => p.list_candidates(client, count),
        };
        let mut candidates = match listed {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(source = %self.kind(), "source unavailable: {}", e);
                return Vec::new();
            }
        };
        candidates.truncate(count.saturating_mul(HEADROOM));
        candidates.shuffle(rng);
        candidates.truncate(count);
        tracing::debug!(source = %self.kind(), count = candidates.len(), "listed candidates");
        candidates
    }
}

/// Joins a configured base URL with a path and query parameters.
pub(crate) fn endpoint(
    base: &str,
    path: &str,
    params: &[(&str, String)],
) -> Result<url::Url, SourceError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let parsed = if params.is_empty() {
        url::Url::parse(&raw)
    } else {
        url::Url::parse_with_params(&raw, params)
    };
    parsed.map_err(|source| SourceError::Endpoint {
        endpoint: raw,
        source,
    })
}
