//! Random stock photos from an authenticated API (one batched request).

use super::{endpoint, Candidate, SourceError};
use crate::config::StockConfig;
use crate::http::HttpClient;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
struct Photo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    urls: PhotoUrls,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    regular: Option<String>,
    #[serde(default)]
    full: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StockProvider {
    base_url: String,
    access_key_env: String,
    access_key: Option<String>,
    timeout: Duration,
}

impl StockProvider {
    pub fn new(cfg: &StockConfig, access_key: Option<String>) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            access_key_env: cfg.access_key_env.clone(),
            access_key: access_key.filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    /// Reads the access key from the environment variable named in `cfg`.
    pub fn from_env(cfg: &StockConfig) -> Self {
        Self::new(cfg, std::env::var(&cfg.access_key_env).ok())
    }

    pub fn has_access_key(&self) -> bool {
        self.access_key.is_some()
    }

    pub(super) fn list_candidates(
        &self,
        client: &HttpClient,
        count: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        let Some(key) = self.access_key.as_deref() else {
            return Err(SourceError::MissingCredential {
                var: self.access_key_env.clone(),
            });
        };
        let url = endpoint(
            &self.base_url,
            "photos/random",
            &[("count", count.to_string())],
        )?;
        let auth = format!("Client-ID {}", key);
        let body = client
            .get(url.as_str(), &[("Authorization", auth.as_str())], self.timeout)
            .map_err(|source| SourceError::Fetch {
                endpoint: url.to_string(),
                source,
            })?;
        let mut out = parse_photos(&body).map_err(|reason| SourceError::Malformed {
            endpoint: url.to_string(),
            reason,
        })?;
        out.truncate(count);
        Ok(out)
    }
}

/// Expects a JSON array of photos; anything else (e.g. an error object) is malformed.
fn parse_photos(body: &[u8]) -> Result<Vec<Candidate>, String> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let serde_json::Value::Array(items) = value else {
        return Err("expected a JSON array".to_string());
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let photo: Photo = serde_json::from_value(item).ok()?;
            let link = photo
                .urls
                .regular
                .filter(|s| !s.is_empty())
                .or(photo.urls.full.filter(|s| !s.is_empty()))?;
            let title = photo
                .id
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("unsplash-{}", idx));
            Some(Candidate::new(title, link))
        })
        .collect())
}
