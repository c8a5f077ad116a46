//! Top posts from public forum category feeds (no auth).

use super::{endpoint, Candidate, SourceError, HEADROOM};
use crate::config::ForumConfig;
use crate::http::HttpClient;
use crate::safety::is_safe;
use crate::slug::has_raster_extension;
use serde::Deserialize;
use std::time::Duration;

/// Category listing: `{"data": {"children": [{"data": {...post...}}]}}`.
#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Default, Deserialize)]
struct Child {
    #[serde(default)]
    data: Post,
}

#[derive(Debug, Default, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_overridden_by_dest: Option<String>,
}

impl Post {
    /// Direct link: the override when present and non-empty, else `url`.
    fn link(&self) -> Option<&str> {
        self.url_overridden_by_dest
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.url.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone)]
pub struct ForumProvider {
    base_url: String,
    categories: Vec<String>,
    post_limit: u32,
    window: String,
    timeout: Duration,
}

impl ForumProvider {
    pub fn from_config(cfg: &ForumConfig) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            categories: cfg
                .categories
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            post_limit: cfg.post_limit,
            window: cfg.window.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Scans categories in order until `HEADROOM * count` candidates are gathered.
    ///
    /// A failing category is logged and skipped. Errs only when nothing was
    /// gathered and at least one category failed.
    pub(super) fn list_candidates(
        &self,
        client: &HttpClient,
        count: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        let want = count.saturating_mul(HEADROOM);
        let mut out = Vec::new();
        let mut last_err = None;

        for category in &self.categories {
            if out.len() >= want {
                break;
            }
            match self.fetch_category(client, category) {
                Ok(listing) => collect_posts(&listing, category, want, &mut out),
                Err(e) => {
                    tracing::warn!(category = %category, "forum fetch failed: {}", e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if out.is_empty() => Err(e),
            _ => Ok(out),
        }
    }

    fn fetch_category(&self, client: &HttpClient, category: &str) -> Result<Listing, SourceError> {
        let url = endpoint(
            &self.base_url,
            &format!("r/{}/top.json", category),
            &[
                ("limit", self.post_limit.to_string()),
                ("t", self.window.clone()),
            ],
        )?;
        let body = client
            .get(url.as_str(), &[], self.timeout)
            .map_err(|source| SourceError::Fetch {
                endpoint: url.to_string(),
                source,
            })?;
        parse_listing(&body).map_err(|reason| SourceError::Malformed {
            endpoint: url.to_string(),
            reason,
        })
    }
}

fn parse_listing(body: &[u8]) -> Result<Listing, String> {
    serde_json::from_slice(body).map_err(|e| e.to_string())
}

/// Appends usable posts from one listing until `out` holds `want` entries.
/// Usable = has a direct raster link and passes the safety filter.
fn collect_posts(listing: &Listing, category: &str, want: usize, out: &mut Vec<Candidate>) {
    for child in &listing.data.children {
        if out.len() >= want {
            break;
        }
        let post = &child.data;
        let Some(link) = post.link() else {
            continue;
        };
        if !has_raster_extension(link) {
            continue;
        }
        let title = post
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(category);
        if !is_safe(title, link) {
            tracing::debug!(category, title, "skipping unsafe post");
            continue;
        }
        out.push(Candidate::new(title, link));
    }
}
