//! Random placeholder photos addressed by an opaque seed. No discovery request.

use super::Candidate;
use crate::config::PlaceholderConfig;
use rand::Rng;

const SEED_LEN: usize = 8;
const SEED_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone)]
pub struct PlaceholderProvider {
    base_url: String,
    resolution: u32,
}

impl PlaceholderProvider {
    pub fn from_config(cfg: &PlaceholderConfig) -> Self {
        Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            resolution: cfg.resolution,
        }
    }

    /// Builds `count` candidates, one fresh seed each. The same seed always maps to the same URL.
    pub(super) fn list_candidates<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Vec<Candidate> {
        (0..count)
            .map(|_| {
                let seed = random_seed(rng);
                Candidate::new(format!("picsum-{}", seed), self.url_for(&seed))
            })
            .collect()
    }

    pub fn url_for(&self, seed: &str) -> String {
        format!(
            "{}/seed/{}/{res}/{res}",
            self.base_url,
            seed,
            res = self.resolution
        )
    }
}

fn random_seed<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEED_LEN)
        .map(|_| SEED_CHARSET[rng.random_range(0..SEED_CHARSET.len())] as char)
        .collect()
}
