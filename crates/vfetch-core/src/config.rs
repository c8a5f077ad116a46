use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::normalize::ShapeMode;
use crate::source::SourceKind;

/// Forum provider settings (`[forum]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    /// Site root; category feeds live under `{base_url}/r/{category}/top.json`.
    pub base_url: String,
    /// Categories scanned in order.
    pub categories: Vec<String>,
    /// Posts requested per category feed.
    pub post_limit: u32,
    /// Ranking window passed as `t=` (hour, day, week, month, year, all).
    pub window: String,
    pub timeout_secs: u64,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            base_url: "https://old.reddit.com".to_string(),
            categories: [
                "wallpapers",
                "EarthPorn",
                "ImaginaryLandscapes",
                "CityPorn",
                "wallpaper",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            post_limit: 80,
            window: "week".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Placeholder photo provider settings (`[placeholder]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub base_url: String,
    /// Side length in pixels requested from the provider.
    pub resolution: u32,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://picsum.photos".to_string(),
            resolution: 512,
        }
    }
}

/// Stock photo provider settings (`[stock]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    pub base_url: String,
    /// Environment variable holding the access key. Unset means the provider yields nothing.
    pub access_key_env: String,
    pub timeout_secs: u64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.unsplash.com".to_string(),
            access_key_env: "UNSPLASH_ACCESS_KEY".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Global configuration loaded from `~/.config/vfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfetchConfig {
    /// Where variants are stored. `None` = `~/.config/glitch/variants`.
    pub variants_dir: Option<PathBuf>,
    pub source: SourceKind,
    /// Target number of saved images per run.
    pub count: usize,
    /// Directory cap; 0 disables pruning.
    pub max_files: usize,
    pub shape: ShapeMode,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    pub download_timeout_secs: u64,
    pub forum: ForumConfig,
    pub placeholder: PlaceholderConfig,
    pub stock: StockConfig,
}

impl Default for VfetchConfig {
    fn default() -> Self {
        Self {
            variants_dir: None,
            source: SourceKind::Forum,
            count: 2,
            max_files: 50,
            shape: ShapeMode::Square,
            user_agent: "glitch-variant-fetch/1.0".to_string(),
            download_timeout_secs: 15,
            forum: ForumConfig::default(),
            placeholder: PlaceholderConfig::default(),
            stock: StockConfig::default(),
        }
    }
}

impl VfetchConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Resolved variants directory: the configured one, else the XDG default.
    pub fn resolve_variants_dir(&self) -> Result<PathBuf> {
        match &self.variants_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_variants_dir(),
        }
    }
}

/// `~/.config/glitch/variants`, the directory the glitch renderer reads from.
pub fn default_variants_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::new()?;
    Ok(xdg_dirs.get_config_home().join("glitch").join("variants"))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<VfetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: VfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
