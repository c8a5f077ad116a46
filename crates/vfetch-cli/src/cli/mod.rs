//! CLI for vfetch.

mod fetch;
mod list;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use vfetch_core::config::{self, VfetchConfig};
use vfetch_core::normalize::ShapeMode;
use vfetch_core::source::{SourceKind, MAX_COUNT};

use fetch::run_fetch;
use list::run_list;

/// Populate the glitch variants directory with square PNGs from a remote source.
#[derive(Debug, Parser)]
#[command(name = "vfetch")]
#[command(about = "vfetch: fetch square PNG variants into ~/.config/glitch/variants", long_about = None)]
pub struct Cli {
    /// Where candidate images come from.
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// How many images to save.
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(0..=MAX_COUNT as u64)
    )]
    pub count: Option<usize>,

    /// Cap the variants directory at this many PNGs (0 disables pruning).
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Center-crop images to a square (default).
    #[arg(long)]
    pub mask: bool,

    /// Crop to a square and apply a circular alpha mask.
    #[arg(long)]
    pub circle_mask: bool,

    /// Keep images at their downloaded shape.
    #[arg(long)]
    pub no_mask: bool,

    /// Comma-separated category list for --source forum.
    #[arg(long, alias = "subreddits", value_delimiter = ',', value_name = "LIST")]
    pub categories: Option<Vec<String>>,

    /// Variants directory (overrides config).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Seed for shuffling and placeholder seeds, for reproducible runs.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// List current variants, newest first, and exit without fetching.
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Top posts of image forum categories.
    #[value(alias = "reddit")]
    Forum,
    /// Random placeholder photos.
    #[value(alias = "picsum")]
    Placeholder,
    /// Random stock photos (needs UNSPLASH_ACCESS_KEY).
    #[value(alias = "unsplash")]
    Stock,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Forum => SourceKind::Forum,
            SourceArg::Placeholder => SourceKind::Placeholder,
            SourceArg::Stock => SourceKind::Stock,
        }
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        cli.apply_overrides(&mut cfg);
        tracing::debug!("effective config: {:?}", cfg);

        if cli.list {
            return run_list(&cfg.resolve_variants_dir()?);
        }
        run_fetch(&cfg, cli.seed)
    }

    /// Flags win over config values for this run.
    pub fn apply_overrides(&self, cfg: &mut VfetchConfig) {
        if let Some(source) = self.source {
            cfg.source = source.into();
        }
        if let Some(count) = self.count {
            cfg.count = count;
        }
        if let Some(max_files) = self.max_files {
            cfg.max_files = max_files;
        }
        if let Some(shape) = ShapeMode::from_flags(self.mask, self.circle_mask, self.no_mask) {
            cfg.shape = shape;
        }
        if let Some(categories) = &self.categories {
            cfg.forum.categories = categories
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(dir) = &self.dir {
            cfg.variants_dir = Some(dir.clone());
        }
    }
}
