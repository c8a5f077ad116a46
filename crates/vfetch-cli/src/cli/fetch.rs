//! Default action: run the pipeline once and print what was saved.

use anyhow::Result;
use std::io::{self, Write};
use vfetch_core::config::VfetchConfig;
use vfetch_core::http::HttpClient;
use vfetch_core::pipeline::{Pipeline, PipelineOptions, RunSummary};
use vfetch_core::source::SourceProvider;

pub fn run_fetch(cfg: &VfetchConfig, seed: Option<u64>) -> Result<()> {
    let variants_dir = cfg.resolve_variants_dir()?;
    let provider = SourceProvider::from_config(cfg.source, cfg);
    if let SourceProvider::Stock(stock) = &provider {
        if !stock.has_access_key() {
            eprintln!(
                "warning: {} not set; skipping {} source",
                cfg.stock.access_key_env, cfg.source
            );
        }
    }

    let mut options = PipelineOptions::from_config(cfg, variants_dir);
    options.seed = seed;
    let pipeline = Pipeline::new(provider, HttpClient::new(cfg.user_agent.clone()), options);
    let summary = pipeline.run()?;

    print_summary(&summary, &mut io::stdout().lock())?;
    Ok(())
}

/// One `saved`/`pruned` line per file, then the closing `done.` line.
pub fn print_summary(summary: &RunSummary, out: &mut impl Write) -> io::Result<()> {
    for path in &summary.saved {
        writeln!(out, "saved {}", path.display())?;
    }
    for path in &summary.pruned {
        writeln!(out, "pruned {}", path.display())?;
    }
    writeln!(
        out,
        "done. saved {} file(s) to {}",
        summary.saved.len(),
        summary.variants_dir.display()
    )
}
