//! `vfetch --list`: show current variants, newest first.

use anyhow::{Context, Result};
use std::path::Path;
use vfetch_core::normalize::dimensions;
use vfetch_core::prune::list_variants;

pub fn run_list(dir: &Path) -> Result<()> {
    let files = list_variants(dir).with_context(|| format!("list {}", dir.display()))?;
    if files.is_empty() {
        println!("No variants in {}.", dir.display());
        return Ok(());
    }
    for file in files.iter().rev() {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match dimensions(&file.path) {
            Ok((w, h)) => println!("{:<44} {}x{}", name, w, h),
            Err(_) => println!("{:<44} unreadable", name),
        }
    }
    println!("{} variant(s) in {}", files.len(), dir.display());
    Ok(())
}
