use anyhow::{Context, Result};
use std::path::PathBuf;

use lipidconv::levels::discover_levels;

/// List the MS level markers of an acquisition
pub fn run(dir: PathBuf) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let levels = discover_levels(&dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    println!("Acquisition: {}", dir.display());
    println!("Levels: {}", levels.count());
    for marker in levels.markers() {
        println!("  {}", marker);
    }
    if !levels.is_multi_level() {
        println!("Single pass conversion; nothing to split");
    }
    Ok(())
}
