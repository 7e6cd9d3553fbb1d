use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use lipidconv::merge::{effective_level_count, LevelMerger, MergeStrategy};

/// Merge existing level files next to `base`
pub fn run(base: PathBuf, levels: usize, skip_last: bool, strategy: MergeStrategy) -> Result<()> {
    if levels == 0 {
        anyhow::bail!("Level count must be at least 1");
    }

    let effective = effective_level_count(levels, skip_last);
    info!(
        "Merging {} of {} level(s) of {} ({})",
        effective,
        levels,
        base.display(),
        strategy
    );

    let merged = LevelMerger::new(strategy)
        .merge(&base, effective)
        .with_context(|| format!("Failed to merge levels of {}", base.display()))?;

    println!("{}", merged.display());
    Ok(())
}
