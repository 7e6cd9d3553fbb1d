//! # Level Merging
//!
//! Combines the per-level files of a split acquisition (`base`, `base2`,
//! `base3`, ...) into a single file so the chromatogram translator sees one
//! run.
//!
//! ## Order matters
//!
//! Segments are always merged in strictly ascending level order. Any other
//! order breaks the retention-time alignment of the merged chromatograms.
//!
//! ## Trailing level
//!
//! For some acquisitions the last level carries no useful signal. With
//! `skip_last_level` enabled the effective level count is one less than the
//! discovered count; if only one level remains, nothing is merged and the
//! base file is simply promoted to the merged name.
//!
//! ## Strategies
//!
//! - [`MergeStrategy::MzXml`]: scan-level merge into one `msRun` (default)
//! - [`MergeStrategy::Concatenate`]: raw byte concatenation
//!
//! ```rust,no_run
//! use lipidconv::merge::{effective_level_count, LevelMerger, MergeStrategy};
//! use std::path::Path;
//!
//! let merger = LevelMerger::new(MergeStrategy::MzXml);
//! let levels = effective_level_count(3, false);
//! let merged = merger.merge(Path::new("out/run.mzXML"), levels)?;
//! println!("merged into {}", merged.display());
//! # Ok::<(), lipidconv::merge::MergeError>(())
//! ```

mod concat;
mod error;
mod mzxml;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::levels::level_path;

pub use concat::concatenate;
pub use error::MergeError;
pub use mzxml::{count_scans, merge_mzxml, MzXmlMergeStats};

/// Suffix appended to the base path for the merged artifact.
pub const MERGED_SUFFIX: &str = "_merged";

/// How level files are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Scan-level mzXML merge into a single run
    #[default]
    MzXml,
    /// Byte concatenation of the level files
    Concatenate,
}

impl MergeStrategy {
    /// Returns all available strategy names.
    pub fn variants() -> &'static [&'static str] {
        &["mzxml", "concatenate"]
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::MzXml => write!(f, "mzxml"),
            MergeStrategy::Concatenate => write!(f, "concatenate"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mzxml" | "scans" => Ok(MergeStrategy::MzXml),
            "concatenate" | "concat" => Ok(MergeStrategy::Concatenate),
            _ => Err(format!(
                "Unknown merge strategy '{}'. Valid options: {}",
                s,
                MergeStrategy::variants().join(", ")
            )),
        }
    }
}

/// Number of levels that take part in the merge.
pub fn effective_level_count(level_count: usize, skip_last_level: bool) -> usize {
    if skip_last_level && level_count > 1 {
        level_count - 1
    } else {
        level_count
    }
}

/// Path of the merged artifact for a base output path.
pub fn merged_path(base: &Path) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_os_string();
    name.push(MERGED_SUFFIX);
    PathBuf::from(name)
}

/// Merges the level files next to a base output path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelMerger {
    strategy: MergeStrategy,
}

impl LevelMerger {
    /// Create a merger using `strategy`.
    pub fn new(strategy: MergeStrategy) -> Self {
        Self { strategy }
    }

    /// Strategy in use.
    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Merge levels `1..=effective_levels` of `base` into the merged artifact
    /// and return its path.
    ///
    /// With a single effective level the base file is renamed to the merged
    /// name instead. Every input is checked before the output is created, so a
    /// missing level never leaves a merged file behind. Level files are not
    /// deleted here.
    pub fn merge(&self, base: &Path, effective_levels: usize) -> Result<PathBuf, MergeError> {
        let merged = merged_path(base);

        match effective_levels {
            0 => Err(MergeError::NothingToMerge),
            1 => {
                if !base.is_file() {
                    return Err(MergeError::MissingLevelFile(base.to_path_buf()));
                }
                debug!("Single level; promoting {} as merged output", base.display());
                fs::rename(base, &merged).map_err(|e| MergeError::io(base, e))?;
                Ok(merged)
            }
            n => {
                let inputs: Vec<PathBuf> = (1..=n).map(|level| level_path(base, level)).collect();
                if let Some(missing) = inputs.iter().find(|p| !p.is_file()) {
                    return Err(MergeError::MissingLevelFile(missing.clone()));
                }

                info!(
                    "Merging {} levels of {} ({})",
                    n,
                    base.display(),
                    self.strategy
                );
                let result = self.write_merged(&inputs, &merged);
                if result.is_err() {
                    let _ = fs::remove_file(&merged);
                }
                result.map(|_| merged)
            }
        }
    }

    fn write_merged(&self, inputs: &[PathBuf], merged: &Path) -> Result<(), MergeError> {
        let mut segments = Vec::with_capacity(inputs.len());
        for path in inputs {
            let file = File::open(path).map_err(|e| MergeError::io(path, e))?;
            segments.push(BufReader::new(file));
        }

        let output = File::create(merged).map_err(|e| MergeError::io(merged, e))?;
        let output = BufWriter::new(output);

        match self.strategy {
            MergeStrategy::Concatenate => {
                let bytes = concatenate(segments, output)?;
                debug!("Concatenated {} bytes into {}", bytes, merged.display());
            }
            MergeStrategy::MzXml => {
                let stats = merge_mzxml(segments, output)?;
                debug!(
                    "Merged {} scans from {} segments into {}",
                    stats.scans,
                    stats.segments,
                    merged.display()
                );
            }
        }
        Ok(())
    }
}
