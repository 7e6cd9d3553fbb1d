//! Conversion settings injected into every job.
//!
//! Settings are read-only for the lifetime of a job; a job receives them as an
//! `Arc<ConversionSettings>` when it is spawned. They can be loaded from TOML:
//!
//! ```toml
//! chrom_size_threshold_mb = 200
//! intermediate_extension = "mzXML"
//! merge_multiple_files = true
//! skip_last_level = true
//! merge_strategy = "mzxml"
//! ```

use std::path::{Path, PathBuf};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::merge::MergeStrategy;

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("Failed to read settings file {}: {source}", path.display())]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings were not valid TOML for this structure
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Pipeline and translation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Chromatogram size threshold handed to the translator, in MiB
    pub chrom_size_threshold_mb: u32,
    /// Intensity scaling factor handed to the translator
    pub scaling_factor: u32,
    /// Lowest m/z resolution the translator keeps
    pub resolution_floor: f64,
    /// Whether the translator also reads MS2 scans
    pub ms2_enabled: bool,
    /// Extension of the converter's intermediate output (Variant B staging name)
    pub intermediate_extension: String,
    /// Merge the level files of a multi-level acquisition
    pub merge_multiple_files: bool,
    /// Leave the trailing level out of the merge
    pub skip_last_level: bool,
    /// Worker threads for the translator
    pub thread_count: usize,
    /// Treat a non-zero converter exit as a job failure
    pub check_exit_status: bool,
    /// How level files are combined
    pub merge_strategy: MergeStrategy,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            chrom_size_threshold_mb: 100,
            scaling_factor: 1000,
            resolution_floor: 0.0,
            ms2_enabled: false,
            intermediate_extension: "mzXML".to_string(),
            merge_multiple_files: true,
            skip_last_level: false,
            thread_count: default_thread_count(),
            check_exit_status: true,
            merge_strategy: MergeStrategy::default(),
        }
    }
}

/// Available parallelism, or 1 when it cannot be determined.
pub fn default_thread_count() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

impl ConversionSettings {
    /// Parse settings from a TOML string; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject values no job can run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let ext = self.intermediate_extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(SettingsError::InvalidValue {
                field: "intermediate_extension",
                reason: format!("'{}' is not a file extension", self.intermediate_extension),
            });
        }
        if self.thread_count == 0 {
            return Err(SettingsError::InvalidValue {
                field: "thread_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.resolution_floor.is_finite() || self.resolution_floor < 0.0 {
            return Err(SettingsError::InvalidValue {
                field: "resolution_floor",
                reason: format!("{} is not a non-negative number", self.resolution_floor),
            });
        }
        Ok(())
    }

    /// Intermediate extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.intermediate_extension.trim_start_matches('.')
    }
}
