//! TOML job files for repeated conversions.
//!
//! Instead of passing many CLI flags, a job file carries the settings and the
//! converter command:
//!
//! ```toml
//! # run01.toml
//! [settings]
//! merge_multiple_files = true
//! skip_last_level = true
//! merge_strategy = "mzxml"
//!
//! [job]
//! preset = "waters-functions"
//! program = "C:/tools/masswolf.exe"
//! split = "a"
//!
//! # Optional explicit command; positions follow the preset's layout
//! # command = ["masswolf", "--mzXML", "<source>", "--MSe", "-o", "<output>", "--function", "0"]
//! ```
//!
//! Values given on the command line take precedence over the job file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use lipidconv::job::SplitMode;
use lipidconv::settings::ConversionSettings;

/// Root structure of a job file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Pipeline settings.
    #[serde(default)]
    pub settings: ConversionSettings,

    /// Job options.
    #[serde(default)]
    pub job: JobConfig,
}

/// The `[job]` table.
#[derive(Debug, Default, Deserialize)]
pub struct JobConfig {
    /// Converter preset name.
    pub preset: Option<String>,

    /// Converter executable.
    pub program: Option<String>,

    /// Split mode (`none`, `a`, `b`, `both`).
    pub split: Option<SplitMode>,

    /// Directory holding the level markers.
    pub marker_dir: Option<PathBuf>,

    /// Explicit positional command; its roles follow the preset's layout.
    pub command: Option<Vec<String>>,
}

impl Config {
    /// Load a job file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse a job file from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML job file")?;
        config
            .settings
            .validate()
            .context("Invalid [settings] in job file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lipidconv::merge::MergeStrategy;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [settings]
            skip_last_level = true
            merge_strategy = "concatenate"
            check_exit_status = false

            [job]
            preset = "msconvert"
            program = "/opt/pwiz/msconvert"
            split = "both"
            command = ["msconvert", "--mzXML", "in.raw", "-o", "out", "--filter", "msLevel 1"]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert!(config.settings.skip_last_level);
        assert!(!config.settings.check_exit_status);
        assert_eq!(config.settings.merge_strategy, MergeStrategy::Concatenate);
        assert_eq!(config.job.preset.as_deref(), Some("msconvert"));
        assert_eq!(config.job.split, Some(SplitMode::Both));
        assert_eq!(config.job.command.as_ref().map(Vec::len), Some(7));
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [job]
            split = "a"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.job.split, Some(SplitMode::VariantA));
        assert!(config.settings.merge_multiple_files);
        assert_eq!(config.job.program, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.job.preset.is_none());
        assert_eq!(config.settings.chrom_size_threshold_mb, 100);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(Config::from_str("[settings]\nthread_count = 0").is_err());
    }
}
