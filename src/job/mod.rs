//! # Conversion Jobs
//!
//! A [`ConversionJob`] sequences one acquisition through the pipeline:
//!
//! ```text
//! first pass ──▶ discover _FUN*.DAT ──▶ per-level passes ──▶ merge ──▶ cleanup
//!   (runner)        (levels)            (Variant A / B)     (merge)   (delete
//!                                                                     levels,
//!                                                                     rename)
//! ```
//!
//! Each step that fails aborts the job; nothing already written is rolled
//! back. A job can run synchronously with [`ConversionJob::run`] or on its own
//! thread with [`ConversionJob::spawn`], which returns a [`JobHandle`] the
//! caller polls.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lipidconv::job::{ConversionJob, SplitMode};
//! use lipidconv::preset::ConverterPreset;
//! use lipidconv::runner::SystemProcessRunner;
//! use lipidconv::settings::ConversionSettings;
//!
//! let template = ConverterPreset::WatersFunctions
//!     .template("masswolf", "/data/run01.raw", "/data/run01.mzXML");
//! let job = ConversionJob::new("/data/run01.raw", "/data/run01.mzXML", template)
//!     .with_split(SplitMode::VariantA);
//!
//! let handle = job.spawn(
//!     Arc::new(SystemProcessRunner::new()),
//!     Arc::new(ConversionSettings::default()),
//! )?;
//! while !handle.wait_timeout(Duration::from_millis(250)) {
//!     println!("status: {}", handle.status());
//! }
//! if let Some(reason) = handle.error_description() {
//!     eprintln!("conversion failed: {}", reason);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

mod error;
mod handle;


use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::levels::{discover_levels, level_path, LevelSplitter};
use crate::merge::{effective_level_count, LevelMerger};
use crate::runner::ProcessRunner;
use crate::settings::ConversionSettings;
use crate::template::{CommandTemplate, SlotRole};

pub use error::{ConversionError, JobPanicked};
pub use handle::{JobHandle, JobStatus, JOB_THREAD_NAME};

/// How a multi-level acquisition is split into per-level files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Single pass, no level discovery
    #[default]
    None,
    /// Re-run with output path and level index rewritten
    #[serde(rename = "a")]
    VariantA,
    /// Re-run into per-level directories with an `msLevel` filter
    #[serde(rename = "b")]
    VariantB,
    /// Variant A followed by Variant B
    Both,
}

impl SplitMode {
    /// Whether levels are discovered at all.
    pub fn is_split(&self) -> bool {
        !matches!(self, SplitMode::None)
    }

    /// Whether Variant A passes run.
    pub fn uses_level_index(&self) -> bool {
        matches!(self, SplitMode::VariantA | SplitMode::Both)
    }

    /// Whether Variant B passes run.
    pub fn uses_filter(&self) -> bool {
        matches!(self, SplitMode::VariantB | SplitMode::Both)
    }

    /// Slot roles a template must carry for this mode.
    pub fn required_roles(&self) -> Vec<SlotRole> {
        let mut roles = vec![SlotRole::Source];
        if self.uses_level_index() {
            roles.extend([SlotRole::OutputPath, SlotRole::LevelIndex]);
        }
        if self.uses_filter() {
            roles.extend([SlotRole::WorkingDir, SlotRole::Filter]);
        }
        roles
    }

    /// Returns all available mode names.
    pub fn variants() -> &'static [&'static str] {
        &["none", "a", "b", "both"]
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMode::None => write!(f, "none"),
            SplitMode::VariantA => write!(f, "a"),
            SplitMode::VariantB => write!(f, "b"),
            SplitMode::Both => write!(f, "both"),
        }
    }
}

impl FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(SplitMode::None),
            "a" | "variant-a" | "index" => Ok(SplitMode::VariantA),
            "b" | "variant-b" | "filter" => Ok(SplitMode::VariantB),
            "both" | "ab" => Ok(SplitMode::Both),
            _ => Err(format!(
                "Unknown split mode '{}'. Valid options: {}",
                s,
                SplitMode::variants().join(", ")
            )),
        }
    }
}

/// Result of a successful conversion job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionOutcome {
    /// Final output file
    pub output: PathBuf,
    /// Number of levels discovered (0 when not split)
    pub level_count: usize,
    /// Converter invocations issued
    pub invocations: usize,
    /// Whether level files were merged into the output
    pub merged: bool,
    /// When the job finished
    pub finished_at: DateTime<Utc>,
}

/// One acquisition to convert.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    source: PathBuf,
    output: PathBuf,
    template: CommandTemplate,
    split: SplitMode,
    marker_dir: Option<PathBuf>,
    staged_name: Option<String>,
}

impl ConversionJob {
    /// Create a job converting `source` to `output` with `template`.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>, template: CommandTemplate) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            template,
            split: SplitMode::None,
            marker_dir: None,
            staged_name: None,
        }
    }

    /// Set the split mode.
    pub fn with_split(mut self, split: SplitMode) -> Self {
        self.split = split;
        self
    }

    /// Look for `_FUN*.DAT` markers in `dir` instead of the source.
    pub fn with_marker_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.marker_dir = Some(dir.into());
        self
    }

    /// Override the file name a Variant B pass writes into its level directory.
    pub fn with_staged_name(mut self, name: impl Into<String>) -> Self {
        self.staged_name = Some(name.into());
        self
    }

    /// Source acquisition.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Canonical output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Split mode.
    pub fn split(&self) -> SplitMode {
        self.split
    }

    /// Command template as it currently stands.
    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }

    /// Directory searched for level markers.
    ///
    /// Vendor acquisitions that are directories hold their markers inside;
    /// for a plain file the containing directory is searched.
    pub fn marker_dir(&self) -> PathBuf {
        if let Some(dir) = &self.marker_dir {
            return dir.clone();
        }
        if self.source.is_dir() {
            self.source.clone()
        } else {
            self.source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    /// File name a Variant B pass produces: `<source stem>.<extension>`.
    pub fn staged_name(&self, settings: &ConversionSettings) -> String {
        if let Some(name) = &self.staged_name {
            return name.clone();
        }
        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}.{}", stem, settings.extension())
    }

    /// Run the job to completion on the current thread.
    pub fn run(
        mut self,
        runner: &dyn ProcessRunner,
        settings: &ConversionSettings,
    ) -> Result<ConversionOutcome, ConversionError> {
        self.template.require_all(&self.split.required_roles())?;

        info!(
            "Converting {} -> {} (split: {})",
            self.source.display(),
            self.output.display(),
            self.split
        );

        let mut splitter = LevelSplitter::new(runner, settings.check_exit_status);
        splitter.run_pass(&self.template)?;
        self.collect_first_pass(settings)?;

        let mut level_count = 0;
        let mut merged = false;

        if self.split.is_split() {
            let marker_dir = self.marker_dir();
            let levels = discover_levels(&marker_dir)
                .map_err(|e| ConversionError::filesystem("scan for level markers in", &marker_dir, e))?;
            level_count = levels.count();
            info!("Found {} level(s) in {}", level_count, marker_dir.display());

            if levels.is_multi_level() {
                if self.split.uses_level_index() {
                    splitter.split_by_level_index(&mut self.template, &self.output, level_count)?;
                }
                if self.split.uses_filter() {
                    let staged = self.staged_name(settings);
                    splitter.split_by_filter(&mut self.template, &self.output, level_count, &staged)?;
                }

                if settings.merge_multiple_files {
                    merge_levels(&self.output, level_count, settings)?;
                    merged = true;
                }
            }
        }

        let outcome = ConversionOutcome {
            output: self.output,
            level_count,
            invocations: splitter.invocations(),
            merged,
            finished_at: Utc::now(),
        };
        info!(
            "Finished {} after {} invocation(s)",
            outcome.output.display(),
            outcome.invocations
        );
        Ok(outcome)
    }

    /// Move the first pass's output to the requested path.
    ///
    /// A command without an output slot writes `<WorkingDir>/<staged name>`,
    /// which need not be the requested output file.
    fn collect_first_pass(&self, settings: &ConversionSettings) -> Result<(), ConversionError> {
        if self.template.has(SlotRole::OutputPath) {
            return Ok(());
        }
        let Some(dir) = self.template.get(SlotRole::WorkingDir) else {
            return Ok(());
        };
        let staged = Path::new(dir).join(self.staged_name(settings));
        if staged == self.output {
            return Ok(());
        }
        debug!("Moving {} -> {}", staged.display(), self.output.display());
        fs::rename(&staged, &self.output)
            .map_err(|e| ConversionError::filesystem("move first-pass output", &staged, e))
    }

    /// Run the job on its own thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the job thread cannot be spawned.
    pub fn spawn(
        self,
        runner: Arc<dyn ProcessRunner>,
        settings: Arc<ConversionSettings>,
    ) -> io::Result<JobHandle<ConversionOutcome, ConversionError>> {
        let label = format!("convert {}", self.source.display());
        JobHandle::spawn(label, move || self.run(runner.as_ref(), &settings))
    }
}

/// Merge levels, delete the level files and move the merged file over `base`.
fn merge_levels(base: &Path, level_count: usize, settings: &ConversionSettings) -> Result<(), ConversionError> {
    let effective = effective_level_count(level_count, settings.skip_last_level);
    let merged = LevelMerger::new(settings.merge_strategy).merge(base, effective)?;

    for level in 1..=level_count {
        let path = level_path(base, level);
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ConversionError::filesystem("remove level file", &path, e)),
        }
    }

    fs::rename(&merged, base).map_err(|e| ConversionError::filesystem("move merged output", &merged, e))?;
    Ok(())
}
