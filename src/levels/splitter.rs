use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::level_path;
use crate::job::ConversionError;
use crate::runner::{ProcessRunner, RunReport, RunnerError, StdoutMode};
use crate::template::{CommandTemplate, SlotRole};

/// Drives converter passes, including the per-level re-invocations of a
/// split acquisition.
pub struct LevelSplitter<'a> {
    runner: &'a dyn ProcessRunner,
    check_exit_status: bool,
    invocations: usize,
}

impl<'a> LevelSplitter<'a> {
    /// Create a splitter on top of a runner.
    ///
    /// With `check_exit_status` disabled an unsuccessful exit is only logged
    /// and the produced files are trusted.
    pub fn new(runner: &'a dyn ProcessRunner, check_exit_status: bool) -> Self {
        Self {
            runner,
            check_exit_status,
            invocations: 0,
        }
    }

    /// Number of converter invocations issued so far.
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    /// Run the template once as it currently stands.
    pub fn run_pass(&mut self, template: &CommandTemplate) -> Result<RunReport, ConversionError> {
        let argv = template.to_argv();
        let stdout = template
            .get(SlotRole::Source)
            .map(StdoutMode::for_source)
            .unwrap_or_default();

        self.invocations += 1;
        let report = self.runner.run(&argv, stdout)?;

        if !report.success {
            if self.check_exit_status {
                return Err(RunnerError::NonZeroExit {
                    program: template.program().to_string(),
                    code: report.exit_code,
                }
                .into());
            }
            warn!(
                "'{}' exited unsuccessfully ({:?}); continuing with produced files",
                template.program(),
                report.exit_code
            );
        }
        Ok(report)
    }

    /// Variant A: re-run the converter for levels 2..=`level_count`, pointing
    /// the output slot at `base + i` and the level-index slot at `i - 1`.
    ///
    /// Level 1 was produced by the first pass. The template's mutable slots
    /// are restored afterwards.
    pub fn split_by_level_index(
        &mut self,
        template: &mut CommandTemplate,
        base: &Path,
        level_count: usize,
    ) -> Result<(), ConversionError> {
        template.require_all(&[SlotRole::OutputPath, SlotRole::LevelIndex])?;
        let saved = template.mutable_values();

        for level in 2..=level_count {
            let output = level_path(base, level);
            info!("Converting level {} of {} -> {}", level, level_count, output.display());
            template.set(SlotRole::OutputPath, output.to_string_lossy())?;
            template.set(SlotRole::LevelIndex, (level - 1).to_string())?;
            self.run_pass(template)?;
        }

        template.restore(&saved)?;
        Ok(())
    }

    /// Variant B: re-run the converter for levels 2..=`level_count` into a
    /// per-level subdirectory `<dir>/<i>` with an `msLevel i` filter, then move
    /// `<dir>/<i>/<staged_name>` to `base + i` and remove the subdirectory.
    ///
    /// Removing the subdirectory is best-effort; leftovers are left behind
    /// without failing the job.
    pub fn split_by_filter(
        &mut self,
        template: &mut CommandTemplate,
        base: &Path,
        level_count: usize,
        staged_name: &str,
    ) -> Result<(), ConversionError> {
        template.require_all(&[SlotRole::WorkingDir, SlotRole::Filter])?;
        let saved = template.mutable_values();
        let original_dir = PathBuf::from(template.require(SlotRole::WorkingDir)?);

        for level in 2..=level_count {
            let level_dir = original_dir.join(level.to_string());
            fs::create_dir_all(&level_dir)
                .map_err(|e| ConversionError::filesystem("create directory", &level_dir, e))?;

            info!(
                "Converting level {} of {} into {}",
                level,
                level_count,
                level_dir.display()
            );
            template.set(SlotRole::WorkingDir, level_dir.to_string_lossy())?;
            template.set(SlotRole::Filter, format!("msLevel {}", level))?;
            self.run_pass(template)?;

            let produced = level_dir.join(staged_name);
            let target = level_path(base, level);
            fs::rename(&produced, &target)
                .map_err(|e| ConversionError::filesystem("move level output", &produced, e))?;

            if let Err(e) = fs::remove_dir(&level_dir) {
                debug!("Leaving {} in place: {}", level_dir.display(), e);
            }
        }

        template.restore(&saved)?;
        Ok(())
    }
}
