//! Scripted converter doubles shared by unit tests.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::runner::{ProcessRunner, RunReport, RunnerError, StdoutMode};

type Action = Box<dyn Fn(&[String]) -> std::io::Result<()> + Send + Sync>;

/// Records every invocation and fabricates the files a converter would write.
pub(crate) struct ScriptedRunner {
    calls: Mutex<Vec<(Vec<String>, StdoutMode)>>,
    action: Action,
    exit_code: i32,
}

impl ScriptedRunner {
    pub(crate) fn new(action: impl Fn(&[String]) -> std::io::Result<()> + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            action: Box::new(action),
            exit_code: 0,
        }
    }

    pub(crate) fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Writes `level-<index+1>` to the output slot, like a function-indexed converter.
    pub(crate) fn level_index_converter(output_idx: usize, level_idx: usize) -> Self {
        Self::new(move |argv| {
            let level: usize = argv[level_idx].parse().unwrap_or(0) + 1;
            fs::write(&argv[output_idx], format!("level-{}\n", level))
        })
    }

    /// Writes `level-<n>` to `<dir>/<staged_name>`, where `n` comes from the
    /// trailing `msLevel n` filter.
    pub(crate) fn filter_converter(dir_idx: usize, staged_name: &'static str) -> Self {
        Self::new(move |argv| {
            let filter = argv.last().cloned().unwrap_or_default();
            let level = filter.trim_start_matches("msLevel ").to_string();
            let dir = Path::new(&argv[dir_idx]);
            fs::create_dir_all(dir)?;
            fs::write(dir.join(staged_name), format!("level-{}\n", level))
        })
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(argv, _)| argv.clone())
            .collect()
    }

    pub(crate) fn stdout_modes(&self) -> Vec<StdoutMode> {
        self.calls.lock().unwrap().iter().map(|(_, m)| *m).collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, argv: &[String], stdout: StdoutMode) -> Result<RunReport, RunnerError> {
        self.calls.lock().unwrap().push((argv.to_vec(), stdout));
        (self.action)(argv).map_err(|source| RunnerError::Launch {
            program: argv.first().cloned().unwrap_or_default(),
            source,
        })?;
        Ok(RunReport {
            exit_code: Some(self.exit_code),
            success: self.exit_code == 0,
            elapsed: Duration::from_millis(1),
        })
    }
}
