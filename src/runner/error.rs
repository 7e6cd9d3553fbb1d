/// Errors raised while executing an external converter.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// No program was given
    #[error("Cannot run an empty command")]
    EmptyCommand,

    /// The process could not be started (missing executable, permissions, ...)
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Waiting for process termination failed
    #[error("Interrupted while waiting for '{program}': {source}")]
    WaitInterrupted {
        /// Program being waited on
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The process terminated unsuccessfully and exit status checking is enabled
    #[error("'{program}' exited unsuccessfully ({})", exit_code_label(.code))]
    NonZeroExit {
        /// Program that failed
        program: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
