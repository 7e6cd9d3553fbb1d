use std::io;
use std::path::{Path, PathBuf};

use crate::merge::MergeError;
use crate::runner::RunnerError;
use crate::template::TemplateError;

/// A job thread panicked before producing a result
#[derive(Debug, Clone, thiserror::Error)]
#[error("job thread panicked: {0}")]
pub struct JobPanicked(pub String);

/// Errors that abort a conversion job
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The command template cannot serve the requested split mode
    #[error("Configuration error: {0}")]
    Configuration(#[from] TemplateError),

    /// The external converter could not be run or failed
    #[error("Converter error: {0}")]
    Process(#[from] RunnerError),

    /// A filesystem step of the pipeline failed
    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        /// Step that failed, e.g. "move level output"
        action: &'static str,
        /// Path the step operated on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Merging the level files failed
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// The job thread panicked
    #[error("{0}")]
    Panicked(#[from] JobPanicked),
}

impl ConversionError {
    pub(crate) fn filesystem(action: &'static str, path: &Path, source: io::Error) -> Self {
        ConversionError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}
