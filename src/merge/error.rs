use std::path::PathBuf;

/// Errors that can occur while merging per-level files
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A level file expected by the merge does not exist
    #[error("Level file not found: {}", .0.display())]
    MissingLevelFile(PathBuf),

    /// I/O error on a specific file
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the merged output stream
    #[error("I/O error: {0}")]
    Write(#[from] std::io::Error),

    /// Error parsing an mzXML segment
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A segment is not a well-formed mzXML document
    #[error("Invalid mzXML structure: {0}")]
    InvalidStructure(String),

    /// Called with zero levels
    #[error("No level files to merge")]
    NothingToMerge,
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io {
            path: path.into(),
            source,
        }
    }
}
