use crate::job::JobPanicked;

/// Errors reported by a chromatogram translator
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    /// Input could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not well-formed XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The translator cannot handle the requested input
    #[error("Unsupported input: {0}")]
    Unsupported(String),

    /// The translation thread panicked
    #[error("{0}")]
    Panicked(#[from] JobPanicked),
}
