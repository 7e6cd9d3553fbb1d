//! # Chromatogram Translation
//!
//! After conversion, the merged mzXML is handed to a chromatogram translator.
//! The translator itself is an external component; this module defines the
//! seam ([`ChromatogramTranslator`]) and a thin job around it that reports
//! whether the acquisition switched polarity.
//!
//! [`MzXmlPolarityProbe`] is a built-in translator that only inspects
//! `scan@polarity`. It is enough to decide whether positive and negative ion
//! chromatograms have to be built separately.

mod error;
mod probe;

#[cfg(test)]
mod tests;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::job::JobHandle;
use crate::settings::ConversionSettings;

pub use error::TranslationError;
pub use probe::{MzXmlPolarityProbe, PolarityCounts};

/// Input handed to a chromatogram translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Converted file to translate
    pub path: PathBuf,
    /// File format, e.g. `mzXML`
    pub format: String,
    /// Chromatogram size threshold in MiB
    pub size_threshold_mb: u32,
    /// Worker threads the translator may use
    pub threads: usize,
    /// Intensity scaling factor
    pub scaling_factor: u32,
    /// Lowest m/z resolution kept
    pub resolution_floor: f64,
    /// Whether MS2 scans are read
    pub ms2: bool,
}

impl TranslationRequest {
    /// Request for `path` carrying the translator values of `settings`.
    pub fn from_settings(path: impl Into<PathBuf>, settings: &ConversionSettings) -> Self {
        Self {
            path: path.into(),
            format: settings.extension().to_string(),
            size_threshold_mb: settings.chrom_size_threshold_mb,
            threads: settings.thread_count,
            scaling_factor: settings.scaling_factor,
            resolution_floor: settings.resolution_floor,
            ms2: settings.ms2_enabled,
        }
    }
}

/// What the translator reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationOutcome {
    /// Both polarities occur in the acquisition
    pub polarity_switched: bool,
}

/// Builds chromatograms from a converted file.
pub trait ChromatogramTranslator: Send + Sync {
    /// Translate the file named by `request`.
    fn translate(&self, request: &TranslationRequest) -> Result<TranslationOutcome, TranslationError>;
}

/// A translation run, optionally on its own thread.
pub struct TranslationJob {
    request: TranslationRequest,
    translator: Arc<dyn ChromatogramTranslator>,
}

impl TranslationJob {
    /// Create a job running `translator` on `request`.
    pub fn new(request: TranslationRequest, translator: Arc<dyn ChromatogramTranslator>) -> Self {
        Self {
            request,
            translator,
        }
    }

    /// The request this job will hand to the translator.
    pub fn request(&self) -> &TranslationRequest {
        &self.request
    }

    /// Run the translator on the current thread.
    pub fn run(&self) -> Result<TranslationOutcome, TranslationError> {
        info!("Translating {}", self.request.path.display());
        let outcome = self.translator.translate(&self.request)?;
        if outcome.polarity_switched {
            info!("{} switches polarity", self.request.path.display());
        }
        Ok(outcome)
    }

    /// Run the translator on its own thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the job thread cannot be spawned.
    pub fn spawn(self) -> io::Result<JobHandle<TranslationOutcome, TranslationError>> {
        let label = format!("translate {}", self.request.path.display());
        JobHandle::spawn(label, move || self.run())
    }
}
