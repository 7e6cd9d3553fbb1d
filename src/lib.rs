//! # lipidconv - Multi-Level Raw to mzXML Conversion
//!
//! `lipidconv` drives vendor converters over lipidomics mass-spectrometry
//! acquisitions and produces one chromatogram-ready mzXML file per run, even
//! when the instrument recorded several MS levels ("functions") that the
//! converter can only export one at a time.
//!
//! ## Pipeline
//!
//! ```text
//! run01.raw/                      out/
//! ├── _FUNC001.DAT   first pass   ├── run01.mzXML     ┐
//! ├── _FUNC002.DAT ─────────────▶ ├── run01.mzXML2    ├─ merge ─▶ run01.mzXML
//! └── _FUNC003.DAT   per level    └── run01.mzXML3    ┘
//! ```
//!
//! 1. The converter runs once with the level-1 command.
//! 2. Level markers (`_FUN*.DAT`) are counted in the acquisition.
//! 3. Each further level is converted by rewriting the command template,
//!    either by level index (Variant A) or by an `msLevel` filter into a
//!    per-level directory (Variant B).
//! 4. Level files are merged in ascending level order, deleted, and the merged
//!    file takes the canonical output name.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lipidconv::prelude::*;
//!
//! let template = ConverterPreset::WatersFunctions
//!     .template("masswolf", "run01.raw", "out/run01.mzXML");
//! let outcome = ConversionJob::new("run01.raw", "out/run01.mzXML", template)
//!     .with_split(SplitMode::VariantA)
//!     .run(&SystemProcessRunner::new(), &ConversionSettings::default())?;
//!
//! println!("{} levels -> {}", outcome.level_count, outcome.output.display());
//! # Ok::<(), lipidconv::job::ConversionError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`template`]: typed, ordered converter command lines
//! - [`runner`]: external process execution
//! - [`levels`]: level discovery and per-level converter passes
//! - [`merge`]: level file merging
//! - [`job`]: the conversion job, its status and background handle
//! - [`settings`]: injected configuration
//! - [`preset`]: command templates of known converters
//! - [`translate`]: chromatogram translator seam and polarity probe

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod job;
pub mod levels;
pub mod merge;
pub mod preset;
pub mod runner;
pub mod settings;
pub mod template;
pub mod translate;

#[cfg(test)]
mod test_support;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::job::{
        ConversionError, ConversionJob, ConversionOutcome, JobHandle, JobStatus, SplitMode,
    };
    pub use crate::levels::{discover_levels, level_path, LevelSet};
    pub use crate::merge::{effective_level_count, LevelMerger, MergeError, MergeStrategy};
    pub use crate::preset::ConverterPreset;
    pub use crate::runner::{ProcessRunner, RunReport, StdoutMode, SystemProcessRunner};
    pub use crate::settings::ConversionSettings;
    pub use crate::template::{CommandTemplate, Slot, SlotLayout, SlotRole};
    pub use crate::translate::{
        ChromatogramTranslator, MzXmlPolarityProbe, TranslationJob, TranslationOutcome,
        TranslationRequest,
    };
}
