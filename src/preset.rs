//! Converter presets.
//!
//! Presets build the command templates of the two converter families the
//! pipeline knows how to split:
//!
//! - `waters-functions`: function-indexed converter, one output file per
//!   function, selected with a level index ([`SlotLayout::variant_a`])
//! - `msconvert`: filter-driven converter writing `<stem>.<ext>` into a
//!   working directory ([`SlotLayout::variant_b`])

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::job::SplitMode;
use crate::template::{CommandTemplate, SlotLayout, SlotRole};

/// Known converter command layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConverterPreset {
    /// Function-indexed converter (Variant A).
    ///
    /// `<exe> --mzXML <source> --MSe -o <output> --function <index>`
    #[default]
    WatersFunctions,

    /// Filter-driven converter (Variant B).
    ///
    /// `<exe> --mzXML <source> -o <output dir> --filter "msLevel <n>"`
    MsConvert,
}

impl ConverterPreset {
    /// Executable name used when none is configured.
    pub fn default_program(&self) -> &'static str {
        match self {
            ConverterPreset::WatersFunctions => "masswolf",
            ConverterPreset::MsConvert => "msconvert",
        }
    }

    /// Split mode this converter family supports.
    pub fn split_mode(&self) -> SplitMode {
        match self {
            ConverterPreset::WatersFunctions => SplitMode::VariantA,
            ConverterPreset::MsConvert => SplitMode::VariantB,
        }
    }

    /// Positional layout of the emitted command.
    pub fn layout(&self) -> SlotLayout {
        match self {
            ConverterPreset::WatersFunctions => SlotLayout::variant_a(),
            ConverterPreset::MsConvert => SlotLayout::variant_b(),
        }
    }

    /// Build the level-1 command for converting `source` to `output`.
    ///
    /// For [`ConverterPreset::MsConvert`] the working directory is the parent
    /// of `output`; the converter names its file after the source stem.
    pub fn template(
        &self,
        program: &str,
        source: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> CommandTemplate {
        let source = source.as_ref().to_string_lossy().into_owned();
        let output = output.as_ref();
        match self {
            ConverterPreset::WatersFunctions => CommandTemplate::new(program)
                .fixed("--mzXML")
                .slot(SlotRole::Source, source)
                .fixed("--MSe")
                .fixed("-o")
                .slot(SlotRole::OutputPath, output.to_string_lossy())
                .fixed("--function")
                .slot(SlotRole::LevelIndex, "0"),
            ConverterPreset::MsConvert => {
                let dir = output
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                CommandTemplate::new(program)
                    .fixed("--mzXML")
                    .slot(SlotRole::Source, source)
                    .fixed("-o")
                    .slot(SlotRole::WorkingDir, dir.to_string_lossy())
                    .fixed("--filter")
                    .slot(SlotRole::Filter, "msLevel 1")
            }
        }
    }

    /// Returns all available preset names.
    pub fn variants() -> &'static [&'static str] {
        &["waters-functions", "msconvert"]
    }
}

impl fmt::Display for ConverterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterPreset::WatersFunctions => write!(f, "waters-functions"),
            ConverterPreset::MsConvert => write!(f, "msconvert"),
        }
    }
}

impl FromStr for ConverterPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waters-functions" | "waters" | "masswolf" => Ok(ConverterPreset::WatersFunctions),
            "msconvert" | "proteowizard" => Ok(ConverterPreset::MsConvert),
            _ => Err(format!(
                "Unknown converter preset '{}'. Valid options: {}",
                s,
                ConverterPreset::variants().join(", ")
            )),
        }
    }
}
