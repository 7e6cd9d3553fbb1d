//! Positional role layouts for legacy argument vectors.

use serde::{Deserialize, Serialize};

use super::{SlotRole, TemplateError};

/// Where a role sits in a positional argument vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPosition {
    /// Absolute index (0 = program)
    Index(usize),
    /// Final token
    Last,
}

impl SlotPosition {
    pub(super) fn resolve(self, len: usize) -> Result<usize, TemplateError> {
        match self {
            SlotPosition::Index(index) if index < len => Ok(index),
            SlotPosition::Index(index) => Err(TemplateError::IndexOutOfRange { index, len }),
            SlotPosition::Last if len > 0 => Ok(len - 1),
            SlotPosition::Last => Err(TemplateError::Empty),
        }
    }
}

/// Mapping from argument positions to mutable roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    entries: Vec<(SlotPosition, SlotRole)>,
}

impl SlotLayout {
    /// Empty layout (every token fixed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role at a position.
    pub fn with(mut self, position: SlotPosition, role: SlotRole) -> Self {
        self.entries.push((position, role));
        self
    }

    /// Layout used by function-indexed converters (Variant A):
    /// 2 = source, 5 = output path, 7 = level index.
    pub fn variant_a() -> Self {
        Self::new()
            .with(SlotPosition::Index(2), SlotRole::Source)
            .with(SlotPosition::Index(5), SlotRole::OutputPath)
            .with(SlotPosition::Index(7), SlotRole::LevelIndex)
    }

    /// Layout used by filter-driven converters (Variant B):
    /// 2 = source, 4 = working directory, last = `msLevel N` filter.
    pub fn variant_b() -> Self {
        Self::new()
            .with(SlotPosition::Index(2), SlotRole::Source)
            .with(SlotPosition::Index(4), SlotRole::WorkingDir)
            .with(SlotPosition::Last, SlotRole::Filter)
    }

    pub(super) fn entries(&self) -> &[(SlotPosition, SlotRole)] {
        &self.entries
    }
}
