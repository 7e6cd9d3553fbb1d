//! # Command Templates
//!
//! External converters are driven by positional argument vectors. Historically
//! the per-level rewriting logic poked at magic indices of a mutable string
//! array; here the command is an ordered sequence of typed [`Slot`]s instead.
//! Fixed tokens are emitted verbatim, mutable slots carry a [`SlotRole`] that
//! the level splitter addresses by name.
//!
//! Emission order is exactly slot order, so the executable still sees the
//! argument layout it expects.
//!
//! ```rust
//! use lipidconv::template::{CommandTemplate, SlotRole};
//!
//! let mut template = CommandTemplate::new("masswolf")
//!     .fixed("--mzXML")
//!     .slot(SlotRole::Source, "/data/run01.raw")
//!     .fixed("-o")
//!     .slot(SlotRole::OutputPath, "/data/run01.mzXML");
//!
//! template.set(SlotRole::OutputPath, "/data/run01.mzXML2")?;
//! assert_eq!(template.to_argv()[4], "/data/run01.mzXML2");
//! # Ok::<(), lipidconv::template::TemplateError>(())
//! ```

mod error;
mod layout;


use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::TemplateError;
pub use layout::{SlotLayout, SlotPosition};

/// Semantic role of a mutable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    /// Source acquisition path (file or vendor directory)
    Source,
    /// Directory the converter writes into (rewritten per level in Variant B)
    WorkingDir,
    /// Output file path (rewritten per level in Variant A)
    OutputPath,
    /// Zero-based level/function index (rewritten per level in Variant A)
    LevelIndex,
    /// Filter expression such as `msLevel 2` (rewritten per level in Variant B)
    Filter,
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRole::Source => write!(f, "source"),
            SlotRole::WorkingDir => write!(f, "working-directory"),
            SlotRole::OutputPath => write!(f, "output-path"),
            SlotRole::LevelIndex => write!(f, "level-index"),
            SlotRole::Filter => write!(f, "filter"),
        }
    }
}

/// One position in a command template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Token emitted verbatim
    Fixed(String),
    /// Token addressed by role and rewritten between passes
    Mutable {
        /// Role of this slot
        role: SlotRole,
        /// Current value
        value: String,
    },
}

impl Slot {
    fn token(&self) -> &str {
        match self {
            Slot::Fixed(token) => token,
            Slot::Mutable { value, .. } => value,
        }
    }

    fn role(&self) -> Option<SlotRole> {
        match self {
            Slot::Fixed(_) => None,
            Slot::Mutable { role, .. } => Some(*role),
        }
    }
}

/// Ordered, typed command line for an external converter.
///
/// The first slot is the program. Each [`SlotRole`] appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    slots: Vec<Slot>,
}

impl CommandTemplate {
    /// Start a template with the program to execute.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            slots: vec![Slot::Fixed(program.into())],
        }
    }

    /// Append a fixed token.
    pub fn fixed(mut self, token: impl Into<String>) -> Self {
        self.slots.push(Slot::Fixed(token.into()));
        self
    }

    /// Append a mutable slot.
    ///
    /// If `role` already exists the existing slot keeps its position and only
    /// its value is replaced; use [`CommandTemplate::from_slots`] to get a
    /// validation error for duplicated roles instead.
    pub fn slot(mut self, role: SlotRole, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.position(role) {
            Some(idx) => self.slots[idx] = Slot::Mutable { role, value },
            None => self.slots.push(Slot::Mutable { role, value }),
        }
        self
    }

    /// Build a template from explicit slots, rejecting duplicated roles.
    pub fn from_slots(slots: Vec<Slot>) -> Result<Self, TemplateError> {
        if slots.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut seen = Vec::new();
        for role in slots.iter().filter_map(Slot::role) {
            if seen.contains(&role) {
                return Err(TemplateError::DuplicateRole(role));
            }
            seen.push(role);
        }
        Ok(Self { slots })
    }

    /// Build a template from a legacy positional token vector.
    ///
    /// Every position named by `layout` becomes a mutable slot; all other
    /// tokens stay fixed.
    pub fn from_tokens<S: AsRef<str>>(
        tokens: &[S],
        layout: &SlotLayout,
    ) -> Result<Self, TemplateError> {
        if tokens.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut slots: Vec<Slot> = tokens
            .iter()
            .map(|t| Slot::Fixed(t.as_ref().to_string()))
            .collect();

        for (position, role) in layout.entries() {
            let index = position.resolve(tokens.len())?;
            let value = slots[index].token().to_string();
            if let Slot::Mutable { role: existing, .. } = &slots[index] {
                return Err(TemplateError::DuplicateRole(*existing));
            }
            slots[index] = Slot::Mutable { role: *role, value };
        }

        Self::from_slots(slots)
    }

    fn position(&self, role: SlotRole) -> Option<usize> {
        self.slots.iter().position(|s| s.role() == Some(role))
    }

    /// Program token (first slot).
    pub fn program(&self) -> &str {
        self.slots.first().map(Slot::token).unwrap_or_default()
    }

    /// Whether a slot with this role exists.
    pub fn has(&self, role: SlotRole) -> bool {
        self.position(role).is_some()
    }

    /// Current value of a role, if present.
    pub fn get(&self, role: SlotRole) -> Option<&str> {
        self.position(role).map(|idx| self.slots[idx].token())
    }

    /// Current value of a role, or a configuration error when it is missing.
    pub fn require(&self, role: SlotRole) -> Result<&str, TemplateError> {
        self.get(role).ok_or(TemplateError::MissingSlot(role))
    }

    /// Check that every role in `roles` is present.
    pub fn require_all(&self, roles: &[SlotRole]) -> Result<(), TemplateError> {
        for role in roles {
            self.require(*role)?;
        }
        Ok(())
    }

    /// Overwrite the value of an existing role.
    pub fn set(&mut self, role: SlotRole, value: impl Into<String>) -> Result<(), TemplateError> {
        let idx = self.position(role).ok_or(TemplateError::MissingSlot(role))?;
        self.slots[idx] = Slot::Mutable {
            role,
            value: value.into(),
        };
        Ok(())
    }

    /// Snapshot of every mutable slot, used to restore the template after
    /// per-level passes.
    pub fn mutable_values(&self) -> Vec<(SlotRole, String)> {
        self.slots
            .iter()
            .filter_map(|s| match s {
                Slot::Mutable { role, value } => Some((*role, value.clone())),
                Slot::Fixed(_) => None,
            })
            .collect()
    }

    /// Restore values captured by [`CommandTemplate::mutable_values`].
    pub fn restore(&mut self, values: &[(SlotRole, String)]) -> Result<(), TemplateError> {
        for (role, value) in values {
            self.set(*role, value.clone())?;
        }
        Ok(())
    }

    /// Slots in emission order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Emit the argument vector, program first.
    pub fn to_argv(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.token().to_string()).collect()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the template has no tokens.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            let token = slot.token();
            if token.contains(char::is_whitespace) {
                write!(f, "\"{}\"", token)?;
            } else {
                write!(f, "{}", token)?;
            }
        }
        Ok(())
    }
}
