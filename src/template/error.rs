use super::SlotRole;

/// Errors raised while building or rewriting a command template.
///
/// These are configuration errors: they are detected before any external
/// process is launched.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A slot required by the selected split mode is not present
    #[error("Command template has no {0} slot")]
    MissingSlot(SlotRole),

    /// A positional layout referenced an index outside the token vector
    #[error("Slot index {index} is out of range for a command of {len} tokens")]
    IndexOutOfRange {
        /// Index named by the layout
        index: usize,
        /// Number of tokens in the command
        len: usize,
    },

    /// The same mutable role was assigned to more than one position
    #[error("Role {0} is assigned to more than one slot")]
    DuplicateRole(SlotRole),

    /// A template without any tokens cannot be executed
    #[error("Command template is empty")]
    Empty,
}
