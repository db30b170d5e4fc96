//! Build errors for machine descriptors.

use thiserror::Error;

/// One structural problem found while validating a descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuralDefect {
    #[error("Machine name is empty")]
    EmptyName,

    #[error("State enumeration has no states")]
    NoStates,

    #[error("Expected {expected} state behaviors, found {found}")]
    StateCountMismatch { expected: usize, found: usize },

    #[error("Behavior at position {position} is for state '{state}' (index {index})")]
    StateOutOfOrder {
        position: usize,
        state: &'static str,
        index: usize,
    },

    #[error("State '{state}' is listed at position {position} but reports index {index}")]
    InconsistentStateIndex {
        state: &'static str,
        position: usize,
        index: usize,
    },

    #[error("No transition table for event '{event}'")]
    MissingTransitionTable { event: &'static str },

    #[error("Transition table for event '{event}' registered more than once")]
    DuplicateTransitionTable { event: &'static str },

    #[error("Transition table for event '{event}' has {found} entries, expected {expected}")]
    TableLengthMismatch {
        event: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Transition table for event '{event}' targets state index {index} (states: {count})")]
    DestinationOutOfRange {
        event: &'static str,
        index: usize,
        count: usize,
    },
}

/// Errors that can occur when building a machine descriptor.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Every defect found, not just the first.
    #[error("Machine '{machine}' has {} structural defect(s): {}", .defects.len(), render(.defects))]
    Invalid {
        machine: String,
        defects: Vec<StructuralDefect>,
    },
}

impl BuildError {
    pub fn defects(&self) -> &[StructuralDefect] {
        match self {
            Self::Invalid { defects, .. } => defects,
        }
    }
}

fn render(defects: &[StructuralDefect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
