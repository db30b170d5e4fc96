//! Transition tables.
//!
//! A transition table maps the *current* state to the outcome of one event.
//! There is one table per event per machine type.

use super::state::State;

/// What an event does when it arrives in a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome<S: State> {
    /// External transition into the given state; its behavior runs.
    Goto(S),

    /// Legal no-op in this state (`EVENT_IGNORED`).
    Ignored,

    /// Contract violation, the event must never arrive in this state (`CANNOT_HAPPEN`).
    CannotHappen,
}

impl<S: State> Outcome<S> {
    /// Destination state, if this outcome is a transition.
    pub fn destination(&self) -> Option<S> {
        match self {
            Self::Goto(state) => Some(*state),
            Self::Ignored | Self::CannotHappen => None,
        }
    }
}

/// Ordered list of outcomes, one entry per current state.
///
/// Tables built with [`TransitionTable::from_fn`] always have the right length
/// because the mapping function must be total over the state enumeration.
/// Tables built positionally with [`TransitionTable::from_entries`] are
/// length-checked when the descriptor is built.
///
/// # Example
///
/// ```rust
/// use statemap::core::{Outcome, State, TransitionTable};
/// use statemap::state_enum;
///
/// state_enum! {
///     enum Lamp {
///         Off,
///         On,
///     }
/// }
///
/// let toggle = TransitionTable::from_fn(|state: Lamp| match state {
///     Lamp::Off => Outcome::Goto(Lamp::On),
///     Lamp::On => Outcome::Goto(Lamp::Off),
/// });
///
/// assert_eq!(toggle.len(), Lamp::count());
/// assert_eq!(toggle.lookup(Lamp::Off), Some(Outcome::Goto(Lamp::On)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable<S: State> {
    entries: Vec<Outcome<S>>,
}

impl<S: State> TransitionTable<S> {
    /// Build a table from positional entries, in state index order.
    pub fn from_entries(entries: impl Into<Vec<Outcome<S>>>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Build a table from a total mapping over every state.
    pub fn from_fn<F>(mapping: F) -> Self
    where
        F: Fn(S) -> Outcome<S>,
    {
        Self {
            entries: S::ALL.iter().map(|state| mapping(*state)).collect(),
        }
    }

    /// Outcome for an event arriving in `current`.
    ///
    /// Returns `None` only if `current.index()` lies outside the table, which
    /// a validated descriptor rules out for well-formed `State` impls.
    pub fn lookup(&self, current: S) -> Option<Outcome<S>> {
        self.entries.get(current.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Outcome<S>] {
        &self.entries
    }
}
