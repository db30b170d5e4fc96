//! Typed state and event identities.
//!
//! A state's position in `State::ALL` *is* its identity: the state table of a
//! descriptor and every transition table are indexed by it. Events are the
//! keys under which a descriptor stores its transition tables.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// States are fieldless enumerations. `ALL` lists every state in declaration
/// order, and `index()` must agree with that order; descriptors check this
/// when they are built.
///
/// # Example
///
/// ```rust
/// use statemap::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum DoorState {
///     Closed,
///     Open,
/// }
///
/// impl State for DoorState {
///     const ALL: &'static [Self] = &[Self::Closed, Self::Open];
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///         }
///     }
///
///     fn index(&self) -> usize {
///         *self as usize
///     }
/// }
///
/// assert_eq!(DoorState::from_index(1), Some(DoorState::Open));
/// assert_eq!(DoorState::count(), 2);
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Every state, in index order.
    const ALL: &'static [Self];

    /// Get the state's name for display/logging.
    fn name(&self) -> &'static str;

    /// Position of this state in the state table.
    fn index(&self) -> usize;

    /// Resolve an index back into a state.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Number of states (the length every transition table must have).
    fn count() -> usize {
        Self::ALL.len()
    }
}

/// Trait for the external events a machine accepts.
///
/// Each event owns one transition table in the machine's descriptor.
pub trait Event: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every event the machine accepts.
    const ALL: &'static [Self];

    /// Get the event's name for display/logging.
    fn name(&self) -> &'static str;
}
