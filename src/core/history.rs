//! State transition history tracking.
//!
//! Instances can keep a bounded, timestamped record of every transition they
//! apply. Ignored and illegal events change nothing and are never recorded.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// How a transition was initiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Caller-initiated, looked up in a transition table.
    External,
    /// Requested by a state behavior, bypassing the transition tables.
    Internal,
}

/// Record of a single applied transition.
///
/// # Example
///
/// ```rust
/// use statemap::core::{StateTransition, TransitionKind};
/// use statemap::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Valve {
///         Shut,
///         Open,
///     }
/// }
///
/// let transition = StateTransition {
///     from: Valve::Shut,
///     to: Valve::Open,
///     kind: TransitionKind::External,
///     event: Some("Open".to_string()),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.kind, TransitionKind::External);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    pub kind: TransitionKind,
    /// Name of the external event that caused it, `None` for internal transitions
    pub event: Option<String>,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered, optionally bounded history of state transitions.
///
/// When a limit is set, the oldest entries are dropped once it is reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    limit: Option<usize>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new, unbounded, empty history.
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: None,
        }
    }

    /// Create an empty history that keeps at most `limit` transitions.
    pub fn bounded(limit: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(limit.min(64)),
            limit: Some(limit),
        }
    }

    /// Append a transition, evicting the oldest one if the limit is reached.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.transitions.len() >= limit {
                self.transitions.pop_front();
            }
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition, then the
    /// `to` state of each transition.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statemap::core::{StateHistory, StateTransition, TransitionKind};
    /// use statemap::state_enum;
    /// use chrono::Utc;
    ///
    /// state_enum! {
    ///     enum Kiln {
    ///         Cold,
    ///         Firing,
    ///         Cooling,
    ///     }
    /// }
    ///
    /// let mut history = StateHistory::new();
    /// history.record(StateTransition {
    ///     from: Kiln::Cold,
    ///     to: Kiln::Firing,
    ///     kind: TransitionKind::External,
    ///     event: Some("Ignite".to_string()),
    ///     timestamp: Utc::now(),
    /// });
    /// history.record(StateTransition {
    ///     from: Kiln::Firing,
    ///     to: Kiln::Cooling,
    ///     kind: TransitionKind::Internal,
    ///     event: None,
    ///     timestamp: Utc::now(),
    /// });
    ///
    /// assert_eq!(history.get_path(), vec![&Kiln::Cold, &Kiln::Firing, &Kiln::Cooling]);
    /// ```
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last retained transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Iterate over retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> + '_ {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
