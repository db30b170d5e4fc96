//! Core state machine types.
//!
//! This module contains the data the dispatch engine works on:
//! - Typed state and event identities via the `State` and `Event` traits
//! - Transition tables and their three outcomes
//! - Bounded history of applied transitions
//!
//! Nothing in here dispatches; see [`crate::engine`] for that.

mod history;
mod state;
mod transition;

pub use history::{StateHistory, StateTransition, TransitionKind};
pub use state::{Event, State};
pub use transition::{Outcome, TransitionTable};
