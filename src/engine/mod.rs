//! The table-driven dispatch engine.
//!
//! A [`Descriptor`] is the immutable definition of one machine type: its name,
//! one behavior per state, and one transition table per event. Any number of
//! [`Instance`]s share a descriptor through an `Arc`; each owns its current
//! state and its domain data.
//!
//! # Dispatch
//!
//! [`Instance::external_event`] looks up the outcome for the current state in
//! the event's table:
//! - `Ignored`: nothing runs, the payload is released.
//! - `CannotHappen`: the payload is released, the fault is reported, and the
//!   instance halts.
//! - `Goto(s)`: the current state becomes `s` first, then `s`'s behavior runs
//!   with the payload.
//!
//! A behavior may call [`Context::internal_event`] once to move the machine
//! without consulting any table. What happens next is governed by
//! [`crate::config::CascadePolicy`].
//!
//! # Concurrency
//!
//! Dispatch is synchronous and runs to completion. An instance is driven
//! through `&mut self`, so at most one event is in flight per instance; sharing
//! one across threads requires the caller to serialize access (for example
//! behind a `Mutex`). Descriptors are read-only and freely shared.

mod context;
mod descriptor;
mod instance;

pub use context::Context;
pub use descriptor::{Descriptor, StateBehavior};
pub use instance::{Dispatch, Instance};

use crate::core::{Event, State};

/// Bundle of the types that make up one machine.
///
/// # Example
///
/// ```rust
/// use statemap::engine::Machine;
/// use statemap::{event_enum, state_enum};
///
/// state_enum! {
///     pub enum PumpState {
///         Idle,
///         Running,
///     }
/// }
///
/// event_enum! {
///     pub enum PumpEvent {
///         Start,
///         Stop,
///     }
/// }
///
/// pub struct Pump {
///     pub flow: u32,
/// }
///
/// pub struct PumpMachine;
///
/// impl Machine for PumpMachine {
///     type State = PumpState;
///     type Event = PumpEvent;
///     type Data = Pump;
///     type Payload = u32;
/// }
/// ```
pub trait Machine: Sized + 'static {
    type State: State;
    type Event: Event;
    /// Per-instance domain data handed to state behaviors.
    type Data;
    /// Event data type accepted by this machine's behaviors.
    type Payload;
}
