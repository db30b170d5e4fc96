//! Statemap: a table-driven finite state machine engine
//!
//! Many independent state machines share one dispatch algorithm. Each machine
//! type supplies a name, one behavior per state, and one transition table per
//! event; the engine does the rest.
//!
//! # Core Concepts
//!
//! - **States and events**: typed enumerations whose declaration order is
//!   their identity (`state_enum!`, `event_enum!`)
//! - **Transition tables**: per event, one [`Outcome`] per current state:
//!   go to a state, ignore the event, or treat it as a contract violation
//! - **Descriptors**: immutable, validated machine definitions shared by
//!   any number of instances
//! - **Instances**: own the current state and the domain data, and dispatch
//!   events synchronously
//! - **Event data**: move-once payloads whose allocator blocks are released
//!   exactly once, on every dispatch path
//!
//! # Example
//!
//! ```rust
//! use statemap::prelude::*;
//! use statemap::{event_enum, state_enum};
//! use std::sync::Arc;
//!
//! state_enum! {
//!     pub enum Door {
//!         Closed,
//!         Open,
//!     }
//! }
//!
//! event_enum! {
//!     pub enum Push {
//!         Open,
//!         Close,
//!     }
//! }
//!
//! struct DoorMachine;
//!
//! impl Machine for DoorMachine {
//!     type State = Door;
//!     type Event = Push;
//!     type Data = u32;
//!     type Payload = ();
//! }
//!
//! fn count_entry(ctx: &mut Context<'_, DoorMachine>, _payload: Option<&()>) {
//!     *ctx.data_mut() += 1;
//! }
//!
//! let descriptor = Descriptor::<DoorMachine>::builder("Door")
//!     .state(Door::Closed, count_entry)
//!     .state(Door::Open, count_entry)
//!     .transitions(Push::Open, TransitionTable::from_fn(|state| match state {
//!         Door::Closed => Outcome::Goto(Door::Open),
//!         Door::Open => Outcome::Ignored,
//!     }))
//!     .transitions(Push::Close, TransitionTable::from_fn(|state| match state {
//!         Door::Closed => Outcome::Ignored,
//!         Door::Open => Outcome::Goto(Door::Closed),
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let mut door = Instance::new("front", Arc::new(descriptor), 0);
//! door.external_event(Push::Open, None).unwrap();
//! door.external_event(Push::Open, None).unwrap();
//!
//! assert_eq!(door.current_state(), Door::Open);
//! assert_eq!(*door.data(), 1);
//! ```

pub mod alloc;
pub mod builder;
pub mod config;
pub mod core;
pub mod engine;
pub mod fault;

// Re-export commonly used types
pub use crate::builder::{BuildError, DescriptorBuilder, StructuralDefect};
pub use crate::config::{CascadePolicy, EngineConfig};
pub use crate::core::{Event, Outcome, State, StateHistory, StateTransition, TransitionTable};
pub use crate::engine::{Context, Descriptor, Dispatch, Instance, Machine};
pub use crate::fault::{Fault, FaultHandler, FaultKind};

pub mod prelude {
    pub use crate::alloc::{EventAllocator, EventData, FixedBlockPool, HeapAllocator};
    pub use crate::config::{CascadePolicy, EngineConfig};
    pub use crate::core::{Event, Outcome, State, TransitionTable};
    pub use crate::engine::{Context, Descriptor, Dispatch, Instance, Machine};
    pub use crate::fault::{Fault, FaultHandler, FaultKind};
}
