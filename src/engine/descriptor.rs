//! Immutable per-type machine definition.

use super::{Context, Machine};
use crate::builder::DescriptorBuilder;
use crate::core::{Outcome, State, TransitionTable};
use std::collections::HashMap;
use std::fmt;

/// Behavior run when a state is entered.
///
/// Receives the instance context and a borrow of the event payload, if any.
pub type StateBehavior<M> =
    Box<dyn Fn(&mut Context<'_, M>, Option<&<M as Machine>::Payload>) + Send + Sync>;

/// Definition shared by every instance of one machine type.
///
/// Only [`DescriptorBuilder::build`] creates descriptors, so every descriptor
/// has one behavior per state in index order and one correctly sized
/// transition table per event.
pub struct Descriptor<M: Machine> {
    pub(crate) name: String,
    pub(crate) behaviors: Vec<StateBehavior<M>>,
    pub(crate) tables: HashMap<M::Event, TransitionTable<M::State>>,
    pub(crate) initial: M::State,
}

impl<M: Machine> Descriptor<M> {
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder<M> {
        DescriptorBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of states; also the length of every transition table.
    pub fn state_count(&self) -> usize {
        self.behaviors.len()
    }

    /// The state at index 0, where new instances start.
    pub fn initial_state(&self) -> M::State {
        self.initial
    }

    pub fn transitions(&self, event: M::Event) -> Option<&TransitionTable<M::State>> {
        self.tables.get(&event)
    }

    /// Outcome of `event` arriving in `state`.
    pub fn lookup(&self, state: M::State, event: M::Event) -> Option<Outcome<M::State>> {
        self.transitions(event)?.lookup(state)
    }

    pub(crate) fn behavior(&self, state: M::State) -> Option<&StateBehavior<M>> {
        self.behaviors.get(state.index())
    }
}

impl<M: Machine> fmt::Debug for Descriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("states", &self.behaviors.len())
            .field("events", &self.tables.len())
            .field("initial", &self.initial)
            .finish()
    }
}
