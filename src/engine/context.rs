//! Handle passed to a state behavior while it runs.

use super::Machine;
use crate::alloc::EventData;
use crate::core::State;
use crate::fault::FaultKind;
use uuid::Uuid;

pub(crate) struct InternalRequest<M: Machine> {
    pub(crate) state: M::State,
    pub(crate) data: Option<EventData<M::Payload>>,
}

/// A running state behavior's view of its instance.
///
/// A `Context` only exists for the duration of one behavior invocation, which
/// is what confines internal events to state behaviors.
pub struct Context<'a, M: Machine> {
    machine: &'a str,
    instance_name: &'a str,
    instance: Uuid,
    state: M::State,
    data: &'a mut M::Data,
    request: Option<InternalRequest<M>>,
    repeated: bool,
}

impl<'a, M: Machine> Context<'a, M> {
    pub(crate) fn new(
        machine: &'a str,
        instance_name: &'a str,
        instance: Uuid,
        state: M::State,
        data: &'a mut M::Data,
    ) -> Self {
        Self {
            machine,
            instance_name,
            instance,
            state,
            data,
            request: None,
            repeated: false,
        }
    }

    /// Descriptor name of the machine type.
    pub fn machine(&self) -> &str {
        self.machine
    }

    /// Name of the instance being driven.
    pub fn instance_name(&self) -> &str {
        self.instance_name
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance
    }

    /// The state whose behavior is running.
    pub fn state(&self) -> M::State {
        self.state
    }

    pub fn data(&self) -> &M::Data {
        self.data
    }

    pub fn data_mut(&mut self) -> &mut M::Data {
        self.data
    }

    /// Move the machine to `state` once this behavior returns, bypassing the
    /// transition tables.
    ///
    /// Only one internal event is allowed per invocation. A second call is a
    /// contract violation: its payload is released and the dispatch faults
    /// with [`FaultKind::RepeatedInternalEvent`].
    pub fn internal_event(&mut self, state: M::State, data: Option<EventData<M::Payload>>) {
        if self.request.is_some() {
            self.repeated = true;
            drop(data);
            return;
        }
        self.request = Some(InternalRequest { state, data });
    }

    /// True once this behavior has requested an internal event.
    pub fn event_generated(&self) -> bool {
        self.request.is_some()
    }

    pub(crate) fn finish(self) -> Result<Option<InternalRequest<M>>, FaultKind> {
        if self.repeated {
            return Err(FaultKind::RepeatedInternalEvent {
                state: self.state.name(),
            });
        }
        Ok(self.request)
    }
}
