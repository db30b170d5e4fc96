//! Fatal dispatch faults and the sinks that receive them.
//!
//! Illegal events and structural defects are never recoverable. The engine
//! reports each one to the instance's [`FaultHandler`], halts the instance,
//! and returns the [`Fault`] to the caller.

use std::panic::Location;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// What went wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FaultKind {
    #[error("Event '{event}' cannot happen in state '{state}'")]
    CannotHappen {
        event: &'static str,
        state: &'static str,
    },

    #[error("No transition table registered for event '{event}'")]
    UnknownEvent { event: &'static str },

    #[error("State index {index} out of range (states: {count})")]
    StateOutOfRange { index: usize, count: usize },

    #[error("State '{state}' requested more than one internal event")]
    RepeatedInternalEvent { state: &'static str },

    #[error("Internal transitions exceeded {limit} hops (last state: '{state}')")]
    InternalLoop { limit: usize, state: &'static str },

    #[error("Machine halted by an earlier fault")]
    Halted,
}

/// A fault raised by one instance, with the call site that delivered the event.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{machine} '{instance_name}': {kind} (at {location})")]
pub struct Fault {
    /// Descriptor name of the machine type.
    pub machine: String,
    pub instance_name: String,
    pub instance: Uuid,
    pub kind: FaultKind,
    pub location: &'static Location<'static>,
}

/// Sink for faults.
///
/// The engine treats reporting as terminal: whether the handler returns or
/// unwinds, the instance dispatches nothing further.
pub trait FaultHandler: Send + Sync {
    fn on_fault(&self, fault: &Fault);
}

/// Logs the fault at error level. The default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFault;

impl FaultHandler for LogFault {
    fn on_fault(&self, fault: &Fault) {
        error!(
            machine = %fault.machine,
            instance = %fault.instance_name,
            instance_id = %fault.instance,
            location = %fault.location,
            "{}",
            fault.kind
        );
    }
}

/// Panics on the first fault, halting the thread like a failed assertion.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicOnFault;

impl FaultHandler for PanicOnFault {
    fn on_fault(&self, fault: &Fault) {
        panic!("state machine fault: {fault}");
    }
}

/// Keeps every reported fault, for inspection after the fact.
#[derive(Debug, Clone, Default)]
pub struct CollectFaults {
    faults: Arc<Mutex<Vec<Fault>>>,
}

impl CollectFaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faults(&self) -> Vec<Fault> {
        self.faults
            .lock()
            .map(|faults| faults.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl FaultHandler for CollectFaults {
    fn on_fault(&self, fault: &Fault) {
        LogFault.on_fault(fault);
        match self.faults.lock() {
            Ok(mut faults) => faults.push(fault.clone()),
            Err(poisoned) => poisoned.into_inner().push(fault.clone()),
        }
    }
}
