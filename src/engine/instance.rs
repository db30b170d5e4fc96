//! Running machine instances and the dispatch algorithm.

use super::{Context, Descriptor, Machine};
use crate::alloc::EventData;
use crate::config::{CascadePolicy, ConfigError, EngineConfig};
use crate::core::{Event, Outcome, State, StateHistory, StateTransition, TransitionKind};
use crate::fault::{Fault, FaultHandler, FaultKind, LogFault};
use chrono::Utc;
use std::panic::Location;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Result of delivering one external event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch<S: State> {
    /// The event was a legal no-op in `state`.
    Ignored { state: S },

    /// External transition `from` -> `to`; `current` is where the machine
    /// settled after any internal events.
    Transitioned {
        from: S,
        to: S,
        current: S,
        internal_hops: usize,
    },
}

impl<S: State> Dispatch<S> {
    pub fn current_state(&self) -> S {
        match self {
            Self::Ignored { state } => *state,
            Self::Transitioned { current, .. } => *current,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }
}

/// One running state machine.
///
/// Starts in the descriptor's initial state. Owns its domain data; the
/// descriptor is shared.
pub struct Instance<M: Machine> {
    id: Uuid,
    name: String,
    descriptor: Arc<Descriptor<M>>,
    data: M::Data,
    current: M::State,
    event_generated: bool,
    config: EngineConfig,
    history: Option<StateHistory<M::State>>,
    fault_handler: Arc<dyn FaultHandler>,
    halted: Option<Fault>,
}

impl<M: Machine> Instance<M> {
    pub fn new(name: impl Into<String>, descriptor: Arc<Descriptor<M>>, data: M::Data) -> Self {
        let config = EngineConfig::default();
        let history = Self::history_for(&config);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            current: descriptor.initial_state(),
            descriptor,
            data,
            event_generated: false,
            config,
            history,
            fault_handler: Arc::new(LogFault),
            halted: None,
        }
    }

    /// Replace the engine config. Clears any recorded history.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.history = Self::history_for(&config);
        self.config = config;
        Ok(self)
    }

    pub fn with_fault_handler<H>(mut self, handler: H) -> Self
    where
        H: FaultHandler + 'static,
    {
        self.fault_handler = Arc::new(handler);
        self
    }

    fn history_for(config: &EngineConfig) -> Option<StateHistory<M::State>> {
        if !config.record_history {
            return None;
        }
        Some(match config.history_limit {
            Some(limit) => StateHistory::bounded(limit),
            None => StateHistory::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &Arc<Descriptor<M>> {
        &self.descriptor
    }

    pub fn current_state(&self) -> M::State {
        self.current
    }

    pub fn data(&self) -> &M::Data {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut M::Data {
        &mut self.data
    }

    /// True if the last dispatch ended with an internal transition that has
    /// not been run (always false under [`CascadePolicy::Cascade`]).
    pub fn event_generated(&self) -> bool {
        self.event_generated
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `None` when history recording is disabled.
    pub fn history(&self) -> Option<&StateHistory<M::State>> {
        self.history.as_ref()
    }

    /// The fault that halted this instance, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.halted.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Deliver an external event.
    ///
    /// The payload is consumed on every path: handed to the entered state's
    /// behavior and released afterwards, or released straight away when the
    /// event is ignored or faults.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] for illegal events and structural defects, after
    /// reporting it to the fault handler. The instance is halted from then on
    /// and refuses every further event with [`FaultKind::Halted`].
    #[track_caller]
    pub fn external_event(
        &mut self,
        event: M::Event,
        data: Option<EventData<M::Payload>>,
    ) -> Result<Dispatch<M::State>, Fault> {
        let location = Location::caller();

        if let Some(fault) = &self.halted {
            drop(data);
            trace!(
                machine = self.descriptor.name(),
                instance = %self.name,
                event = event.name(),
                "event refused, machine halted"
            );
            return Err(Fault {
                kind: FaultKind::Halted,
                location,
                ..fault.clone()
            });
        }

        self.event_generated = false;
        let descriptor = Arc::clone(&self.descriptor);

        let Some(table) = descriptor.transitions(event) else {
            drop(data);
            return Err(self.raise(
                FaultKind::UnknownEvent {
                    event: event.name(),
                },
                location,
            ));
        };

        let from = self.current;
        let Some(outcome) = table.lookup(from) else {
            drop(data);
            return Err(self.raise(
                FaultKind::StateOutOfRange {
                    index: from.index(),
                    count: descriptor.state_count(),
                },
                location,
            ));
        };

        match outcome {
            Outcome::Ignored => {
                drop(data);
                trace!(
                    machine = descriptor.name(),
                    instance = %self.name,
                    state = from.name(),
                    event = event.name(),
                    "event ignored"
                );
                Ok(Dispatch::Ignored { state: from })
            }
            Outcome::CannotHappen => {
                drop(data);
                Err(self.raise(
                    FaultKind::CannotHappen {
                        event: event.name(),
                        state: from.name(),
                    },
                    location,
                ))
            }
            Outcome::Goto(to) => {
                self.enter(
                    &descriptor,
                    to,
                    TransitionKind::External,
                    Some(event),
                    location,
                )?;
                let internal_hops = self.run(&descriptor, to, data, location)?;
                Ok(Dispatch::Transitioned {
                    from,
                    to,
                    current: self.current,
                    internal_hops,
                })
            }
        }
    }

    /// Make `to` the current state and record it.
    fn enter(
        &mut self,
        descriptor: &Descriptor<M>,
        to: M::State,
        kind: TransitionKind,
        event: Option<M::Event>,
        location: &'static Location<'static>,
    ) -> Result<(), Fault> {
        if to.index() >= descriptor.state_count() {
            return Err(self.raise(
                FaultKind::StateOutOfRange {
                    index: to.index(),
                    count: descriptor.state_count(),
                },
                location,
            ));
        }

        let from = self.current;
        self.current = to;
        debug!(
            machine = descriptor.name(),
            instance = %self.name,
            instance_id = %self.id,
            from = from.name(),
            to = to.name(),
            kind = ?kind,
            event = event.map(|e| e.name()),
            "state transition"
        );

        if let Some(history) = &mut self.history {
            history.record(StateTransition {
                from,
                to,
                kind,
                event: event.map(|e| e.name().to_string()),
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    /// Run `state`'s behavior, then apply whatever internal event it requested.
    /// Returns the number of internal transitions applied.
    fn run(
        &mut self,
        descriptor: &Descriptor<M>,
        mut state: M::State,
        mut data: Option<EventData<M::Payload>>,
        location: &'static Location<'static>,
    ) -> Result<usize, Fault> {
        let mut hops = 0;

        loop {
            let Some(behavior) = descriptor.behavior(state) else {
                drop(data);
                return Err(self.raise(
                    FaultKind::StateOutOfRange {
                        index: state.index(),
                        count: descriptor.state_count(),
                    },
                    location,
                ));
            };

            let mut ctx = Context::new(
                descriptor.name(),
                &self.name,
                self.id,
                state,
                &mut self.data,
            );
            behavior(&mut ctx, data.as_deref());
            let request = ctx.finish();
            drop(data);

            let request = match request {
                Ok(Some(request)) => request,
                Ok(None) => return Ok(hops),
                Err(kind) => return Err(self.raise(kind, location)),
            };

            if self.config.cascade == CascadePolicy::Cascade
                && hops == self.config.max_internal_hops
            {
                return Err(self.raise(
                    FaultKind::InternalLoop {
                        limit: self.config.max_internal_hops,
                        state: request.state.name(),
                    },
                    location,
                ));
            }

            self.enter(
                descriptor,
                request.state,
                TransitionKind::Internal,
                None,
                location,
            )?;
            self.event_generated = true;
            hops += 1;

            match self.config.cascade {
                CascadePolicy::RecordOnly => return Ok(hops),
                CascadePolicy::Cascade => {
                    self.event_generated = false;
                    state = request.state;
                    data = request.data;
                }
            }
        }
    }

    /// Report a fault and halt the instance.
    fn raise(&mut self, kind: FaultKind, location: &'static Location<'static>) -> Fault {
        let fault = Fault {
            machine: self.descriptor.name().to_string(),
            instance_name: self.name.clone(),
            instance: self.id,
            kind,
            location,
        };
        self.halted = Some(fault.clone());
        self.fault_handler.on_fault(&fault);
        fault
    }
}
