//! Builder for machine descriptors.

use crate::builder::error::{BuildError, StructuralDefect};
use crate::core::{Event, Outcome, State, TransitionTable};
use crate::engine::{Context, Descriptor, Machine, StateBehavior};
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<StructuralDefect>>;

fn check(ok: bool, defect: impl FnOnce() -> StructuralDefect) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(defect())
    }
}

/// Builder for [`Descriptor`]s.
///
/// States must be declared in index order, one behavior each. Every event
/// needs exactly one transition table with one entry per state. `build`
/// reports every violation at once.
pub struct DescriptorBuilder<M: Machine> {
    name: String,
    states: Vec<(M::State, StateBehavior<M>)>,
    tables: Vec<(M::Event, TransitionTable<M::State>)>,
}

impl<M: Machine> DescriptorBuilder<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Declare the next state and the behavior run on entering it.
    pub fn state<F>(mut self, state: M::State, behavior: F) -> Self
    where
        F: Fn(&mut Context<'_, M>, Option<&M::Payload>) + Send + Sync + 'static,
    {
        self.states.push((state, Box::new(behavior)));
        self
    }

    /// Register the transition table for `event`.
    pub fn transitions(mut self, event: M::Event, table: TransitionTable<M::State>) -> Self {
        self.tables.push((event, table));
        self
    }

    /// Check every structural invariant, accumulating ALL defects.
    pub fn validate(&self) -> Check {
        let count = M::State::count();
        let mut checks: Vec<Check> = Vec::new();

        checks.push(check(!self.name.trim().is_empty(), || {
            StructuralDefect::EmptyName
        }));
        checks.push(check(count > 0, || StructuralDefect::NoStates));

        for (position, state) in M::State::ALL.iter().enumerate() {
            checks.push(check(state.index() == position, || {
                StructuralDefect::InconsistentStateIndex {
                    state: state.name(),
                    position,
                    index: state.index(),
                }
            }));
        }

        checks.push(check(self.states.len() == count, || {
            StructuralDefect::StateCountMismatch {
                expected: count,
                found: self.states.len(),
            }
        }));

        for (position, (state, _)) in self.states.iter().enumerate() {
            checks.push(check(state.index() == position, || {
                StructuralDefect::StateOutOfOrder {
                    position,
                    state: state.name(),
                    index: state.index(),
                }
            }));
        }

        let mut registered: HashMap<M::Event, usize> = HashMap::new();
        for (event, _) in &self.tables {
            let seen = registered.entry(*event).or_insert(0);
            *seen += 1;
            // Report a duplicate once, on its second registration.
            checks.push(check(*seen != 2, || {
                StructuralDefect::DuplicateTransitionTable {
                    event: event.name(),
                }
            }));
        }

        for event in M::Event::ALL {
            checks.push(check(registered.contains_key(event), || {
                StructuralDefect::MissingTransitionTable {
                    event: event.name(),
                }
            }));
        }

        for (event, table) in &self.tables {
            checks.push(check(table.len() == count, || {
                StructuralDefect::TableLengthMismatch {
                    event: event.name(),
                    expected: count,
                    found: table.len(),
                }
            }));

            for outcome in table.entries() {
                if let Outcome::Goto(destination) = outcome {
                    checks.push(check(destination.index() < count, || {
                        StructuralDefect::DestinationOutOfRange {
                            event: event.name(),
                            index: destination.index(),
                            count,
                        }
                    }));
                }
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the descriptor.
    /// Returns every structural defect if any invariant is violated.
    pub fn build(self) -> Result<Descriptor<M>, BuildError> {
        if let Validation::Failure(defects) = self.validate() {
            return Err(BuildError::Invalid {
                machine: self.name,
                defects: defects.iter().cloned().collect(),
            });
        }

        let Some(initial) = M::State::ALL.first().copied() else {
            return Err(BuildError::Invalid {
                machine: self.name,
                defects: vec![StructuralDefect::NoStates],
            });
        };

        Ok(Descriptor {
            name: self.name,
            behaviors: self
                .states
                .into_iter()
                .map(|(_, behavior)| behavior)
                .collect(),
            tables: self.tables.into_iter().collect(),
            initial,
        })
    }
}
