//! Train registry: the single owner of fleet state.
//!
//! Every mutation goes through [`Registry::update`] or [`Registry::update_all`].
//! Both re-check the numeric invariants after the caller's mutator runs, so a
//! buggy mutator can never leave a record with a negative delay or a speed
//! above its limit.

use std::collections::{HashMap, HashSet};

use rf_core::{TrainId, clamp_non_negative, clamp_to_limit, ensure_finite};

use crate::error::{FleetError, FleetResult};
use crate::train::Train;

/// Outcome of a fleet-wide pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Trains whose record was replaced.
    pub updated: usize,
    /// Trains skipped because their mutation broke an invariant.
    pub failures: Vec<(TrainId, FleetError)>,
}

impl UpdateReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered set of trains keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    trains: Vec<Train>,
    index: HashMap<TrainId, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a seed fleet.
    pub fn with_fleet(seed: Vec<Train>) -> FleetResult<Self> {
        let mut registry = Self::new();
        registry.initialize(seed)?;
        Ok(registry)
    }

    /// Replace the registry contents with `seed`.
    ///
    /// The seed is validated as a whole before anything is replaced, so a
    /// rejected seed leaves the previous fleet in place.
    pub fn initialize(&mut self, seed: Vec<Train>) -> FleetResult<()> {
        let mut seen = HashSet::new();
        let mut trains = Vec::with_capacity(seed.len());
        for mut train in seed {
            if !seen.insert(train.id.clone()) {
                return Err(FleetError::Validation {
                    what: format!("duplicate train id '{}' in seed fleet", train.id),
                });
            }
            if !(train.max_speed.is_finite() && train.max_speed > 0.0) {
                return Err(FleetError::Validation {
                    what: format!(
                        "train '{}' has invalid max_speed {}",
                        train.id, train.max_speed
                    ),
                });
            }
            ensure_finite(train.current_speed, "current_speed")?;
            ensure_finite(train.delay, "delay")?;
            train.current_speed = clamp_to_limit(train.current_speed, train.max_speed);
            train.delay = clamp_non_negative(train.delay);
            trains.push(train);
        }

        self.index = trains
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        self.trains = trains;
        tracing::debug!(trains = self.trains.len(), "registry initialized");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up one train.
    pub fn get(&self, id: &str) -> FleetResult<&Train> {
        self.index
            .get(id)
            .map(|&i| &self.trains[i])
            .ok_or_else(|| FleetError::not_found(id))
    }

    /// All trains in insertion order.
    pub fn list(&self) -> &[Train] {
        &self.trains
    }

    /// Owned copy of the fleet, for readers that outlive a borrow.
    pub fn snapshot(&self) -> Vec<Train> {
        self.trains.clone()
    }

    /// Apply `mutator` to one train and store the result.
    ///
    /// Speed is clamped into `[0, max_speed]` and delay at zero afterwards.
    /// The stored record only changes if the whole mutation is accepted.
    pub fn update<F>(&mut self, id: &str, mutator: F) -> FleetResult<&Train>
    where
        F: FnOnce(Train) -> Train,
    {
        let slot = *self
            .index
            .get(id)
            .ok_or_else(|| FleetError::not_found(id))?;
        let current = &self.trains[slot];
        let next = sanitize(current, mutator(current.clone()))?;
        self.trains[slot] = next;
        Ok(&self.trains[slot])
    }

    /// Apply `mutator` to every train.
    ///
    /// A train whose mutation is rejected keeps its previous record; the
    /// failure is logged and reported, and the pass carries on.
    pub fn update_all<F>(&mut self, mut mutator: F) -> UpdateReport
    where
        F: FnMut(Train) -> Train,
    {
        let mut report = UpdateReport::default();
        for slot in self.trains.iter_mut() {
            match sanitize(slot, mutator(slot.clone())) {
                Ok(next) => {
                    *slot = next;
                    report.updated += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        train = %slot.id,
                        error = %err,
                        "skipping train in fleet update"
                    );
                    report.failures.push((slot.id.clone(), err));
                }
            }
        }
        report
    }
}

fn sanitize(before: &Train, mut after: Train) -> FleetResult<Train> {
    if after.id != before.id {
        return Err(FleetError::Invariant {
            id: before.id.clone(),
            what: "train id cannot change",
        });
    }
    if after.max_speed != before.max_speed {
        return Err(FleetError::Invariant {
            id: before.id.clone(),
            what: "max_speed is fixed per train",
        });
    }
    ensure_finite(after.current_speed, "current_speed")?;
    ensure_finite(after.delay, "delay")?;

    after.current_speed = clamp_to_limit(after.current_speed, after.max_speed);
    after.delay = clamp_non_negative(after.delay);
    Ok(after)
}
