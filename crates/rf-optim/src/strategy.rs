//! Pluggable optimization strategies.
//!
//! A strategy looks at a fleet snapshot and returns a plan: how many delay
//! minutes to remove from each train, plus the improvement/savings report to
//! record. The engine owns the state machine, history and write-back; the
//! strategy owns only the computation.

use std::collections::HashMap;

use rf_core::TrainId;
use rf_fleet::Train;
use rf_sim::SimRng;

use crate::error::OptimResult;
use crate::result::{EstimatedSavings, Improvements};

/// Delay minutes to remove from one train.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayReduction {
    pub train_id: TrainId,
    pub minutes: f64,
}

/// Output of a strategy for one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimizationPlan {
    pub reductions: Vec<DelayReduction>,
    pub improvements: Improvements,
    pub estimated_savings: EstimatedSavings,
}

impl OptimizationPlan {
    /// Reduction for `id`; trains absent from the plan get zero.
    pub fn reduction_for(&self, id: &str) -> f64 {
        self.reductions
            .iter()
            .find(|r| r.train_id == id)
            .map(|r| r.minutes)
            .unwrap_or(0.0)
    }
}

/// Computes an optimization plan from a fleet snapshot.
pub trait OptimizationStrategy: Send {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn plan(&mut self, fleet: &[Train]) -> OptimResult<OptimizationPlan>;
}

/// Placeholder strategy: bounded random reductions and report figures.
///
/// Each train loses a whole number of minutes in `0..=4`. Report figures are
/// drawn from fixed bands (e.g. 5..=14 route optimizations, 25 000..=74 999
/// cost savings) so the output looks plausible without computing anything.
#[derive(Debug, Clone, Default)]
pub struct RandomStrategy {
    rng: SimRng,
}

impl RandomStrategy {
    pub fn new(rng: SimRng) -> Self {
        Self { rng }
    }
}

impl OptimizationStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn plan(&mut self, fleet: &[Train]) -> OptimResult<OptimizationPlan> {
        let rng = &mut self.rng;
        let reductions = fleet
            .iter()
            .map(|t| DelayReduction {
                train_id: t.id.clone(),
                minutes: f64::from(rng.int_between(0, 4)),
            })
            .collect();

        let improvements = Improvements {
            route_optimization: rng.int_between(5, 14),
            speed_adjustments: rng.int_between(3, 10),
            schedule_optimization: rng.int_between(4, 15),
            conflict_resolution: rng.int_between(2, 7),
        };
        let estimated_savings = EstimatedSavings {
            time: rng.int_between(15, 44),
            fuel: rng.int_between(10, 29),
            cost: u64::from(rng.int_between(25_000, 74_999)),
        };

        Ok(OptimizationPlan {
            reductions,
            improvements,
            estimated_savings,
        })
    }
}

/// Deterministic strategy: fixed per-train reductions.
///
/// Trains without an explicit entry get `default_minutes`. The report counts
/// trains that actually had delay to remove as schedule optimizations and
/// claims the removed minutes as time savings.
#[derive(Debug, Clone, Default)]
pub struct FixedReductionStrategy {
    per_train: HashMap<TrainId, f64>,
    default_minutes: f64,
}

impl FixedReductionStrategy {
    pub fn new(default_minutes: f64) -> Self {
        Self {
            per_train: HashMap::new(),
            default_minutes,
        }
    }

    pub fn with_reduction(mut self, id: impl Into<TrainId>, minutes: f64) -> Self {
        self.per_train.insert(id.into(), minutes);
        self
    }
}

impl OptimizationStrategy for FixedReductionStrategy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn plan(&mut self, fleet: &[Train]) -> OptimResult<OptimizationPlan> {
        let reductions: Vec<DelayReduction> = fleet
            .iter()
            .map(|t| DelayReduction {
                train_id: t.id.clone(),
                minutes: self
                    .per_train
                    .get(t.id.as_str())
                    .copied()
                    .unwrap_or(self.default_minutes),
            })
            .collect();

        let mut touched = 0_u32;
        let mut minutes = 0.0;
        for (train, r) in fleet.iter().zip(&reductions) {
            let removed = r.minutes.min(train.delay).max(0.0);
            if removed > 0.0 {
                touched += 1;
                minutes += removed;
            }
        }

        Ok(OptimizationPlan {
            reductions,
            improvements: Improvements {
                schedule_optimization: touched,
                ..Default::default()
            },
            estimated_savings: EstimatedSavings {
                time: minutes.round() as u32,
                ..Default::default()
            },
        })
    }
}
