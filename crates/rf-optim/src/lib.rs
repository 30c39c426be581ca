//! Optimization engine for railflow.
//!
//! A run goes `idle → running → completed | error`. The engine delegates the
//! actual computation to an [`OptimizationStrategy`], writes the resulting
//! delay reductions back into the fleet registry and keeps the most recent
//! results in a bounded [`ResultHistory`].

pub mod engine;
pub mod error;
pub mod history;
pub mod result;
pub mod strategy;

pub use engine::{EngineOptions, OptimizationEngine, OptimizationStatus};
pub use error::{OptimError, OptimResult};
pub use history::{DEFAULT_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY, ResultHistory};
pub use result::{EstimatedSavings, Improvements, OptimizationResult};
pub use strategy::{
    DelayReduction, FixedReductionStrategy, OptimizationPlan, OptimizationStrategy, RandomStrategy,
};
