//! Optimization report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of trains (or conflicts) touched per improvement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Improvements {
    pub route_optimization: u32,
    pub speed_adjustments: u32,
    pub schedule_optimization: u32,
    pub conflict_resolution: u32,
}

impl Improvements {
    pub fn total(&self) -> u32 {
        self.route_optimization
            + self.speed_adjustments
            + self.schedule_optimization
            + self.conflict_resolution
    }
}

/// Savings claimed by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EstimatedSavings {
    /// Minutes.
    pub time: u32,
    /// Liters.
    pub fuel: u32,
    /// Currency units.
    pub cost: u64,
}

/// Record of one completed optimization run. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub run_id: Uuid,
    /// Wall-clock completion time.
    pub timestamp: DateTime<Utc>,
    /// Session time the run completed at.
    pub sim_time_s: f64,
    pub improvements: Improvements,
    pub estimated_savings: EstimatedSavings,
    /// Delay minutes actually removed from the fleet, after clamping at zero.
    pub total_delay_reduction: f64,
}
