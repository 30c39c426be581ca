//! Optimization engine state machine.
//!
//! ```text
//!   idle ──begin──▶ running ──complete ok──▶ completed
//!                     │  ▲                       │
//!          complete   │  └────────begin──────────┘
//!          err/abort  ▼
//!                   error ──begin──▶ running
//! ```
//!
//! The engine itself does not wait: the owner calls [`OptimizationEngine::begin`],
//! waits out [`OptimizationEngine::latency_s`] on its scheduler, then calls
//! [`OptimizationEngine::complete`]. A `begin` while running is rejected with
//! [`OptimError::ConcurrentRunRejected`] and changes nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rf_fleet::{Registry, TrainStatus};

use crate::error::{OptimError, OptimResult};
use crate::history::{DEFAULT_HISTORY_CAPACITY, ResultHistory};
use crate::result::OptimizationResult;
use crate::strategy::{OptimizationPlan, OptimizationStrategy};

/// Engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptimizationStatus::Idle => "idle",
            OptimizationStatus::Running => "running",
            OptimizationStatus::Completed => "completed",
            OptimizationStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Processing latency between `begin` and `complete`, session seconds.
    pub latency_s: f64,
    pub history_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            latency_s: 3.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Optimization state machine with bounded result history.
pub struct OptimizationEngine {
    strategy: Box<dyn OptimizationStrategy>,
    opts: EngineOptions,
    status: OptimizationStatus,
    started_at_s: Option<f64>,
    history: ResultHistory,
    last_error: Option<OptimError>,
}

impl std::fmt::Debug for OptimizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizationEngine")
            .field("strategy", &self.strategy.name())
            .field("status", &self.status)
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl OptimizationEngine {
    pub fn new(strategy: Box<dyn OptimizationStrategy>, opts: EngineOptions) -> OptimResult<Self> {
        if !(opts.latency_s.is_finite() && opts.latency_s >= 0.0) {
            return Err(OptimError::InvalidArg {
                what: "latency must be non-negative and finite",
            });
        }
        Ok(Self {
            strategy,
            opts,
            status: OptimizationStatus::Idle,
            started_at_s: None,
            history: ResultHistory::new(opts.history_capacity)?,
            last_error: None,
        })
    }

    pub fn status(&self) -> OptimizationStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == OptimizationStatus::Running
    }

    pub fn latency_s(&self) -> f64 {
        self.opts.latency_s
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn latest_result(&self) -> Option<&OptimizationResult> {
        self.history.latest()
    }

    pub fn history(&self) -> &ResultHistory {
        &self.history
    }

    /// Error that moved the engine into `error`, if that is where it is.
    pub fn last_error(&self) -> Option<&OptimError> {
        self.last_error.as_ref()
    }

    /// Session time the in-flight run started at.
    pub fn started_at_s(&self) -> Option<f64> {
        self.started_at_s
    }

    /// Start a run. Rejected while another run is in flight.
    pub fn begin(&mut self, now_s: f64) -> OptimResult<()> {
        if self.is_running() {
            tracing::warn!("optimization requested while running; ignored");
            return Err(OptimError::ConcurrentRunRejected);
        }
        self.status = OptimizationStatus::Running;
        self.started_at_s = Some(now_s);
        self.last_error = None;
        tracing::info!(strategy = self.strategy.name(), at_s = now_s, "optimization started");
        Ok(())
    }

    /// Finish the in-flight run: plan, write back to the registry, record.
    ///
    /// Every train's delay drops by its planned reduction (floored at zero)
    /// and its status is recomputed from the new delay.
    pub fn complete(
        &mut self,
        registry: &mut Registry,
        now_s: f64,
        timestamp: DateTime<Utc>,
    ) -> OptimResult<&OptimizationResult> {
        if !self.is_running() {
            return Err(OptimError::NotRunning);
        }

        let plan = match self.strategy.plan(registry.list()).and_then(|p| self.check(p)) {
            Ok(plan) => plan,
            Err(err) => {
                self.fail(err.clone());
                return Err(err);
            }
        };

        let mut removed = 0.0;
        let report = registry.update_all(|mut train| {
            let before = train.delay;
            train.delay = (before - plan.reduction_for(train.id.as_str())).max(0.0);
            train.status = TrainStatus::from_delay(train.delay);
            removed += before - train.delay;
            train
        });
        if !report.is_clean() {
            tracing::warn!(
                failed = report.failures.len(),
                "optimization feedback skipped some trains"
            );
        }

        let result = OptimizationResult {
            run_id: Uuid::new_v4(),
            timestamp,
            sim_time_s: now_s,
            improvements: plan.improvements,
            estimated_savings: plan.estimated_savings,
            total_delay_reduction: removed,
        };
        tracing::info!(
            run_id = %result.run_id,
            at_s = now_s,
            delay_removed_min = removed,
            "optimization completed"
        );

        self.history.push(result);
        self.status = OptimizationStatus::Completed;
        self.started_at_s = None;
        self.history.latest().ok_or(OptimError::NotRunning)
    }

    /// Abort the in-flight run, moving the engine to `error`.
    /// Returns `false` if nothing was running.
    pub fn abort(&mut self, reason: impl Into<String>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.fail(OptimError::Cancelled {
            reason: reason.into(),
        });
        true
    }

    fn check(&self, plan: OptimizationPlan) -> OptimResult<OptimizationPlan> {
        if let Some(bad) = plan
            .reductions
            .iter()
            .find(|r| !(r.minutes.is_finite() && r.minutes >= 0.0))
        {
            return Err(OptimError::Strategy {
                strategy: self.strategy.name().to_string(),
                message: format!("invalid reduction {} for train {}", bad.minutes, bad.train_id),
            });
        }
        Ok(plan)
    }

    fn fail(&mut self, err: OptimError) {
        tracing::warn!(error = %err, "optimization failed");
        self.status = OptimizationStatus::Error;
        self.started_at_s = None;
        self.last_error = Some(err);
    }
}
