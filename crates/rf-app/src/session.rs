//! The session: single owner of fleet, clock, telemetry and optimization.
//!
//! All state changes go through `&mut Session`. Periodic telemetry and the
//! delayed optimization completion are tasks on one virtual-time scheduler,
//! so they are applied strictly in due-time order and never interleave with
//! each other or with operator commands.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use rf_fleet::{
    ControlMode, ControlSurface, FleetStatistics, Registry, RouteStatistics, SpeedCommand, Train,
    UpdateReport, route_statistics,
};
use rf_optim::{
    OptimizationEngine, OptimizationResult, OptimizationStatus, OptimizationStrategy,
    RandomStrategy, ResultHistory,
};
use rf_sim::{Scheduler, SimRng, TaskHandle, TelemetrySimulator};

use crate::config::{SessionConfig, validate_config};
use crate::error::{AppError, AppResult};
use crate::events::SessionEvent;

/// Work items on the session scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    Telemetry,
    CompleteOptimization,
}

/// Serializable point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub sim_time_s: f64,
    pub control_mode: ControlMode,
    pub optimization_status: OptimizationStatus,
    pub statistics: FleetStatistics,
    pub routes: Vec<RouteStatistics>,
    pub trains: Vec<Train>,
    pub latest_result: Option<OptimizationResult>,
}

#[derive(Debug)]
pub struct Session {
    registry: Registry,
    scheduler: Scheduler<SessionTask>,
    telemetry: TelemetrySimulator,
    engine: OptimizationEngine,
    control: ControlSurface,
    tick_handle: Option<TaskHandle>,
    pending_completion: Option<TaskHandle>,
    closed: bool,
}

impl Session {
    /// Start a session with the random optimization strategy.
    pub fn new(config: &SessionConfig) -> AppResult<Self> {
        let strategy_rng = match config.rng_seed {
            // Separate stream from telemetry so both stay reproducible.
            Some(seed) => SimRng::from_seed_u64(seed.wrapping_add(1)),
            None => SimRng::from_entropy(),
        };
        Self::with_strategy(config, Box::new(RandomStrategy::new(strategy_rng)))
    }

    /// Start a session with a caller-chosen optimization strategy.
    pub fn with_strategy(
        config: &SessionConfig,
        strategy: Box<dyn OptimizationStrategy>,
    ) -> AppResult<Self> {
        validate_config(config)?;

        let registry = Registry::with_fleet(config.seed_fleet())?;
        let telemetry_rng = match config.rng_seed {
            Some(seed) => SimRng::from_seed_u64(seed),
            None => SimRng::from_entropy(),
        };
        let telemetry = TelemetrySimulator::new(config.telemetry_options(), telemetry_rng)?;
        let engine = OptimizationEngine::new(strategy, config.engine_options())?;

        let mut scheduler = Scheduler::new();
        let tick_handle = scheduler.schedule_every(config.tick_period_s, SessionTask::Telemetry)?;

        tracing::info!(
            trains = registry.len(),
            tick_period_s = config.tick_period_s,
            strategy = engine.strategy_name(),
            seeded = config.rng_seed.is_some(),
            "session started"
        );

        Ok(Self {
            registry,
            scheduler,
            telemetry,
            engine,
            control: ControlSurface::new(),
            tick_handle: Some(tick_handle),
            pending_completion: None,
            closed: false,
        })
    }

    /// Current session time in seconds.
    pub fn now_s(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed
    }

    pub fn advance(&mut self, dt_s: f64) -> AppResult<()> {
        self.advance_with_events(dt_s, None)
    }

    /// Move the clock forward by `dt_s`, running every task that falls due.
    ///
    /// Ticks and optimization completions run in due-time order. After
    /// [`Session::shutdown`] this does nothing.
    pub fn advance_with_events(
        &mut self,
        dt_s: f64,
        mut events: Option<&mut dyn FnMut(SessionEvent)>,
    ) -> AppResult<()> {
        let dt_s = rf_core::ensure_finite(dt_s, "advance step")?;
        if dt_s < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "cannot advance by a negative step ({} s)",
                dt_s
            )));
        }
        if self.closed {
            return Ok(());
        }

        let until_s = self.scheduler.now() + dt_s;
        while let Some(task) = self.scheduler.pop_due(until_s) {
            let event = match task.payload {
                SessionTask::Telemetry => {
                    let report = self.telemetry.tick(&mut self.registry);
                    SessionEvent::Tick {
                        at_s: task.due_s,
                        tick: report.tick,
                        updated: report.update.updated,
                        failed: report.update.failures.len(),
                    }
                }
                SessionTask::CompleteOptimization => {
                    self.pending_completion = None;
                    match self
                        .engine
                        .complete(&mut self.registry, task.due_s, Utc::now())
                    {
                        Ok(result) => SessionEvent::OptimizationCompleted {
                            at_s: task.due_s,
                            run_id: result.run_id,
                            delay_removed_min: result.total_delay_reduction,
                        },
                        Err(err) => SessionEvent::OptimizationFailed {
                            at_s: task.due_s,
                            message: err.to_string(),
                        },
                    }
                }
            };
            emit(&mut events, event);
        }
        self.scheduler.settle(until_s);
        Ok(())
    }

    pub fn trains(&self) -> &[Train] {
        self.registry.list()
    }

    pub fn train(&self, id: &str) -> AppResult<&Train> {
        Ok(self.registry.get(id)?)
    }

    pub fn statistics(&self) -> FleetStatistics {
        FleetStatistics::compute(self.registry.list())
    }

    pub fn route_statistics(&self) -> Vec<RouteStatistics> {
        route_statistics(self.registry.list())
    }

    pub fn optimization_status(&self) -> OptimizationStatus {
        self.engine.status()
    }

    pub fn latest_result(&self) -> Option<&OptimizationResult> {
        self.engine.latest_result()
    }

    pub fn history(&self) -> &ResultHistory {
        self.engine.history()
    }

    /// Message of the last failed run, if the engine is in `error`.
    pub fn last_optimization_error(&self) -> Option<String> {
        self.engine.last_error().map(|e| e.to_string())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            sim_time_s: self.now_s(),
            control_mode: self.control.mode(),
            optimization_status: self.engine.status(),
            statistics: self.statistics(),
            routes: self.route_statistics(),
            trains: self.registry.snapshot(),
            latest_result: self.engine.latest_result().cloned(),
        }
    }

    pub fn set_speed(&mut self, id: &str, kmh: f64) -> AppResult<SpeedCommand> {
        Ok(self.control.set_speed(&mut self.registry, id, kmh)?)
    }

    pub fn emergency_stop(&mut self, id: &str) -> AppResult<Train> {
        Ok(self.control.emergency_stop(&mut self.registry, id)?.clone())
    }

    pub fn emergency_stop_all(&mut self) -> UpdateReport {
        self.control.emergency_stop_all(&mut self.registry)
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control.mode()
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        self.control.set_mode(mode);
    }

    /// Start an optimization run; it completes after the configured latency.
    ///
    /// A request while a run is in flight is rejected and changes nothing
    /// (see [`AppError::is_rejection`]).
    pub fn run_optimization(&mut self) -> AppResult<()> {
        if self.closed {
            return Err(AppError::SessionClosed);
        }
        self.engine.begin(self.scheduler.now())?;
        let handle = self
            .scheduler
            .schedule_once(self.engine.latency_s(), SessionTask::CompleteOptimization)?;
        tracing::debug!(
            task = handle.value(),
            due_s = self.scheduler.now() + self.engine.latency_s(),
            "optimization completion scheduled"
        );
        self.pending_completion = Some(handle);
        Ok(())
    }

    /// Stop the telemetry timer and cancel any pending optimization.
    ///
    /// A run still in flight moves the engine to `error`. Reads and operator
    /// commands keep working afterwards. Returns `false` if already shut down.
    pub fn shutdown(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if let Some(handle) = self.tick_handle.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.pending_completion.take() {
            self.scheduler.cancel(handle);
        }
        let dropped = self.scheduler.cancel_all();
        let aborted = self.engine.abort("session shut down");
        self.closed = true;
        tracing::info!(
            at_s = self.now_s(),
            ticks = self.telemetry.ticks(),
            aborted_run = aborted,
            stray_tasks = dropped,
            "session shut down"
        );
        true
    }
}

fn emit(events: &mut Option<&mut dyn FnMut(SessionEvent)>, event: SessionEvent) {
    if let Some(cb) = events.as_deref_mut() {
        cb(event);
    }
}
