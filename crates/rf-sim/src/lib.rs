//! Simulation plumbing for railflow.
//!
//! Provides:
//! - Deterministic seedable RNG
//! - Virtual-time scheduler with periodic/one-shot tasks and cancellation handles
//! - Telemetry simulator (periodic speed/delay perturbation)

pub mod error;
pub mod rng;
pub mod scheduler;
pub mod telemetry;

pub use error::{SimError, SimResult};
pub use rng::{DEFAULT_SEED, SimRng};
pub use scheduler::{FiredTask, Recurrence, Scheduler, TaskHandle};
pub use telemetry::{
    MAX_DELAY_JITTER_MIN, MAX_SPEED_JITTER_KMH, TelemetryOptions, TelemetrySimulator, TickReport,
};
