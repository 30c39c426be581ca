//! Fleet state for railflow.
//!
//! This crate owns the train entity model and everything that reads or writes
//! it directly:
//! - **Registry**: the single owner of train records, with invariant checks on
//!   every mutation
//! - **Control surface**: operator commands (set speed, emergency stop)
//! - **Statistics**: fleet and per-route metrics computed on demand
//!
//! Higher layers (simulation, optimization, session) never hold trains
//! themselves; they borrow the [`Registry`] and mutate through it.

pub mod control;
pub mod error;
pub mod registry;
pub mod seed;
pub mod stats;
pub mod train;

pub use control::{ControlMode, ControlSurface, SpeedCommand};
pub use error::{FleetError, FleetResult};
pub use registry::{Registry, UpdateReport};
pub use seed::default_fleet;
pub use stats::{FleetStatistics, RouteStatistics, route_statistics};
pub use train::{ON_TIME_THRESHOLD_MIN, Train, TrainStatus};
