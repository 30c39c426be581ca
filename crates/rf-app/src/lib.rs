//! Application service layer for railflow.
//!
//! Wires the fleet registry, telemetry simulator and optimization engine into
//! one [`Session`] driven by a virtual clock, and handles session
//! configuration files. Frontends (the CLI) talk to this crate only.

pub mod config;
pub mod error;
pub mod events;
pub mod session;

pub use config::{SessionConfig, TrainDef, load_config, save_config, validate_config};
pub use error::{AppError, AppResult};
pub use events::SessionEvent;
pub use session::{Session, SessionSnapshot};
