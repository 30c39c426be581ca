//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while scheduling or running the telemetry simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Fleet error: {message}")]
    Fleet { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<rf_fleet::FleetError> for SimError {
    fn from(e: rf_fleet::FleetError) -> Self {
        SimError::Fleet {
            message: e.to_string(),
        }
    }
}
