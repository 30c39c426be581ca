//! Error types for the rf-app service layer.

use std::path::PathBuf;

use rf_fleet::FleetError;
use rf_optim::OptimError;

/// Application error type shared by the CLI and any other frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Optimization(#[from] OptimError),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session has been shut down")]
    SessionClosed,
}

/// Result type for rf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<rf_sim::SimError> for AppError {
    fn from(err: rf_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<rf_core::CoreError> for AppError {
    fn from(err: rf_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl AppError {
    /// True when a run was requested while another was still in flight.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AppError::Optimization(e) if e.is_rejection())
    }
}
