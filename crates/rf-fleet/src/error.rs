//! Error types for fleet operations.

use rf_core::{CoreError, TrainId};
use thiserror::Error;

/// Result type for fleet operations.
pub type FleetResult<T> = Result<T, FleetError>;

/// Errors raised by the registry and the control surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FleetError {
    /// Seed or input data failed validation.
    #[error("Validation error: {what}")]
    Validation { what: String },

    /// Operation referenced a train that is not in the registry.
    #[error("Train not found: {id}")]
    NotFound { id: TrainId },

    /// A mutation tried to break a registry invariant; the record was left unchanged.
    #[error("Invariant violated for train {id}: {what}")]
    Invariant { id: TrainId, what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FleetError {
    pub fn not_found(id: &str) -> Self {
        FleetError::NotFound {
            id: TrainId::from(id),
        }
    }
}
