//! Error types for optimization runs.

use thiserror::Error;

/// Result type for optimization operations.
pub type OptimResult<T> = Result<T, OptimError>;

/// Errors that can occur while starting or completing an optimization run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimError {
    /// A run is already in flight; the request was ignored.
    #[error("Optimization already running; request ignored")]
    ConcurrentRunRejected,

    /// Completion was requested with no run in flight.
    #[error("No optimization run in progress")]
    NotRunning,

    /// The strategy could not produce a plan.
    #[error("Optimization strategy '{strategy}' failed: {message}")]
    Strategy { strategy: String, message: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The pending run was cancelled before it completed.
    #[error("Optimization run cancelled: {reason}")]
    Cancelled { reason: String },
}

impl OptimError {
    /// True for the no-op signal returned to a caller that raced a running job.
    pub fn is_rejection(&self) -> bool {
        matches!(self, OptimError::ConcurrentRunRejected)
    }
}
