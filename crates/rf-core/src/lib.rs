//! rf-core: stable foundation for railflow.
//!
//! Contains:
//! - numeric (Real + finiteness check + clamping/rounding helpers)
//! - ids (string train identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
