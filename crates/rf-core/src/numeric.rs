use crate::error::{CoreError, CoreResult};

/// Floating point type used for speeds, delays and statistics.
pub type Real = f64;

/// Reject NaN and infinities before they reach fleet state.
pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Clamp at zero. Negative zero collapses to `0.0`.
pub fn clamp_non_negative(v: Real) -> Real {
    if v > 0.0 { v } else { 0.0 }
}

/// Clamp into `[0, max]`.
pub fn clamp_to_limit(v: Real, max: Real) -> Real {
    clamp_non_negative(v).min(max)
}

/// Round half up (toward +inf) at `decimals` places.
///
/// The scaled value is nudged by a few ULPs so that decimal ties such as
/// `0.15` (stored as `0.1499999...`) round the way they read.
pub fn round_half_up(v: Real, decimals: u32) -> Real {
    let factor = 10_f64.powi(decimals as i32);
    let scaled = v * factor;
    let nudged = scaled + scaled.abs() * 4.0 * f64::EPSILON;
    (nudged + 0.5).floor() / factor
}

/// Display rounding used for every average and percentage.
pub fn round_1dp(v: Real) -> Real {
    round_half_up(v, 1)
}
