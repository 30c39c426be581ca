//! Telemetry simulator: emulates live train movement without a sensor feed.
//!
//! Each tick perturbs every train independently:
//! - `current_speed += uniform(-speed_jitter, +speed_jitter)`
//! - `delay += uniform(-delay_jitter, +delay_jitter)`
//!
//! The registry clamps both at zero (and speed at the train's limit) after the
//! perturbation, so the invariants hold after every tick.

use serde::{Deserialize, Serialize};

use rf_fleet::{Registry, UpdateReport};

use crate::error::{SimError, SimResult};
use crate::rng::SimRng;

/// Upper bound on the speed perturbation half-width (km/h).
pub const MAX_SPEED_JITTER_KMH: f64 = 1_000.0;
/// Upper bound on the delay perturbation half-width (minutes).
pub const MAX_DELAY_JITTER_MIN: f64 = 1_440.0;

/// Tick configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryOptions {
    /// Tick period in session seconds.
    pub period_s: f64,
    /// Half-width of the uniform speed perturbation (km/h).
    pub speed_jitter_kmh: f64,
    /// Half-width of the uniform delay perturbation (minutes).
    pub delay_jitter_min: f64,
    /// Recompute on-time/delayed status from delay after each tick.
    /// Manual statuses (emergency, cancelled, maintenance) are never touched.
    pub recompute_status: bool,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            period_s: 5.0,
            speed_jitter_kmh: 5.0,
            delay_jitter_min: 1.0,
            recompute_status: false,
        }
    }
}

impl TelemetryOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.period_s.is_finite() && self.period_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "tick period must be positive and finite",
            });
        }
        if !(0.0..=MAX_SPEED_JITTER_KMH).contains(&self.speed_jitter_kmh) {
            return Err(SimError::InvalidArg {
                what: "speed jitter must be within [0, 1000] km/h",
            });
        }
        if !(0.0..=MAX_DELAY_JITTER_MIN).contains(&self.delay_jitter_min) {
            return Err(SimError::InvalidArg {
                what: "delay jitter must be within [0, 1440] min",
            });
        }
        Ok(())
    }
}

/// Summary of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick counter.
    pub tick: u64,
    pub update: UpdateReport,
}

/// Periodic perturbation pass over the fleet.
#[derive(Debug, Clone)]
pub struct TelemetrySimulator {
    opts: TelemetryOptions,
    rng: SimRng,
    ticks: u64,
}

impl TelemetrySimulator {
    pub fn new(opts: TelemetryOptions, rng: SimRng) -> SimResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            rng,
            ticks: 0,
        })
    }

    pub fn options(&self) -> &TelemetryOptions {
        &self.opts
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one perturbation pass over every train.
    pub fn tick(&mut self, registry: &mut Registry) -> TickReport {
        let TelemetryOptions {
            speed_jitter_kmh,
            delay_jitter_min,
            recompute_status,
            ..
        } = self.opts;
        let rng = &mut self.rng;

        let update = registry.update_all(|mut train| {
            train.current_speed += rng.jitter(speed_jitter_kmh);
            train.delay += rng.jitter(delay_jitter_min);
            if recompute_status && train.status.is_delay_derived() {
                // Registry clamps delay after us; refresh against the clamped value.
                train.delay = train.delay.max(0.0);
                train.refresh_status();
            }
            train
        });

        self.ticks += 1;
        tracing::debug!(
            tick = self.ticks,
            updated = update.updated,
            failed = update.failures.len(),
            "telemetry tick"
        );
        TickReport {
            tick: self.ticks,
            update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_fleet::{Train, TrainStatus, default_fleet};

    fn sim(opts: TelemetryOptions) -> TelemetrySimulator {
        TelemetrySimulator::new(opts, SimRng::from_seed_u64(11)).unwrap()
    }

    #[test]
    fn default_options() {
        let opts = TelemetryOptions::default();
        assert_eq!(opts.period_s, 5.0);
        assert_eq!(opts.speed_jitter_kmh, 5.0);
        assert_eq!(opts.delay_jitter_min, 1.0);
        assert!(!opts.recompute_status);
    }

    #[test]
    fn invalid_options_rejected() {
        let bad = TelemetryOptions {
            period_s: 0.0,
            ..Default::default()
        };
        assert!(TelemetrySimulator::new(bad, SimRng::default()).is_err());
        let bad = TelemetryOptions {
            delay_jitter_min: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn oversized_jitter_rejected() {
        let bad = TelemetryOptions {
            speed_jitter_kmh: 1.0e308,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = TelemetryOptions {
            delay_jitter_min: f64::INFINITY,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let edge = TelemetryOptions {
            speed_jitter_kmh: MAX_SPEED_JITTER_KMH,
            delay_jitter_min: MAX_DELAY_JITTER_MIN,
            ..Default::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn tick_moves_within_jitter_band() {
        let mut registry = Registry::with_fleet(default_fleet()).unwrap();
        let before = registry.snapshot();
        let mut sim = sim(TelemetryOptions::default());

        let report = sim.tick(&mut registry);
        assert_eq!(report.tick, 1);
        assert_eq!(report.update.updated, 5);

        for (old, new) in before.iter().zip(registry.list()) {
            assert!((new.current_speed - old.current_speed).abs() <= 5.0 + 1e-9);
            assert!((new.delay - old.delay).abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn status_untouched_by_default() {
        let mut registry = Registry::with_fleet(vec![
            Train::new("A", "A", "R", 100.0).with_delay(2.5, TrainStatus::OnTime),
        ])
        .unwrap();
        let mut sim = sim(TelemetryOptions {
            delay_jitter_min: 0.0,
            ..Default::default()
        });
        sim.tick(&mut registry);
        assert_eq!(registry.get("A").unwrap().status, TrainStatus::OnTime);
    }

    #[test]
    fn recompute_status_follows_delay_but_not_emergency() {
        let mut registry = Registry::with_fleet(vec![
            Train::new("A", "A", "R", 100.0).with_delay(2.5, TrainStatus::OnTime),
            Train::new("B", "B", "R", 100.0).with_delay(9.0, TrainStatus::Emergency),
        ])
        .unwrap();
        let mut sim = sim(TelemetryOptions {
            delay_jitter_min: 0.0,
            recompute_status: true,
            ..Default::default()
        });
        sim.tick(&mut registry);
        assert_eq!(registry.get("A").unwrap().status, TrainStatus::Delayed);
        assert_eq!(registry.get("B").unwrap().status, TrainStatus::Emergency);
    }

    #[test]
    fn same_seed_same_telemetry() {
        let mut a = Registry::with_fleet(default_fleet()).unwrap();
        let mut b = Registry::with_fleet(default_fleet()).unwrap();
        let mut sim_a = sim(TelemetryOptions::default());
        let mut sim_b = sim(TelemetryOptions::default());
        for _ in 0..10 {
            sim_a.tick(&mut a);
            sim_b.tick(&mut b);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
