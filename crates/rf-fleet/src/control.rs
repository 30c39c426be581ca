//! Direct operator commands against individual trains.

use serde::{Deserialize, Serialize};

use rf_core::{Real, clamp_to_limit, ensure_finite};

use crate::error::FleetResult;
use crate::registry::{Registry, UpdateReport};
use crate::train::{Train, TrainStatus};

/// Operator control mode. Recorded and reported, not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Manual,
    Auto,
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlMode::Manual => f.write_str("manual"),
            ControlMode::Auto => f.write_str("auto"),
        }
    }
}

/// Result of a speed command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedCommand {
    pub requested: Real,
    pub applied: Real,
}

impl SpeedCommand {
    pub fn was_clamped(&self) -> bool {
        self.requested != self.applied
    }
}

/// Issues set-speed and emergency-stop commands through the registry.
#[derive(Debug, Clone, Default)]
pub struct ControlSurface {
    mode: ControlMode,
}

impl ControlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if self.mode != mode {
            tracing::info!(from = %self.mode, to = %mode, "control mode changed");
        }
        self.mode = mode;
    }

    /// Set a train's speed, clamped into `[0, max_speed]`.
    ///
    /// Delay is untouched. A train in emergency leaves that state and takes
    /// the status its delay implies; any other status is kept.
    pub fn set_speed(
        &self,
        registry: &mut Registry,
        id: &str,
        requested: Real,
    ) -> FleetResult<SpeedCommand> {
        ensure_finite(requested, "requested speed")?;
        let train = registry.update(id, |mut t| {
            t.current_speed = clamp_to_limit(requested, t.max_speed);
            if t.status == TrainStatus::Emergency {
                t.refresh_status();
            }
            t
        })?;
        let command = SpeedCommand {
            requested,
            applied: train.current_speed,
        };
        if command.was_clamped() {
            tracing::debug!(
                train = id,
                requested,
                applied = command.applied,
                "speed request clamped to train limits"
            );
        }
        Ok(command)
    }

    /// Stop a train and flag it as an emergency.
    pub fn emergency_stop<'r>(
        &self,
        registry: &'r mut Registry,
        id: &str,
    ) -> FleetResult<&'r Train> {
        let train = registry.update(id, emergency)?;
        tracing::warn!(train = id, "emergency stop");
        Ok(train)
    }

    /// Emergency stop for the whole fleet.
    pub fn emergency_stop_all(&self, registry: &mut Registry) -> UpdateReport {
        let report = registry.update_all(emergency);
        tracing::warn!(trains = report.updated, "emergency stop issued to all trains");
        report
    }
}

fn emergency(mut train: Train) -> Train {
    train.current_speed = 0.0;
    train.status = TrainStatus::Emergency;
    train
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetError;

    fn registry() -> Registry {
        Registry::with_fleet(vec![
            Train::new("T002", "Shatabdi Express", "Delhi - Chandigarh", 120.0)
                .with_speed(110.0)
                .with_delay(5.0, TrainStatus::Delayed),
            Train::new("T003", "Duronto Express", "Mumbai - Pune", 110.0).with_speed(95.0),
        ])
        .unwrap()
    }

    #[test]
    fn set_speed_clamps_to_max() {
        let mut reg = registry();
        let cmd = ControlSurface::new()
            .set_speed(&mut reg, "T002", 500.0)
            .unwrap();
        assert_eq!(cmd.applied, 120.0);
        assert!(cmd.was_clamped());
        assert_eq!(reg.get("T002").unwrap().current_speed, 120.0);
    }

    #[test]
    fn set_speed_clamps_negative_to_zero() {
        let mut reg = registry();
        let cmd = ControlSurface::new().set_speed(&mut reg, "T003", -20.0).unwrap();
        assert_eq!(cmd.applied, 0.0);
    }

    #[test]
    fn set_speed_keeps_status_and_delay() {
        let mut reg = registry();
        ControlSurface::new().set_speed(&mut reg, "T002", 60.0).unwrap();
        let t = reg.get("T002").unwrap();
        assert_eq!(t.status, TrainStatus::Delayed);
        assert_eq!(t.delay, 5.0);
    }

    #[test]
    fn set_speed_rejects_nan() {
        let mut reg = registry();
        let err = ControlSurface::new()
            .set_speed(&mut reg, "T002", f64::NAN)
            .unwrap_err();
        assert!(matches!(err, FleetError::Core(_)));
        assert_eq!(reg.get("T002").unwrap().current_speed, 110.0);
    }

    #[test]
    fn emergency_stop_then_speed_recomputes_status() {
        let mut reg = registry();
        let surface = ControlSurface::new();
        let t = surface.emergency_stop(&mut reg, "T003").unwrap();
        assert_eq!(t.current_speed, 0.0);
        assert_eq!(t.status, TrainStatus::Emergency);

        surface.set_speed(&mut reg, "T003", 40.0).unwrap();
        assert_eq!(reg.get("T003").unwrap().status, TrainStatus::OnTime);

        surface.emergency_stop(&mut reg, "T002").unwrap();
        surface.set_speed(&mut reg, "T002", 40.0).unwrap();
        assert_eq!(reg.get("T002").unwrap().status, TrainStatus::Delayed);
    }

    #[test]
    fn emergency_stop_unknown_train() {
        let mut reg = registry();
        let err = ControlSurface::new()
            .emergency_stop(&mut reg, "T999")
            .unwrap_err();
        assert!(matches!(err, FleetError::NotFound { .. }));
    }

    #[test]
    fn emergency_stop_all_halts_fleet() {
        let mut reg = registry();
        let report = ControlSurface::new().emergency_stop_all(&mut reg);
        assert_eq!(report.updated, 2);
        assert!(reg
            .list()
            .iter()
            .all(|t| t.current_speed == 0.0 && t.status == TrainStatus::Emergency));
    }

    #[test]
    fn mode_is_recorded() {
        let mut surface = ControlSurface::new();
        assert_eq!(surface.mode(), ControlMode::Manual);
        surface.set_mode(ControlMode::Auto);
        assert_eq!(surface.mode(), ControlMode::Auto);
    }
}
