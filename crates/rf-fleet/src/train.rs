//! Train entity and operating status.

use rf_core::{Real, TrainId};
use serde::{Deserialize, Serialize};

/// Delay (minutes) at or below which a train counts as on time.
pub const ON_TIME_THRESHOLD_MIN: Real = 2.0;

/// Operating status of a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TrainStatus {
    #[default]
    OnTime,
    Delayed,
    Cancelled,
    Maintenance,
    /// Manual override set by an emergency stop. Never derived from delay.
    Emergency,
}

impl TrainStatus {
    /// Status implied by a delay under the `<= 2 min` rule.
    pub fn from_delay(delay_min: Real) -> Self {
        if delay_min <= ON_TIME_THRESHOLD_MIN {
            TrainStatus::OnTime
        } else {
            TrainStatus::Delayed
        }
    }

    /// True for the two statuses that follow delay automatically.
    pub fn is_delay_derived(self) -> bool {
        matches!(self, TrainStatus::OnTime | TrainStatus::Delayed)
    }

    pub fn label(self) -> &'static str {
        match self {
            TrainStatus::OnTime => "on-time",
            TrainStatus::Delayed => "delayed",
            TrainStatus::Cancelled => "cancelled",
            TrainStatus::Maintenance => "maintenance",
            TrainStatus::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A train and its current telemetry.
///
/// Speeds are km/h, delay is minutes. Records are owned by the
/// [`Registry`](crate::Registry); callers receive copies or shared borrows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub id: TrainId,
    pub name: String,
    pub route: String,
    pub next_station: String,
    pub estimated_arrival: String,
    pub current_speed: Real,
    pub max_speed: Real,
    pub delay: Real,
    pub status: TrainStatus,
}

impl Train {
    /// Create a stationary, on-time train.
    pub fn new(
        id: impl Into<TrainId>,
        name: impl Into<String>,
        route: impl Into<String>,
        max_speed: Real,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            route: route.into(),
            next_station: String::new(),
            estimated_arrival: String::new(),
            current_speed: 0.0,
            max_speed,
            delay: 0.0,
            status: TrainStatus::OnTime,
        }
    }

    pub fn with_speed(mut self, speed: Real) -> Self {
        self.current_speed = speed;
        self
    }

    pub fn with_delay(mut self, delay: Real, status: TrainStatus) -> Self {
        self.delay = delay;
        self.status = status;
        self
    }

    pub fn with_next_stop(
        mut self,
        station: impl Into<String>,
        estimated_arrival: impl Into<String>,
    ) -> Self {
        self.next_station = station.into();
        self.estimated_arrival = estimated_arrival.into();
        self
    }

    /// Recompute status from the current delay, dropping any manual state.
    pub fn refresh_status(&mut self) {
        self.status = TrainStatus::from_delay(self.delay);
    }

    pub fn is_on_time(&self) -> bool {
        self.status == TrainStatus::OnTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_threshold() {
        assert_eq!(TrainStatus::from_delay(0.0), TrainStatus::OnTime);
        assert_eq!(TrainStatus::from_delay(2.0), TrainStatus::OnTime);
        assert_eq!(TrainStatus::from_delay(2.01), TrainStatus::Delayed);
        assert_eq!(TrainStatus::from_delay(15.0), TrainStatus::Delayed);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&TrainStatus::OnTime).unwrap();
        assert_eq!(json, "\"on-time\"");
        let parsed: TrainStatus = serde_json::from_str("\"emergency\"").unwrap();
        assert_eq!(parsed, TrainStatus::Emergency);
        assert_eq!(TrainStatus::Delayed.to_string(), "delayed");
    }

    #[test]
    fn refresh_clears_manual_state() {
        let mut train = Train::new("T001", "Rajdhani Express", "Delhi - Mumbai", 130.0)
            .with_delay(1.0, TrainStatus::Emergency);
        train.refresh_status();
        assert_eq!(train.status, TrainStatus::OnTime);
    }

    #[test]
    fn only_on_time_and_delayed_follow_delay() {
        assert!(TrainStatus::OnTime.is_delay_derived());
        assert!(TrainStatus::Delayed.is_delay_derived());
        assert!(!TrainStatus::Emergency.is_delay_derived());
        assert!(!TrainStatus::Cancelled.is_delay_derived());
        assert!(!TrainStatus::Maintenance.is_delay_derived());
    }
}
