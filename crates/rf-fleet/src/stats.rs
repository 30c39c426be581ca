//! Fleet-wide statistics derived from registry state.
//!
//! Nothing here is cached: every call recomputes from the trains it is given.
//! Averages and percentages are rounded half-up to one decimal so that the
//! displayed numbers are reproducible.

use serde::{Deserialize, Serialize};

use rf_core::{Real, round_1dp};

use crate::train::{Train, TrainStatus};

/// Aggregate view of the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FleetStatistics {
    pub total_trains: usize,
    pub on_time_trains: usize,
    pub delayed_trains: usize,
    pub emergency_trains: usize,
    /// Mean delay in minutes, one decimal.
    pub average_delay: Real,
    /// Share of trains on time, percent with one decimal.
    pub efficiency_percent: Real,
}

impl FleetStatistics {
    /// Compute statistics for a fleet. An empty fleet yields all zeros.
    pub fn compute(trains: &[Train]) -> Self {
        let total_trains = trains.len();
        let on_time_trains = count_status(trains, TrainStatus::OnTime);
        let delayed_trains = count_status(trains, TrainStatus::Delayed);
        let emergency_trains = count_status(trains, TrainStatus::Emergency);
        let total_delay: Real = trains.iter().map(|t| t.delay).sum();

        Self {
            total_trains,
            on_time_trains,
            delayed_trains,
            emergency_trains,
            average_delay: round_1dp(ratio(total_delay, total_trains)),
            efficiency_percent: round_1dp(100.0 * ratio(on_time_trains as Real, total_trains)),
        }
    }
}

/// Per-route performance, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStatistics {
    pub route: String,
    pub trains: usize,
    pub on_time_trains: usize,
    pub average_delay: Real,
    pub efficiency_percent: Real,
}

/// Break the fleet down by route.
pub fn route_statistics(trains: &[Train]) -> Vec<RouteStatistics> {
    let mut routes: Vec<(&str, Vec<&Train>)> = Vec::new();
    for train in trains {
        match routes.iter_mut().find(|(route, _)| *route == train.route) {
            Some((_, members)) => members.push(train),
            None => routes.push((train.route.as_str(), vec![train])),
        }
    }

    routes
        .into_iter()
        .map(|(route, members)| {
            let on_time = members.iter().filter(|t| t.is_on_time()).count();
            let total_delay: Real = members.iter().map(|t| t.delay).sum();
            RouteStatistics {
                route: route.to_string(),
                trains: members.len(),
                on_time_trains: on_time,
                average_delay: round_1dp(ratio(total_delay, members.len())),
                efficiency_percent: round_1dp(100.0 * ratio(on_time as Real, members.len())),
            }
        })
        .collect()
}

fn count_status(trains: &[Train], status: TrainStatus) -> usize {
    trains.iter().filter(|t| t.status == status).count()
}

fn ratio(numerator: Real, count: usize) -> Real {
    if count == 0 {
        0.0
    } else {
        numerator / count as Real
    }
}
