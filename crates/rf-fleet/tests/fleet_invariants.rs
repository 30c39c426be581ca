//! Integration tests for registry invariants and operator commands.

use proptest::prelude::*;
use rf_fleet::{ControlSurface, FleetStatistics, Registry, TrainStatus, default_fleet};

fn assert_invariants(registry: &Registry) {
    for train in registry.list() {
        assert!(
            (0.0..=train.max_speed).contains(&train.current_speed),
            "{} speed {} outside [0, {}]",
            train.id,
            train.current_speed,
            train.max_speed
        );
        assert!(train.delay >= 0.0, "{} delay {}", train.id, train.delay);
    }
}

#[test]
fn seeded_fleet_statistics() {
    let registry = Registry::with_fleet(default_fleet()).unwrap();
    let stats = FleetStatistics::compute(registry.list());
    assert_eq!(stats.total_trains, 5);
    assert_eq!(stats.on_time_trains, 3);
    assert_eq!(stats.delayed_trains, 2);
    assert_eq!(stats.average_delay, 4.0);
    assert_eq!(stats.efficiency_percent, 60.0);
}

#[test]
fn all_on_time_fleet_is_fully_efficient() {
    let fleet = default_fleet()
        .into_iter()
        .map(|t| t.with_delay(0.0, TrainStatus::OnTime))
        .collect();
    let registry = Registry::with_fleet(fleet).unwrap();
    let stats = FleetStatistics::compute(registry.list());
    assert_eq!(stats.efficiency_percent, 100.0);
    assert_eq!(stats.average_delay, 0.0);
}

#[test]
fn empty_registry_statistics_are_zero() {
    let registry = Registry::new();
    let stats = FleetStatistics::compute(registry.list());
    assert_eq!(stats.total_trains, 0);
    assert_eq!(stats.efficiency_percent, 0.0);
    assert_eq!(stats.average_delay, 0.0);
}

#[test]
fn overspeed_request_is_clamped() {
    let mut registry = Registry::with_fleet(default_fleet()).unwrap();
    let cmd = ControlSurface::new()
        .set_speed(&mut registry, "T002", 500.0)
        .unwrap();
    assert_eq!(cmd.applied, 120.0);
    assert_eq!(registry.get("T002").unwrap().current_speed, 120.0);
}

#[test]
fn emergency_then_speed_restores_delay_status() {
    let mut registry = Registry::with_fleet(default_fleet()).unwrap();
    let surface = ControlSurface::new();
    surface.emergency_stop(&mut registry, "T004").unwrap();
    assert_eq!(registry.get("T004").unwrap().status, TrainStatus::Emergency);

    surface.set_speed(&mut registry, "T004", 60.0).unwrap();
    let t004 = registry.get("T004").unwrap();
    assert_eq!(t004.status, TrainStatus::Delayed);
    assert_eq!(t004.current_speed, 60.0);
}

proptest! {
    #[test]
    fn arbitrary_mutations_keep_invariants(
        deltas in prop::collection::vec((0usize..5, -500.0_f64..500.0, -100.0_f64..100.0), 1..60)
    ) {
        let mut registry = Registry::with_fleet(default_fleet()).unwrap();
        let ids: Vec<String> = registry.list().iter().map(|t| t.id.to_string()).collect();

        for (which, dv, dd) in deltas {
            registry
                .update(&ids[which], |mut t| {
                    t.current_speed += dv;
                    t.delay += dd;
                    t
                })
                .unwrap();
            assert_invariants(&registry);
        }
    }

    #[test]
    fn speed_commands_stay_within_limits(requests in prop::collection::vec(-1e4_f64..1e4, 1..30)) {
        let mut registry = Registry::with_fleet(default_fleet()).unwrap();
        let surface = ControlSurface::new();
        for (i, requested) in requests.into_iter().enumerate() {
            let id = format!("T00{}", i % 5 + 1);
            let cmd = surface.set_speed(&mut registry, &id, requested).unwrap();
            let max = registry.get(&id).unwrap().max_speed;
            prop_assert!(cmd.applied >= 0.0 && cmd.applied <= max);
        }
        assert_invariants(&registry);
    }
}
