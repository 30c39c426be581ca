//! Scheduler-driven telemetry runs.

use proptest::prelude::*;
use rf_fleet::{Registry, default_fleet};
use rf_sim::{Scheduler, SimRng, TelemetryOptions, TelemetrySimulator};

#[derive(Debug, Clone, PartialEq)]
enum Task {
    Telemetry,
}

#[test]
fn scheduler_drives_ticks_until_cancelled() {
    let mut registry = Registry::with_fleet(default_fleet()).unwrap();
    let opts = TelemetryOptions::default();
    let mut sim = TelemetrySimulator::new(opts, SimRng::from_seed_u64(3)).unwrap();
    let mut sched = Scheduler::new();
    let timer = sched.schedule_every(opts.period_s, Task::Telemetry).unwrap();

    for fired in sched.advance_to(60.0) {
        assert_eq!(fired.payload, Task::Telemetry);
        sim.tick(&mut registry);
    }
    assert_eq!(sim.ticks(), 12);

    assert!(sched.cancel(timer));
    assert!(sched.advance_to(600.0).is_empty());
    assert_eq!(sim.ticks(), 12);
}

proptest! {
    #[test]
    fn invariants_hold_after_every_tick(
        seed in any::<u64>(),
        ticks in 1usize..200,
        speed_jitter in 0.0_f64..50.0,
        delay_jitter in 0.0_f64..20.0,
    ) {
        let mut registry = Registry::with_fleet(default_fleet()).unwrap();
        let opts = TelemetryOptions {
            speed_jitter_kmh: speed_jitter,
            delay_jitter_min: delay_jitter,
            ..Default::default()
        };
        let mut sim = TelemetrySimulator::new(opts, SimRng::from_seed_u64(seed)).unwrap();

        for _ in 0..ticks {
            let report = sim.tick(&mut registry);
            prop_assert!(report.update.is_clean());
            for train in registry.list() {
                prop_assert!(train.current_speed >= 0.0);
                prop_assert!(train.current_speed <= train.max_speed);
                prop_assert!(train.delay >= 0.0);
            }
        }
    }
}
