//! Virtual-time task scheduler.
//!
//! Periodic tasks (the telemetry tick) and one-shot deferred completions (the
//! optimization latency) are both entries in one queue. Time only moves when
//! the owner drains due tasks, so a tick and a completion can never interleave
//! inside a single train update: the owner handles one fired task at a time,
//! in due order.
//!
//! Every scheduled task gets a [`TaskHandle`]; cancelling through the handle
//! removes the task and releases it deterministically.

use crate::error::{SimError, SimResult};

/// Handle to a scheduled task, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// How often a task fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recurrence {
    Once,
    Every { period_s: f64 },
}

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    due_s: f64,
    recurrence: Recurrence,
    payload: T,
}

/// A task whose due time has been reached.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredTask<T> {
    pub handle: TaskHandle,
    /// Session time the task was due at; the clock reads this while it runs.
    pub due_s: f64,
    pub payload: T,
}

/// Cooperative scheduler over a virtual clock.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_s: f64,
    next_handle: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_s: 0.0,
            next_handle: 1,
            tasks: Vec::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    /// Create a scheduler with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session time in seconds.
    pub fn now(&self) -> f64 {
        self.now_s
    }

    /// Fire `payload` every `period_s`, first at `now + period_s`.
    pub fn schedule_every(&mut self, period_s: f64, payload: T) -> SimResult<TaskHandle> {
        if !(period_s.is_finite() && period_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "period must be positive and finite",
            });
        }
        Ok(self.push(period_s, Recurrence::Every { period_s }, payload))
    }

    /// Fire `payload` once, `delay_s` from now.
    pub fn schedule_once(&mut self, delay_s: f64, payload: T) -> SimResult<TaskHandle> {
        if !(delay_s.is_finite() && delay_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "delay must be non-negative and finite",
            });
        }
        Ok(self.push(delay_s, Recurrence::Once, payload))
    }

    fn push(&mut self, delay_s: f64, recurrence: Recurrence, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.tasks.push(ScheduledTask {
            handle,
            due_s: self.now_s + delay_s,
            recurrence,
            payload,
        });
        handle
    }

    /// Cancel a task. Returns `false` if it already fired (one-shot) or was
    /// never scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    /// Cancel everything. Returns the number of tasks dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Due time of the next task, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.tasks.iter().map(|t| t.due_s).reduce(f64::min)
    }

    /// Take the earliest task due at or before `until_s`.
    ///
    /// Ties go to the task scheduled first. The clock moves to the task's due
    /// time; periodic tasks are re-armed one period later.
    pub fn pop_due(&mut self, until_s: f64) -> Option<FiredTask<T>> {
        let slot = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_s <= until_s)
            .min_by(|(_, a), (_, b)| {
                a.due_s
                    .total_cmp(&b.due_s)
                    .then_with(|| a.handle.cmp(&b.handle))
            })
            .map(|(i, _)| i)?;

        let due_s = self.tasks[slot].due_s;
        self.now_s = self.now_s.max(due_s);

        let fired = match self.tasks[slot].recurrence {
            Recurrence::Once => {
                let task = self.tasks.remove(slot);
                FiredTask {
                    handle: task.handle,
                    due_s,
                    payload: task.payload,
                }
            }
            Recurrence::Every { period_s } => {
                let task = &mut self.tasks[slot];
                task.due_s += period_s;
                FiredTask {
                    handle: task.handle,
                    due_s,
                    payload: task.payload.clone(),
                }
            }
        };
        Some(fired)
    }

    /// Move the clock forward to `until_s` once all due work is drained.
    /// The clock never runs backwards.
    pub fn settle(&mut self, until_s: f64) {
        self.now_s = self.now_s.max(until_s);
    }

    /// Drain every task due up to `until_s` and settle the clock there.
    ///
    /// Convenience for owners that do not schedule new work from handlers.
    pub fn advance_to(&mut self, until_s: f64) -> Vec<FiredTask<T>> {
        let mut fired = Vec::new();
        while let Some(task) = self.pop_due(until_s) {
            fired.push(task);
        }
        self.settle(until_s);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Job {
        Tick,
        Finish,
    }

    #[test]
    fn periodic_fires_each_period() {
        let mut sched = Scheduler::new();
        sched.schedule_every(5.0, Job::Tick).unwrap();

        assert!(sched.advance_to(4.9).is_empty());
        let fired = sched.advance_to(15.0);
        let times: Vec<f64> = fired.iter().map(|f| f.due_s).collect();
        assert_eq!(times, [5.0, 10.0, 15.0]);
        assert_eq!(sched.now(), 15.0);
        assert_eq!(sched.next_due(), Some(20.0));
    }

    #[test]
    fn once_fires_once() {
        let mut sched = Scheduler::new();
        let h = sched.schedule_once(3.0, Job::Finish).unwrap();
        assert!(sched.is_scheduled(h));
        assert_eq!(sched.advance_to(10.0).len(), 1);
        assert!(!sched.is_scheduled(h));
        assert!(sched.advance_to(20.0).is_empty());
    }

    #[test]
    fn tasks_fire_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule_every(5.0, Job::Tick).unwrap();
        sched.advance_to(4.0);
        sched.schedule_once(3.0, Job::Finish).unwrap();

        let fired = sched.advance_to(10.0);
        let order: Vec<(f64, Job)> = fired.into_iter().map(|f| (f.due_s, f.payload)).collect();
        assert_eq!(order, [(5.0, Job::Tick), (7.0, Job::Finish), (10.0, Job::Tick)]);
    }

    #[test]
    fn handles_are_unique_and_increasing() {
        let mut sched = Scheduler::new();
        let a = sched.schedule_every(1.0, Job::Tick).unwrap();
        let b = sched.schedule_once(1.0, Job::Finish).unwrap();
        assert!(b.value() > a.value());
        sched.cancel(b);
        let c = sched.schedule_once(1.0, Job::Finish).unwrap();
        assert!(c.value() > b.value());
    }

    #[test]
    fn ties_go_to_first_scheduled() {
        let mut sched = Scheduler::new();
        sched.schedule_once(2.0, Job::Finish).unwrap();
        sched.schedule_once(2.0, Job::Tick).unwrap();
        let fired = sched.advance_to(2.0);
        assert_eq!(fired[0].payload, Job::Finish);
        assert_eq!(fired[1].payload, Job::Tick);
    }

    #[test]
    fn pop_due_moves_clock_to_due_time() {
        let mut sched = Scheduler::new();
        sched.schedule_once(3.0, Job::Finish).unwrap();
        let fired = sched.pop_due(10.0).unwrap();
        assert_eq!(fired.due_s, 3.0);
        assert_eq!(sched.now(), 3.0);
        sched.settle(10.0);
        assert_eq!(sched.now(), 10.0);
    }

    #[test]
    fn cancel_stops_periodic() {
        let mut sched = Scheduler::new();
        let h = sched.schedule_every(1.0, Job::Tick).unwrap();
        assert_eq!(sched.advance_to(2.0).len(), 2);
        assert!(sched.cancel(h));
        assert!(!sched.cancel(h));
        assert!(sched.advance_to(10.0).is_empty());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn cancel_all_releases_everything() {
        let mut sched = Scheduler::new();
        sched.schedule_every(1.0, Job::Tick).unwrap();
        sched.schedule_once(0.5, Job::Finish).unwrap();
        assert_eq!(sched.cancel_all(), 2);
        assert_eq!(sched.next_due(), None);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut sched: Scheduler<Job> = Scheduler::new();
        sched.advance_to(5.0);
        sched.advance_to(1.0);
        assert_eq!(sched.now(), 5.0);
    }

    #[test]
    fn invalid_periods_rejected() {
        let mut sched = Scheduler::new();
        assert!(sched.schedule_every(0.0, Job::Tick).is_err());
        assert!(sched.schedule_every(f64::INFINITY, Job::Tick).is_err());
        assert!(sched.schedule_once(-1.0, Job::Finish).is_err());
        assert!(sched.schedule_once(0.0, Job::Finish).is_ok());
    }
}
