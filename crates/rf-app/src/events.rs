use uuid::Uuid;

/// Something that happened while the session clock advanced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// One telemetry pass over the fleet.
    Tick {
        at_s: f64,
        tick: u64,
        updated: usize,
        failed: usize,
    },
    OptimizationCompleted {
        at_s: f64,
        run_id: Uuid,
        delay_removed_min: f64,
    },
    OptimizationFailed {
        at_s: f64,
        message: String,
    },
}

impl SessionEvent {
    /// Session time the event fired at.
    pub fn at_s(&self) -> f64 {
        match self {
            SessionEvent::Tick { at_s, .. }
            | SessionEvent::OptimizationCompleted { at_s, .. }
            | SessionEvent::OptimizationFailed { at_s, .. } => *at_s,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionEvent::Tick { .. } => "tick",
            SessionEvent::OptimizationCompleted { .. } => "optimization-completed",
            SessionEvent::OptimizationFailed { .. } => "optimization-failed",
        }
    }
}
