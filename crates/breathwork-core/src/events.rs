use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, PhaseDurations, Preset, SessionState};

/// Every state change in a session produces an Event.
/// The presentation layer subscribes to them through the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        preset: Preset,
        durations: PhaseDurations,
        at: DateTime<Utc>,
    },
    PhaseAdvanced {
        from: Phase,
        to: Phase,
        duration_secs: u32,
        /// True when `from` was an exhale.
        cycle_completed: bool,
        at: DateTime<Utc>,
    },
    CycleCompleted {
        completed_cycles: u32,
        total_cycles: u32,
        at: DateTime<Utc>,
    },
    /// Full state after a tick or a start.
    StateSnapshot(SessionState),
    SessionCompleted {
        preset: Preset,
        completed_cycles: u32,
        at: DateTime<Utc>,
    },
    /// Session halted before reaching the target cycle count.
    SessionStopped {
        completed_cycles: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// No further events follow for this session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::SessionCompleted { .. } | Event::SessionStopped { .. }
        )
    }
}
