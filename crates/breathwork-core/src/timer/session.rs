//! Session controller.
//!
//! A synchronous state machine over a [`PhaseClock`]. Like the clock it owns
//! no thread or timer: the caller invokes `tick()` once per second while the
//! session is running (see [`crate::timer::SessionRunner`] for the async
//! driver).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Completed
//!           |  ^          |
//!           v  |  start   |
//!          Idle <---------+
//! ```
//!
//! `start` from any state begins a fresh session; `stop` only affects a
//! running session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::clock::{PhaseBoundary, PhaseClock};
use super::preset::{Phase, PhaseDurations, Preset, SESSION_CYCLES};
use crate::error::Result;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Completed,
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// `None` until the first `start`.
    pub preset: Option<Preset>,
    pub phase: Phase,
    pub phase_label: String,
    pub remaining_secs: u32,
    pub phase_duration_secs: u32,
    pub completed_cycles: u32,
    pub total_cycles: u32,
    pub status: SessionStatus,
    pub at: DateTime<Utc>,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }
}

#[derive(Debug, Clone)]
pub struct SessionController {
    preset: Option<Preset>,
    clock: PhaseClock,
    completed_cycles: u32,
    status: SessionStatus,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            preset: None,
            clock: PhaseClock::new(PhaseDurations::new(0, 0, 0)),
            completed_cycles: 0,
            status: SessionStatus::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining_secs()
    }

    pub fn state(&self) -> SessionState {
        let phase = self.clock.phase();
        SessionState {
            preset: self.preset,
            phase,
            phase_label: phase.label().to_string(),
            remaining_secs: self.clock.remaining_secs(),
            phase_duration_secs: self.clock.phase_duration_secs(),
            completed_cycles: self.completed_cycles,
            total_cycles: SESSION_CYCLES,
            status: self.status,
            at: Utc::now(),
        }
    }

    /// Every event of a complete session, ticked back to back without
    /// waiting.
    pub fn simulate(preset: Preset) -> Vec<Event> {
        let mut controller = Self::new();
        let mut events = vec![controller.start(preset)];
        while controller.is_running() {
            events.extend(controller.tick());
        }
        events
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh session. Restarts if one is already running.
    pub fn start(&mut self, preset: Preset) -> Event {
        if self.is_running() {
            debug!(previous = ?self.preset, "restarting running session");
        }
        let durations = preset.durations();
        self.preset = Some(preset);
        self.clock = PhaseClock::new(durations);
        self.completed_cycles = 0;
        self.status = SessionStatus::Running;
        // Inhale is non-zero for every preset, so nothing is crossed here.
        let skipped = self.clock.reset(Phase::Inhale, durations.inhale_secs);
        debug_assert!(skipped.is_empty());

        info!(preset = preset.key(), "session started");
        Event::SessionStarted {
            preset,
            durations,
            at: Utc::now(),
        }
    }

    /// Parse a preset name from the presentation layer, then start.
    pub fn start_named(&mut self, name: &str) -> Result<Event> {
        let preset = name.parse::<Preset>()?;
        Ok(self.start(preset))
    }

    /// Halt a running session. Returns `None` when there was nothing to stop,
    /// so calling it repeatedly is harmless.
    pub fn stop(&mut self) -> Option<Event> {
        match self.status {
            SessionStatus::Running => {
                self.status = SessionStatus::Idle;
                info!(completed_cycles = self.completed_cycles, "session stopped");
                Some(Event::SessionStopped {
                    completed_cycles: self.completed_cycles,
                    at: Utc::now(),
                })
            }
            SessionStatus::Idle | SessionStatus::Completed => None,
        }
    }

    /// Call once per second. Returns the events produced by this tick; empty
    /// unless the session is running.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.is_running() {
            return Vec::new();
        }

        let outcome = self.clock.tick();
        let mut events = Vec::with_capacity(outcome.boundaries.len() + 1);
        for boundary in outcome.boundaries {
            events.push(boundary_event(&boundary));
            if boundary.completes_cycle() {
                events.extend(self.on_cycle_completed());
                if !self.is_running() {
                    break;
                }
            }
        }

        debug!(
            phase = %self.clock.phase(),
            remaining_secs = self.clock.remaining_secs(),
            completed_cycles = self.completed_cycles,
            "tick"
        );
        events.push(Event::StateSnapshot(self.state()));
        if self.status == SessionStatus::Completed {
            if let Some(preset) = self.preset {
                events.push(Event::SessionCompleted {
                    preset,
                    completed_cycles: self.completed_cycles,
                    at: Utc::now(),
                });
            }
        }
        events
    }

    /// Record one finished Exhale -> Inhale wrap. Completes the session once
    /// the target cycle count is reached.
    pub fn on_cycle_completed(&mut self) -> Vec<Event> {
        if !self.is_running() {
            return Vec::new();
        }
        self.completed_cycles = (self.completed_cycles + 1).min(SESSION_CYCLES);
        let events = vec![Event::CycleCompleted {
            completed_cycles: self.completed_cycles,
            total_cycles: SESSION_CYCLES,
            at: Utc::now(),
        }];

        if self.completed_cycles >= SESSION_CYCLES {
            // Leaving Running is what halts the clock; tick() is a no-op now.
            self.status = SessionStatus::Completed;
            info!(preset = ?self.preset, "session completed");
        }
        events
    }
}

fn boundary_event(boundary: &PhaseBoundary) -> Event {
    debug!(from = %boundary.from, to = %boundary.to, "phase boundary");
    Event::PhaseAdvanced {
        from: boundary.from,
        to: boundary.to,
        duration_secs: boundary.duration_secs,
        cycle_completed: boundary.completes_cycle(),
        at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(controller: &mut SessionController, n: usize) -> Vec<Event> {
        (0..n).flat_map(|_| controller.tick()).collect()
    }

    #[test]
    fn new_controller_is_idle() {
        let controller = SessionController::new();
        let state = controller.state();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.preset, None);
        assert_eq!(state.completed_cycles, 0);
        assert_eq!(state.total_cycles, SESSION_CYCLES);
    }

    #[test]
    fn start_initializes_inhale() {
        let mut controller = SessionController::new();
        let event = controller.start(Preset::Calm);
        assert!(matches!(event, Event::SessionStarted { preset: Preset::Calm, .. }));
        assert_eq!(controller.status(), SessionStatus::Running);
        assert_eq!(controller.phase(), Phase::Inhale);
        assert_eq!(controller.remaining_secs(), 6);
    }

    #[test]
    fn box_breathing_scenario() {
        let mut controller = SessionController::new();
        controller.start(Preset::BoxBreathing);

        run_ticks(&mut controller, 4);
        assert_eq!(controller.phase(), Phase::Hold);
        assert_eq!(controller.remaining_secs(), 4);

        run_ticks(&mut controller, 4);
        assert_eq!(controller.phase(), Phase::Exhale);

        run_ticks(&mut controller, 4);
        assert_eq!(controller.phase(), Phase::Inhale);
        assert_eq!(controller.completed_cycles(), 1);

        run_ticks(&mut controller, 59);
        assert_eq!(controller.status(), SessionStatus::Running);
        assert_eq!(controller.completed_cycles(), 5);

        let last = controller.tick();
        assert_eq!(controller.status(), SessionStatus::Completed);
        assert_eq!(controller.completed_cycles(), 6);
        assert!(matches!(last.last(), Some(Event::SessionCompleted { .. })));
    }

    #[test]
    fn coffee_completes_after_48_ticks() {
        let mut controller = SessionController::new();
        controller.start(Preset::Coffee);
        run_ticks(&mut controller, 47);
        assert!(controller.is_running());
        run_ticks(&mut controller, 1);
        assert_eq!(controller.status(), SessionStatus::Completed);
        assert_eq!(controller.completed_cycles(), 6);
    }

    #[test]
    fn completed_session_ignores_ticks() {
        let mut controller = SessionController::new();
        controller.start(Preset::Coffee);
        run_ticks(&mut controller, 48);
        let before = controller.state();
        assert!(controller.tick().is_empty());
        assert_eq!(controller.remaining_secs(), before.remaining_secs);
        assert_eq!(controller.phase(), before.phase);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut controller = SessionController::new();
        controller.start(Preset::Calm);
        run_ticks(&mut controller, 3);
        assert!(controller.stop().is_some());
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert!(controller.stop().is_none());
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert!(controller.tick().is_empty());
    }

    #[test]
    fn stop_leaves_completed_alone() {
        let mut controller = SessionController::new();
        controller.start(Preset::BoxBreathing);
        run_ticks(&mut controller, 72);
        assert!(controller.stop().is_none());
        assert_eq!(controller.status(), SessionStatus::Completed);
    }

    #[test]
    fn start_while_running_restarts() {
        let mut controller = SessionController::new();
        controller.start(Preset::BoxBreathing);
        run_ticks(&mut controller, 13);
        assert_eq!(controller.completed_cycles(), 1);

        controller.start(Preset::Calm);
        assert_eq!(controller.preset(), Some(Preset::Calm));
        assert_eq!(controller.completed_cycles(), 0);
        assert_eq!(controller.phase(), Phase::Inhale);
        assert_eq!(controller.remaining_secs(), 6);
    }

    #[test]
    fn restart_after_completion() {
        let mut controller = SessionController::new();
        controller.start(Preset::Coffee);
        run_ticks(&mut controller, 48);
        controller.start(Preset::Coffee);
        assert_eq!(controller.status(), SessionStatus::Running);
        assert_eq!(controller.completed_cycles(), 0);
    }

    #[test]
    fn start_named_rejects_unknown_preset() {
        let mut controller = SessionController::new();
        assert!(controller.start_named("yoga").is_err());
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert!(controller.start_named("box-breathing").is_ok());
        assert_eq!(controller.preset(), Some(Preset::BoxBreathing));
    }

    #[test]
    fn every_running_tick_ends_with_snapshot() {
        let mut controller = SessionController::new();
        controller.start(Preset::Calm);
        for _ in 0..20 {
            let events = controller.tick();
            assert!(matches!(events.last(), Some(Event::StateSnapshot(_))));
        }
    }

    #[test]
    fn simulate_runs_to_completion() {
        let events = SessionController::simulate(Preset::Calm);
        let snapshots = events
            .iter()
            .filter(|e| matches!(e, Event::StateSnapshot(_)))
            .count();
        assert_eq!(snapshots as u32, Preset::Calm.session_secs());
        assert!(matches!(events.first(), Some(Event::SessionStarted { .. })));
        assert!(matches!(events.last(), Some(Event::SessionCompleted { .. })));
    }

    #[test]
    fn on_cycle_completed_caps_at_target() {
        let mut controller = SessionController::new();
        controller.start(Preset::Calm);
        for _ in 0..SESSION_CYCLES {
            controller.on_cycle_completed();
        }
        assert_eq!(controller.status(), SessionStatus::Completed);
        assert!(controller.on_cycle_completed().is_empty());
        assert_eq!(controller.completed_cycles(), SESSION_CYCLES);
    }
}
