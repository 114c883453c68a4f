//! Per-phase countdown.
//!
//! The clock counts whole seconds inside the current phase and wraps
//! Inhale -> Hold -> Exhale -> Inhale forever. It has no notion of a
//! session; the controller decides when to stop ticking it.
//!
//! A phase configured with zero seconds is passed through immediately on
//! entry, in the same call, so a skipped phase never costs a tick.

use serde::{Deserialize, Serialize};

use super::preset::{Phase, PhaseDurations};

/// One crossed phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBoundary {
    pub from: Phase,
    pub to: Phase,
    /// Configured length of the phase just entered.
    pub duration_secs: u32,
}

impl PhaseBoundary {
    /// An Exhale -> Inhale wrap closes one breathing cycle.
    pub fn completes_cycle(&self) -> bool {
        self.from == Phase::Exhale
    }
}

/// Boundaries crossed during a single `tick()` or `reset()`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub boundaries: Vec<PhaseBoundary>,
}

impl TickOutcome {
    pub fn cycles_completed(&self) -> usize {
        self.boundaries.iter().filter(|b| b.completes_cycle()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseClock {
    durations: PhaseDurations,
    phase: Phase,
    remaining_secs: u32,
}

impl PhaseClock {
    /// Clock positioned at the start of an inhale.
    ///
    /// A zero inhale is left as-is here; use [`PhaseClock::reset`] to get the
    /// skip behaviour on a zero-length starting phase.
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            durations,
            phase: Phase::Inhale,
            remaining_secs: durations.inhale_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// Configured length of the current phase.
    pub fn phase_duration_secs(&self) -> u32 {
        self.durations.for_phase(self.phase)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Jump straight to `phase` with `duration` seconds left.
    pub fn reset(&mut self, phase: Phase, duration: u32) -> TickOutcome {
        self.phase = phase;
        self.remaining_secs = duration;
        let mut outcome = TickOutcome::default();
        if duration == 0 {
            self.advance(&mut outcome);
        }
        outcome
    }

    /// One second elapsed.
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.advance(&mut outcome);
        }
        outcome
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Move past the current phase, then past any zero-length phases that
    /// follow. Bounded to one lap so an all-zero table cannot spin.
    fn advance(&mut self, outcome: &mut TickOutcome) {
        for _ in 0..3 {
            let from = self.phase;
            let to = from.next();
            let duration_secs = self.durations.for_phase(to);
            self.phase = to;
            self.remaining_secs = duration_secs;
            outcome.boundaries.push(PhaseBoundary {
                from,
                to,
                duration_secs,
            });
            if duration_secs > 0 {
                return;
            }
        }
        tracing::warn!(durations = ?self.durations, "every phase has zero duration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_clock() -> PhaseClock {
        PhaseClock::new(PhaseDurations::new(4, 4, 4))
    }

    #[test]
    fn starts_at_inhale() {
        let clock = box_clock();
        assert_eq!(clock.phase(), Phase::Inhale);
        assert_eq!(clock.remaining_secs(), 4);
    }

    #[test]
    fn counts_down_then_advances() {
        let mut clock = box_clock();
        for expected in [3, 2, 1] {
            assert!(clock.tick().is_empty());
            assert_eq!(clock.remaining_secs(), expected);
        }
        let outcome = clock.tick();
        assert_eq!(
            outcome.boundaries,
            vec![PhaseBoundary {
                from: Phase::Inhale,
                to: Phase::Hold,
                duration_secs: 4
            }]
        );
        assert_eq!(clock.phase(), Phase::Hold);
        assert_eq!(clock.remaining_secs(), 4);
    }

    #[test]
    fn exhale_wrap_completes_cycle() {
        let mut clock = box_clock();
        let cycles: usize = (0..12).map(|_| clock.tick().cycles_completed()).sum();
        assert_eq!(cycles, 1);
        assert_eq!(clock.phase(), Phase::Inhale);
    }

    #[test]
    fn zero_hold_is_skipped_in_the_same_tick() {
        let mut clock = PhaseClock::new(PhaseDurations::new(6, 0, 2));
        for _ in 0..5 {
            clock.tick();
        }
        let outcome = clock.tick();
        assert_eq!(outcome.boundaries.len(), 2);
        assert_eq!(outcome.boundaries[0].to, Phase::Hold);
        assert_eq!(outcome.boundaries[1].from, Phase::Hold);
        assert_eq!(clock.phase(), Phase::Exhale);
        assert_eq!(clock.remaining_secs(), 2);
        assert_eq!(outcome.cycles_completed(), 0);
    }

    #[test]
    fn reset_into_zero_phase_advances_immediately() {
        let mut clock = PhaseClock::new(PhaseDurations::new(6, 0, 2));
        let outcome = clock.reset(Phase::Hold, 0);
        assert_eq!(outcome.boundaries.len(), 1);
        assert_eq!(clock.phase(), Phase::Exhale);
        assert_eq!(clock.remaining_secs(), 2);
    }

    #[test]
    fn reset_sets_phase_and_remaining() {
        let mut clock = box_clock();
        clock.tick();
        let outcome = clock.reset(Phase::Exhale, 3);
        assert!(outcome.is_empty());
        assert_eq!(clock.phase(), Phase::Exhale);
        assert_eq!(clock.remaining_secs(), 3);
        assert_eq!(clock.phase_duration_secs(), 4);
    }

    #[test]
    fn all_zero_durations_do_not_hang() {
        let mut clock = PhaseClock::new(PhaseDurations::new(0, 0, 0));
        let outcome = clock.tick();
        assert_eq!(outcome.boundaries.len(), 3);
        assert_eq!(clock.remaining_secs(), 0);
    }
}
