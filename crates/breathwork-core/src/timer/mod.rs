mod clock;
mod preset;
mod runner;
mod session;

pub use clock::{PhaseBoundary, PhaseClock, TickOutcome};
pub use preset::{Phase, PhaseDurations, Preset, SESSION_CYCLES};
pub use runner::{RunnerOptions, SessionRunner};
pub use session::{SessionController, SessionState, SessionStatus};
