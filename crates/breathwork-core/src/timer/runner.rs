//! Async tick source for a [`SessionController`].
//!
//! One tokio task per runner ticks the controller at a fixed interval and
//! publishes every resulting [`Event`] on a broadcast channel. Stopping (or
//! dropping the runner) aborts that task and bumps a session epoch under the
//! state lock, so a tick already in flight can never touch the stopped or a
//! newer session.
//!
//! ## Usage
//!
//! ```ignore
//! let runner = SessionRunner::new(RunnerOptions::default());
//! let mut events = runner.subscribe();
//! runner.start("box-breathing")?;
//! while let Ok(event) = events.recv().await {
//!     render(&event);
//!     if event.is_terminal() { break; }
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::preset::Preset;
use super::session::{SessionController, SessionState};
use crate::error::Result;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub tick_interval: Duration,
    /// Events buffered per subscriber before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            channel_capacity: 256,
        }
    }
}

struct Shared {
    controller: SessionController,
    /// Bumped on every start/stop; a ticker only acts while it matches.
    epoch: u64,
}

pub struct SessionRunner {
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<Event>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    options: RunnerOptions,
}

impl SessionRunner {
    pub fn new(options: RunnerOptions) -> Self {
        let (events, _) = broadcast::channel(options.channel_capacity.max(1));
        Self {
            shared: Arc::new(Mutex::new(Shared {
                controller: SessionController::new(),
                epoch: 0,
            })),
            events,
            ticker: Mutex::new(None),
            options,
        }
    }

    pub fn options(&self) -> RunnerOptions {
        self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SessionState {
        lock(&self.shared).controller.state()
    }

    /// True while a ticker task is alive.
    pub fn is_ticking(&self) -> bool {
        lock(&self.ticker)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the named preset. Unknown names leave any current session
    /// untouched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, name: &str) -> Result<SessionState> {
        let preset = name.parse::<Preset>()?;
        Ok(self.start_preset(preset))
    }

    /// Start (or restart) a session and its ticker. Restarting over a
    /// running session stops it first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_preset(&self, preset: Preset) -> SessionState {
        // A running session gets its SessionStopped before the new start.
        self.stop();

        let (epoch, state) = {
            let mut guard = lock(&self.shared);
            guard.epoch += 1;
            let started = guard.controller.start(preset);
            let state = guard.controller.state();
            self.publish(started);
            self.publish(Event::StateSnapshot(state.clone()));
            (guard.epoch, state)
        };

        self.spawn_ticker(epoch);
        state
    }

    /// Halt the ticker and the session. Safe to call any number of times.
    pub fn stop(&self) {
        self.cancel_ticker();

        let mut guard = lock(&self.shared);
        guard.epoch += 1;
        if let Some(stopped) = guard.controller.stop() {
            self.publish(stopped);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn publish(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn spawn_ticker(&self, epoch: u64) {
        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let period = self.options.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let mut guard = lock(&shared);
                if guard.epoch != epoch {
                    debug!(epoch, "stale ticker exiting");
                    break;
                }
                let produced = guard.controller.tick();
                if produced.is_empty() {
                    break;
                }
                let finished = produced.iter().any(Event::is_terminal);
                for event in produced {
                    let _ = events.send(event);
                }
                if finished {
                    info!(epoch, "ticker finished with session");
                    break;
                }
            }
        });

        *lock(&self.ticker) = Some(handle);
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
