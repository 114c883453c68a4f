//! # Breathwork Core Library
//!
//! This library provides the core logic for guided breathing sessions.
//! The CLI is a thin presentation layer over it: it starts and stops
//! sessions and renders the snapshots the core publishes.
//!
//! ## Architecture
//!
//! - **Phase Clock**: per-phase countdown wrapping Inhale -> Hold -> Exhale,
//!   skipping zero-length phases without spending a tick
//! - **Session Controller**: lifecycle (idle / running / completed) and cycle
//!   counting over a clock; requires the caller to invoke `tick()`
//! - **Session Runner**: a single tokio ticker driving a controller, with a
//!   broadcast channel of [`Event`]s for subscribers
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Preset`]: the three fixed exercises and their phase durations
//! - [`SessionController`]: synchronous session state machine
//! - [`SessionRunner`]: async driver the presentation layer talks to
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    Phase, PhaseClock, PhaseDurations, Preset, RunnerOptions, SessionController, SessionRunner,
    SessionState, SessionStatus, SESSION_CYCLES,
};
