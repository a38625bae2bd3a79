//! # tomato Core Library
//!
//! This library provides the session engine behind the `tomato` focus timer.
//! Hosts (the bundled terminal CLI, or any other front end) supply the user's
//! settings and render whatever state the engine exposes.
//!
//! ## Architecture
//!
//! - **Timer**: a wall-clock-driven state machine (Idle, Working, Resting,
//!   Succeeded). The caller reports elapsed time with `advance()`; the
//!   countdown and the progress ring move in lock step.
//! - **Effects**: ambient audio and full-screen requests issued on mode
//!   transitions, isolated behind an adapter that never fails the session.
//! - **Runtime**: an async loop that drives a controller from tokio time.
//! - **Storage**: TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`SessionController`]: the session state machine
//! - [`SideEffectAdapter`]: ambient audio / full-screen boundary
//! - [`SessionRunner`]: async frame loop
//! - [`Config`]: application configuration management

pub mod effects;
pub mod error;
pub mod events;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use effects::{AmbientPlayer, AmbientSound, FullScreen, SideEffectAdapter, Transition};
pub use error::{ConfigError, CoreError, EffectError, SessionError};
pub use events::Event;
pub use runtime::{RunnerCommand, SessionRunner};
pub use storage::Config;
pub use timer::{
    format_remaining, PhaseKind, SessionConfig, SessionController, SessionMode, SessionSnapshot,
};
