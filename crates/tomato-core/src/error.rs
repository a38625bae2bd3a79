//! Core error types for tomato-core.
//!
//! Only configuration and invalid-transition errors ever reach the caller.
//! Side-effect errors are produced by the effect backends and swallowed
//! (logged) at the [`SideEffectAdapter`](crate::effects::SideEffectAdapter)
//! boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::SessionMode;

/// Core error type for tomato-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session control errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by [`SessionController`](crate::timer::SessionController)
/// operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A phase duration was zero.
    #[error("Invalid duration for '{field}': must be at least one second")]
    InvalidDuration { field: &'static str },

    /// `start()` was called while a phase is already counting down.
    #[error("Cannot start a session while {mode}")]
    AlreadyRunning { mode: SessionMode },
}

/// Failures of the ambient audio and full-screen backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// No usable audio output device.
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    /// The ambient sound file is missing.
    #[error("Ambient sound not found at {}", .0.display())]
    SoundNotFound(PathBuf),

    /// The display refused to enter or leave full screen.
    #[error("Full screen refused: {0}")]
    FullScreenRefused(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
