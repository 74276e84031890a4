//! Error types for the timer and its collaborators

use std::path::PathBuf;
use thiserror::Error;

use crate::pomodoro::pomodoro::Mode;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("invalid duration for {mode}: {minutes} (expected a positive whole number of minutes)")]
    InvalidConfig { mode: Mode, minutes: i64 },

    #[error("not a whole number of minutes: {0:?}")]
    InvalidMinutes(String),

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("failed to access settings file {path}")]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timer runtime is no longer running")]
    RuntimeClosed,
}
