//! Error codes for session setup and phase transitions

use thiserror::Error;

use crate::state::Phase;

/// Early-return with `$err` unless `$cond` holds.
macro_rules! require {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
pub(crate) use require;

/// Rejected game configuration. No session is created.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("agent count must be between 1 and {max}, got {count}")]
    AgentCount { count: u8, max: usize },

    #[error("discussion time must be a positive number of seconds")]
    DiscussionSeconds,

    #[error("a finite game needs at least one round")]
    MaxRounds,

    #[error("end probability must be in (0, 1], got {0}")]
    EndProbability(f64),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller bug: the session was asked to do something its phase forbids.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} during {found} phase (expected {expected})")]
    InvalidPhase {
        action: &'static str,
        expected: Phase,
        found: Phase,
    },

    #[error("round {0} has already been resolved")]
    RoundAlreadyResolved(u32),

    #[error("no agent with id {0}")]
    UnknownAgent(String),

    #[error("chat message is empty")]
    EmptyMessage,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
