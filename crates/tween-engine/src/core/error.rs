//! Error types for tween configuration and lifecycle misuse.

use thiserror::Error;
use crate::api::types::{Millis, TweenStatus};

/// Error type returned by caller-supplied callbacks and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A tween could not be started (or a hook registered) because its
/// description is invalid. Nothing is mutated when one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tween has no target properties")]
    EmptyTarget,

    #[error("duration must be a finite, non-negative number of milliseconds, got {0}")]
    InvalidDuration(Millis),

    #[error("delay must be a finite, non-negative number of milliseconds, got {0}")]
    InvalidDelay(Millis),

    #[error("value of property `{0}` is not finite")]
    NonFiniteValue(String),

    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    /// An easing was given for a property the tween does not animate.
    #[error("easing given for `{0}`, which is not a target property")]
    UnknownProperty(String),

    /// A target property has no value in `from` nor in the current state.
    #[error("property `{0}` has no start value")]
    MissingStart(String),

    #[error("property `{0}` is in `from` but not in `to`")]
    UnexpectedStart(String),

    #[error("unknown hook event `{0}`")]
    UnknownHookEvent(String),

    #[error("invalid tween description: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by a [`Tweenable`](crate::Tweenable) or by a frame it runs.
#[derive(Debug, Error)]
pub enum TweenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A lifecycle operation was called from a status that does not allow it.
    #[error("cannot {op} a tween that is {status}")]
    InvalidState {
        op: &'static str,
        status: TweenStatus,
    },

    /// The per-tween `step` callback failed.
    #[error("step callback failed: {0}")]
    Step(#[source] BoxError),

    /// The per-tween completion callback failed.
    #[error("completion callback failed: {0}")]
    Complete(#[source] BoxError),
}

impl TweenError {
    pub(crate) fn invalid_state(op: &'static str, status: TweenStatus) -> Self {
        Self::InvalidState { op, status }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = TweenError::invalid_state("resume", TweenStatus::Running);
        assert_eq!(err.to_string(), "cannot resume a tween that is running");
        assert!(err.is_invalid_state());

        let err: TweenError = ConfigError::UnknownEasing("wobble".into()).into();
        assert_eq!(err.to_string(), "unknown easing `wobble`");
        assert!(!err.is_invalid_state());
    }

    #[test]
    fn callback_errors_keep_their_source() {
        use std::error::Error as _;
        let err = TweenError::Step("boom".into());
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }
}
