//! Error types for countdowns and notification rendering.
//!
//! Only construction-time errors reach the caller of a scheduling request.
//! Render-time errors are contained inside a single tick.

use thiserror::Error;

/// Errors that can occur while creating or rendering a countdown.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerError {
    /// The countdown duration is not a positive, finite number.
    #[error("invalid countdown duration: {0} (must be positive and finite)")]
    InvalidDuration(f64),

    /// A template references a placeholder whose data was not supplied.
    #[error("placeholder {0} requires context that was not supplied")]
    MissingContext(String),

    /// The timer configuration failed validation.
    #[error("invalid timer configuration: {0}")]
    InvalidConfig(String),
}

impl TimerError {
    /// Returns true if the tick loop may continue after this error.
    ///
    /// A skipped frame is not fatal; everything else fails the call that
    /// produced it.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingContext(_))
    }

    /// Returns a short hint for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidDuration(_) => "use a positive, finite duration",
            Self::MissingContext(_) => "show %players_shown% only on progress bars",
            Self::InvalidConfig(_) => "check the timer configuration values",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimerError::InvalidDuration(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = TimerError::MissingContext("%players_shown%".to_string());
        assert!(err.to_string().contains("%players_shown%"));

        let err = TimerError::InvalidConfig("notches must be at least 1".to_string());
        assert!(err.to_string().contains("notches"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(TimerError::MissingContext("x".into()).is_recoverable());
        assert!(!TimerError::InvalidDuration(0.0).is_recoverable());
        assert!(!TimerError::InvalidConfig("x".into()).is_recoverable());
    }

    #[test]
    fn test_suggestion() {
        assert!(TimerError::InvalidDuration(0.0).suggestion().contains("positive"));
        assert!(TimerError::MissingContext("x".into())
            .suggestion()
            .contains("progress bars"));
    }
}
