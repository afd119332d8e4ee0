//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No times were supplied
    MissingTimes,

    /// A time token is not `HH:MM`
    MalformedTime {
        input: String,
    },

    /// Wrong number of times (must be 1 or 2)
    InvalidTimeCount {
        count: usize,
    },

    /// Hour or minute outside the clock range
    TimeOutOfRange {
        hour: u32,
        minute: u32,
    },

    /// Schedule file exists but cannot be read
    SourceUnavailable {
        path: String,
        reason: String,
    },

    /// IO error
    IoError {
        operation: String,
        reason: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTimes => write!(f, "No posting time given"),
            Self::MalformedTime { input } => {
                write!(f, "Malformed time '{}'. Expected HH:MM", input)
            }
            Self::InvalidTimeCount { count } => {
                write!(f, "Expected one or two posting times, got {}", count)
            }
            Self::TimeOutOfRange { hour, minute } => {
                write!(f, "Time {}:{} out of range. Must be 00:00-23:59", hour, minute)
            }
            Self::SourceUnavailable { path, reason } => {
                write!(f, "Schedule file {} unavailable: {}", path, reason)
            }
            Self::IoError { operation, reason } => {
                write!(f, "IO error during '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<std::io::Error> for SchedulerError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl SchedulerError {
    /// Create a malformed time error
    pub fn malformed(input: impl Into<String>) -> Self {
        Self::MalformedTime {
            input: input.into(),
        }
    }

    /// Create an IO error with context
    pub fn io_error(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IoError {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Get localized description for user-facing messages
    pub fn localized_desc(&self) -> String {
        match self {
            Self::MissingTimes => crate::i18n::t!("errors.schedule.missing").to_string(),
            Self::MalformedTime { .. } | Self::TimeOutOfRange { .. } => {
                crate::i18n::t!("errors.schedule.malformed").to_string()
            }
            Self::InvalidTimeCount { .. } => {
                crate::i18n::t!("errors.schedule.count").to_string()
            }
            Self::SourceUnavailable { reason, .. } | Self::IoError { reason, .. } => {
                crate::i18n::t!("errors.schedule.io", reason = reason).to_string()
            }
        }
    }

    /// Check if the error comes from user input rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTimes
                | Self::MalformedTime { .. }
                | Self::InvalidTimeCount { .. }
                | Self::TimeOutOfRange { .. }
        )
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::IoError { .. })
    }
}
