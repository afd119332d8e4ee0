//! Unified error handling for the stoik crate
//!
//! Domain modules keep their own error types; this module wraps them into a
//! single [`Error`] so the publisher and the controller can return one type.
//!
//! - [`StoikErrorTrait`] - common interface implemented by the unified error
//! - [`ErrorCategory`] - classification used when logging and replying
//! - [`Error`] - unified error enum wrapping all domain-specific errors
//!
//! ```rust
//! use stoik::error::{Error, ErrorCategory, StoikErrorTrait};
//! use stoik::corpus::CorpusError;
//!
//! let err: Error = CorpusError::AllExhausted.into();
//! assert_eq!(err.category(), ErrorCategory::Content);
//! assert!(!err.is_recoverable());
//! ```

use std::io;
use thiserror::Error;

pub use crate::corpus::CorpusError;
pub use crate::delivery::ChannelError;
pub use crate::scheduler::error::SchedulerError;
pub use crate::storage::StorageError;

/// Common trait for stoik error types
pub trait StoikErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Corpus and paragraph selection
    Content,
    /// Persistence and file I/O
    Storage,
    /// Message delivery and the Bot API
    Delivery,
    /// Configuration and validation
    Config,
    /// Schedule persistence and timing
    Scheduler,
    /// Bad user input (commands, time formats)
    Input,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Content => crate::i18n::t!("errors.category.content").to_string(),
            Self::Storage => crate::i18n::t!("errors.category.storage").to_string(),
            Self::Delivery => crate::i18n::t!("errors.category.delivery").to_string(),
            Self::Config => crate::i18n::t!("errors.category.config").to_string(),
            Self::Scheduler => crate::i18n::t!("errors.category.scheduler").to_string(),
            Self::Input => crate::i18n::t!("errors.category.input").to_string(),
            Self::Other => crate::i18n::t!("errors.category.other").to_string(),
        }
    }
}

/// Unified error type for the stoik crate
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus loading and paragraph selection
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Schedule parsing and persistence
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Used-set and generator state persistence
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Message delivery failure
    #[error("Delivery error: {0}")]
    Delivery(#[from] ChannelError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl StoikErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Corpus(e) => e.is_recoverable(),
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Storage(_) => true,
            Self::Delivery(e) => e.is_retryable(),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other(_) => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Corpus(e) => e.localized_desc(),
            Self::Scheduler(e) => e.localized_desc(),
            Self::Storage(e) => crate::i18n::t!("errors.storage.error", reason = e).to_string(),
            Self::Delivery(e) => e.localized_desc(),
            Self::Io(e) => crate::i18n::t!("errors.storage.error", reason = e).to_string(),
            Self::Json(e) => crate::i18n::t!("errors.storage.error", reason = e).to_string(),
            Self::Config(msg) => crate::i18n::t!("errors.config.error", reason = msg).to_string(),
            Self::Other(context) => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Corpus(CorpusError::SourceUnavailable { .. }) => ErrorCategory::Storage,
            Self::Corpus(_) => ErrorCategory::Content,
            Self::Scheduler(e) if e.is_input_error() => ErrorCategory::Input,
            Self::Scheduler(_) => ErrorCategory::Scheduler,
            Self::Storage(_) | Self::Io(_) | Self::Json(_) => ErrorCategory::Storage,
            Self::Delivery(ChannelError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Delivery(_) => ErrorCategory::Delivery,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other(context.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::Corpus(CorpusError::TooShort { min_length: 50 });
        assert_eq!(err.category(), ErrorCategory::Content);

        let err = Error::Corpus(CorpusError::SourceUnavailable {
            path: "data/corpus.txt".into(),
            reason: "missing".into(),
        });
        assert_eq!(err.category(), ErrorCategory::Storage);

        let err = Error::Scheduler(SchedulerError::malformed("7-30"));
        assert_eq!(err.category(), ErrorCategory::Input);

        let err = Error::Scheduler(SchedulerError::io_error("save_schedule", "denied"));
        assert_eq!(err.category(), ErrorCategory::Scheduler);
    }

    #[test]
    fn test_delivery_category() {
        let err = Error::Delivery(ChannelError::InvalidConfig("empty token".into()));
        assert_eq!(err.category(), ErrorCategory::Config);

        let err = Error::Delivery(ChannelError::Api {
            code: 400,
            description: "Bad Request: chat not found".into(),
        });
        assert_eq!(err.category(), ErrorCategory::Delivery);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(!Error::Corpus(CorpusError::AllExhausted).is_recoverable());
        assert!(Error::Delivery(ChannelError::Unavailable("502".into())).is_recoverable());
        assert!(Error::Io(io::Error::new(io::ErrorKind::Other, "busy")).is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = CorpusError::EmptyCorpus.into();
        assert!(matches!(unified, Error::Corpus(_)));

        let unified: Error = SchedulerError::MissingTimes.into();
        assert!(matches!(unified, Error::Scheduler(_)));
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("bot_token is empty");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.localized_desc(), "Something went wrong");
    }

    #[test]
    fn test_from_anyhow() {
        let err: Error = anyhow::anyhow!("context lost").into();
        assert!(matches!(err, Error::Other(_)));
    }
}
