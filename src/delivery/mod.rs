//! Delivery channels for published paragraphs
//!
//! A [`Channel`] delivers one text message to its destination. The bot ships
//! a Telegram implementation; tests plug in a recording one.

pub mod telegram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use telegram::TelegramChannel;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur during channel operations
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Bot API answered with `ok: false`
    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Invalid channel configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Channel temporarily unavailable
    #[error("Channel temporarily unavailable: {0}")]
    Unavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error
    #[error("Channel error: {0}")]
    Other(String),
}

impl ChannelError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(e) => !e.is_builder() && !e.is_decode(),
            Self::Unavailable(_) | Self::RateLimited { .. } => true,
            Self::Api { .. }
            | Self::InvalidConfig(_)
            | Self::SerializationError(_)
            | Self::Other(_) => false,
        }
    }

    /// Server-requested wait before the next attempt
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// Get localized description for user-facing messages
    pub fn localized_desc(&self) -> String {
        match self {
            Self::RateLimited { .. } => crate::i18n::t!("errors.delivery.rate_limited").to_string(),
            Self::InvalidConfig(reason) => {
                crate::i18n::t!("errors.delivery.config", reason = reason).to_string()
            }
            other => crate::i18n::t!("errors.delivery.failed", reason = other.to_string()).to_string(),
        }
    }
}

/// Result of a delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStatus {
    /// Whether the message was delivered
    pub success: bool,
    /// Channel that delivered (or failed to deliver) the message
    pub channel: String,
    /// Optional message about the delivery
    pub message: Option<String>,
    /// Timestamp of delivery attempt
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DeliveryStatus {
    /// Create a successful delivery status
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a successful delivery status with a message
    pub fn success_with_message(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: Some(message.into()),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SUCCESS" } else { "FAILED" };
        write!(f, "[{status}] {}", self.channel)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// Destination for published paragraphs
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &str;

    /// Deliver one text message
    async fn deliver(&self, text: &str) -> ChannelResult<DeliveryStatus>;

    /// Check if the channel is reachable
    async fn health_check(&self) -> ChannelResult<bool> {
        Ok(true)
    }
}
