//! Telegram Bot API client
//!
//! A thin JSON-over-HTTPS client for the handful of Bot API methods the bot
//! needs. Every call is a `POST https://api.telegram.org/bot<token>/<method>`
//! with a JSON body; the response envelope is `{"ok": bool, "result": ...}`.
//!
//! # Example
//!
//! ```no_run
//! use stoik::telegram::{ChatId, TelegramClient};
//!
//! # async fn demo() -> Result<(), stoik::delivery::ChannelError> {
//! let client = TelegramClient::with_base_url("123456:token", "https://api.telegram.org")?;
//! let me = client.get_me().await?;
//! println!("running as @{}", me.username.unwrap_or_default());
//!
//! client
//!     .send_message(&ChatId::from("@thecreative_act"), "Hello", None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod poller;
pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::bot::ReplySurface;
use crate::config::TelegramConfig;
use crate::delivery::{ChannelError, ChannelResult};
use crate::utils::retry::{with_retry_hinted, RetryConfig};

pub use poller::{translate_update, UpdatePoller};
pub use types::{
    CallbackQuery, Chat, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User,
};

use types::{
    AnswerCallbackQueryParams, ApiResponse, EditMessageTextParams, GetUpdatesParams,
    SendMessageParams,
};

/// Public Bot API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Extra time allowed on top of the long-poll timeout before the request is
/// considered hung
const LONG_POLL_GRACE_SECS: u64 = 15;

/// Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
    retry: RetryConfig,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    /// Create a client from the `[telegram]` config section
    pub fn new(config: &TelegramConfig) -> ChannelResult<Self> {
        let client = Self::build(
            &config.bot_token,
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(client.with_retry(RetryConfig::new(config.max_retries)))
    }

    /// Create a client against a custom API endpoint
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> ChannelResult<Self> {
        Self::build(&token.into(), &base_url.into(), Duration::from_secs(45))
    }

    fn build(token: &str, base_url: &str, timeout: Duration) -> ChannelResult<Self> {
        if token.trim().is_empty() {
            return Err(ChannelError::InvalidConfig(
                "bot token cannot be empty".to_string(),
            ));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ChannelError::InvalidConfig(format!(
                "API base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stoik/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChannelError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Replace the retry policy for API calls
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Identity of the bot; also a cheap token check
    pub async fn get_me(&self) -> ChannelResult<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Send a text message, optionally with an inline keyboard
    pub async fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> ChannelResult<Message> {
        let params = SendMessageParams {
            chat_id,
            text,
            reply_markup,
        };
        self.call("sendMessage", &params).await
    }

    /// Replace the text of a message sent by the bot; drops its keyboard
    pub async fn edit_message_text(
        &self,
        chat_id: &ChatId,
        message_id: i64,
        text: &str,
    ) -> ChannelResult<Message> {
        let params = EditMessageTextParams {
            chat_id,
            message_id,
            text,
            reply_markup: None,
        };
        self.call("editMessageText", &params).await
    }

    /// Stop the loading indicator on a pressed inline button
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> ChannelResult<bool> {
        let params = AnswerCallbackQueryParams { callback_query_id };
        self.call("answerCallbackQuery", &params).await
    }

    /// Long-poll for new updates
    ///
    /// Not retried; the poller owns the backoff policy for this call.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> ChannelResult<Vec<Update>> {
        let params = GetUpdatesParams {
            offset,
            timeout: timeout_secs,
            allowed_updates: ["message", "callback_query"],
        };
        let timeout = Duration::from_secs(timeout_secs + LONG_POLL_GRACE_SECS);
        self.call_once("getUpdates", &params, Some(timeout)).await
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> ChannelResult<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        with_retry_hinted(
            &self.retry,
            || self.call_once(method, params, None),
            ChannelError::is_retryable,
            ChannelError::retry_after,
        )
        .await
    }

    async fn call_once<P, R>(
        &self,
        method: &str,
        params: &P,
        timeout: Option<Duration>,
    ) -> ChannelResult<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self.http.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // URLs carry the token; strip them from transport errors
        let response = request
            .send()
            .await
            .map_err(|e| ChannelError::HttpError(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::HttpError(e.without_url()))?;

        let parsed: ApiResponse<R> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if status.is_server_error() => {
                return Err(ChannelError::Unavailable(status.to_string()));
            }
            Err(e) => return Err(ChannelError::SerializationError(e)),
        };

        if parsed.ok {
            return parsed
                .result
                .ok_or_else(|| ChannelError::Other(format!("{method}: response without result")));
        }

        let code = parsed
            .error_code
            .unwrap_or_else(|| i64::from(status.as_u16()));
        let description = parsed
            .description
            .unwrap_or_else(|| status.to_string());
        tracing::debug!(method, code, description = %description, "Bot API returned an error");

        Err(match code {
            429 => ChannelError::RateLimited {
                retry_after: parsed.parameters.and_then(|p| p.retry_after),
            },
            500..=599 => ChannelError::Unavailable(description),
            _ => ChannelError::Api { code, description },
        })
    }
}

#[async_trait]
impl ReplySurface for TelegramClient {
    async fn reply(
        &self,
        chat_id: i64,
        text: &str,
        menu: Option<&InlineKeyboardMarkup>,
    ) -> ChannelResult<()> {
        self.send_message(&ChatId::Id(chat_id), text, menu).await?;
        Ok(())
    }

    async fn edit(&self, chat_id: i64, message_id: i64, text: &str) -> ChannelResult<()> {
        self.edit_message_text(&ChatId::Id(chat_id), message_id, text)
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, callback_query_id: &str) -> ChannelResult<()> {
        self.answer_callback_query(callback_query_id).await?;
        Ok(())
    }
}
