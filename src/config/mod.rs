//! Configuration management for the stoik bot
//!
//! Configuration comes from a TOML file (`--config`), or from environment
//! variables when no file is given. The bot token is always taken from
//! `TELEGRAM_BOT_TOKEN` when that variable is set, so it never has to be
//! written to disk.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::corpus::DEFAULT_MIN_PARAGRAPH_LENGTH;
use crate::telegram::DEFAULT_API_BASE_URL;

/// Largest UTC offset chrono accepts, in minutes
const MAX_OFFSET_MINUTES: u32 = 18 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Bot API access
    pub telegram: TelegramConfig,

    /// File locations
    pub storage: StorageConfig,

    /// Selection and schedule settings
    pub publishing: PublishingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Telegram Bot API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: String,

    /// Channel receiving the posts (`@username` or numeric id)
    pub channel_id: String,

    /// Bot API endpoint
    pub api_base_url: String,

    /// Long-poll timeout for `getUpdates`
    pub poll_timeout_secs: u64,

    /// Timeout for ordinary API requests
    pub request_timeout_secs: u64,

    /// Retries for failed API requests
    pub max_retries: u32,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::from("@thecreative_act"),
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            poll_timeout_secs: 30,
            request_timeout_secs: 45,
            max_retries: 3,
        }
    }
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Source text, paragraphs separated by a blank line
    pub corpus_path: PathBuf,

    /// Posting times, one `HH:MM` per line
    pub schedule_path: PathBuf,

    /// JSON array of already published paragraphs
    pub used_paragraphs_path: PathBuf,

    /// Selector generator snapshot
    pub random_state_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/corpus.txt"),
            schedule_path: PathBuf::from("data/schedule.txt"),
            used_paragraphs_path: PathBuf::from("data/used_paragraphs.json"),
            random_state_path: PathBuf::from("data/random_state.json"),
        }
    }
}

/// Selection and schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    /// Minimum paragraph length in characters
    pub min_paragraph_length: usize,

    /// Offset of the schedule timezone from UTC, in minutes
    pub utc_offset_minutes: i32,

    /// Label shown next to times in replies
    pub timezone_label: String,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            min_paragraph_length: DEFAULT_MIN_PARAGRAPH_LENGTH,
            utc_offset_minutes: 180,
            timezone_label: String::from("МСК"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,

    /// Language of replies and log-facing messages (ru, en)
    pub language: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
            language: crate::i18n::DEFAULT_LOCALE.to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        let defaults = Self::default();

        config.telegram.bot_token = std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        config.telegram.channel_id = std::env::var("STOIK_CHANNEL_ID")
            .unwrap_or(defaults.telegram.channel_id);
        config.telegram.api_base_url = std::env::var("STOIK_API_BASE_URL")
            .unwrap_or(defaults.telegram.api_base_url);
        config.telegram.poll_timeout_secs = env_parse("STOIK_POLL_TIMEOUT")
            .unwrap_or(defaults.telegram.poll_timeout_secs);
        config.telegram.request_timeout_secs = env_parse("STOIK_REQUEST_TIMEOUT")
            .unwrap_or(defaults.telegram.request_timeout_secs);
        config.telegram.max_retries = env_parse("STOIK_MAX_RETRIES")
            .unwrap_or(defaults.telegram.max_retries);

        if let Ok(dir) = std::env::var("STOIK_DATA_DIR") {
            let dir = PathBuf::from(dir);
            config.storage = StorageConfig {
                corpus_path: dir.join("corpus.txt"),
                schedule_path: dir.join("schedule.txt"),
                used_paragraphs_path: dir.join("used_paragraphs.json"),
                random_state_path: dir.join("random_state.json"),
            };
        }
        if let Ok(path) = std::env::var("STOIK_CORPUS_PATH") {
            config.storage.corpus_path = PathBuf::from(path);
        }

        config.publishing.min_paragraph_length = env_parse("STOIK_MIN_PARAGRAPH_LENGTH")
            .unwrap_or(defaults.publishing.min_paragraph_length);
        config.publishing.utc_offset_minutes = env_parse("STOIK_UTC_OFFSET_MINUTES")
            .unwrap_or(defaults.publishing.utc_offset_minutes);
        if let Ok(label) = std::env::var("STOIK_TIMEZONE_LABEL") {
            config.publishing.timezone_label = label;
        }

        config.logging.level =
            std::env::var("STOIK_LOG_LEVEL").unwrap_or(defaults.logging.level);
        config.logging.format =
            std::env::var("STOIK_LOG_FORMAT").unwrap_or(defaults.logging.format);
        config.logging.language =
            std::env::var("STOIK_LANG").unwrap_or(defaults.logging.language);

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise from the environment
    ///
    /// `TELEGRAM_BOT_TOKEN` overrides the file's token in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.trim().is_empty() {
                config.telegram.bot_token = token;
            }
        }

        Ok(config)
    }

    /// Validate configuration values that every mode needs
    pub fn validate(&self) -> Result<()> {
        if self.publishing.min_paragraph_length == 0 {
            anyhow::bail!("min_paragraph_length must be greater than 0");
        }

        if self.publishing.utc_offset_minutes.unsigned_abs() >= MAX_OFFSET_MINUTES {
            anyhow::bail!(
                "utc_offset_minutes must be within ±{} (got {})",
                MAX_OFFSET_MINUTES,
                self.publishing.utc_offset_minutes
            );
        }

        let paths = [
            ("corpus_path", &self.storage.corpus_path),
            ("schedule_path", &self.storage.schedule_path),
            ("used_paragraphs_path", &self.storage.used_paragraphs_path),
            ("random_state_path", &self.storage.random_state_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{name} cannot be empty");
            }
        }

        if self.telegram.poll_timeout_secs >= self.telegram.request_timeout_secs {
            tracing::warn!(
                poll_timeout_secs = self.telegram.poll_timeout_secs,
                request_timeout_secs = self.telegram.request_timeout_secs,
                "Long-poll timeout is not below the request timeout"
            );
        }

        Ok(())
    }

    /// Validate settings needed to talk to Telegram
    pub fn validate_for_service(&self) -> Result<()> {
        self.validate()?;

        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("Bot token missing: set TELEGRAM_BOT_TOKEN or telegram.bot_token");
        }

        if self.telegram.channel_id.trim().is_empty() {
            anyhow::bail!("telegram.channel_id cannot be empty");
        }

        Ok(())
    }

    /// Schedule timezone as a fixed offset
    pub fn timezone(&self) -> Result<FixedOffset> {
        let seconds = self.publishing.utc_offset_minutes.checked_mul(60);
        seconds.and_then(FixedOffset::east_opt).with_context(|| {
            format!(
                "Invalid UTC offset: {} minutes",
                self.publishing.utc_offset_minutes
            )
        })
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.telegram.request_timeout_secs)
    }
}
