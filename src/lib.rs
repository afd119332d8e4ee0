//! stoik - scheduled paragraph-posting Telegram bot
//!
//! Posts one unused paragraph from a static text corpus to a Telegram
//! channel at one or two fixed times a day, and on demand from an inline
//! menu. Published paragraphs are remembered so none repeats until an
//! explicit reset.
//!
//! # Architecture
//!
//! - [`corpus`] - corpus loading, page-number stripping, random selection
//! - [`storage`] - used-set and generator-state persistence
//! - [`scheduler`] - posting times, fire-time arithmetic, fire tasks
//! - [`publish`] - the select, persist, deliver action
//! - [`delivery`] - the `Channel` abstraction and its Telegram implementation
//! - [`telegram`] - Bot API client and long-poll update loop
//! - [`bot`] - the controller that serializes commands, buttons and fire events
//! - [`config`] - configuration management
//! - [`utils`] - retry helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stoik::config::Config;
//! use stoik::delivery::TelegramChannel;
//! use stoik::publish::Publisher;
//! use stoik::telegram::TelegramClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = TelegramClient::new(&config.telegram)?;
//!     let channel = Arc::new(TelegramChannel::new(client, config.telegram.channel_id.as_str())?);
//!     let mut publisher = Publisher::from_config(&config, channel);
//!     publisher.publish().await?;
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod bot;
pub mod config;
pub mod corpus;
pub mod delivery;
pub mod error;
pub mod i18n;
pub mod publish;
pub mod scheduler;
pub mod storage;
pub mod telegram;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bot::{BotEvent, Controller, ControllerSettings, ReplySurface};
    pub use crate::config::Config;
    pub use crate::corpus::{ParagraphSelector, ParagraphStore, Selection};
    pub use crate::delivery::{Channel, DeliveryStatus, TelegramChannel};
    pub use crate::error::{Error, ErrorCategory, Result, StoikErrorTrait};
    pub use crate::publish::{Published, Publisher};
    pub use crate::scheduler::{PostTime, Schedule, ScheduleStore};
    pub use crate::storage::{UsedSet, UsedSetStore};
    pub use crate::telegram::TelegramClient;
}
