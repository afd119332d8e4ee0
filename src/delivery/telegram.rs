//! Telegram channel delivery
//!
//! Posts paragraphs to a channel through `sendMessage`. The bot must be an
//! administrator of the channel.

use async_trait::async_trait;

use super::{Channel, ChannelError, ChannelResult, DeliveryStatus};
use crate::telegram::{ChatId, TelegramClient};

/// Delivers messages to one Telegram chat or channel
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    client: TelegramClient,
    chat_id: ChatId,
}

impl TelegramChannel {
    /// Create a channel posting to `chat_id` (`@username` or numeric id)
    pub fn new(client: TelegramClient, chat_id: impl Into<ChatId>) -> ChannelResult<Self> {
        let chat_id = chat_id.into();
        if chat_id.is_empty() {
            return Err(ChannelError::InvalidConfig(
                "channel_id cannot be empty".to_string(),
            ));
        }

        Ok(Self { client, chat_id })
    }

    /// Destination chat
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, text: &str) -> ChannelResult<DeliveryStatus> {
        let message = self.client.send_message(&self.chat_id, text, None).await?;

        tracing::info!(
            chat_id = %self.chat_id,
            message_id = message.message_id,
            "Message delivered"
        );

        Ok(DeliveryStatus::success_with_message(
            self.name(),
            format!("message_id={}", message.message_id),
        ))
    }

    async fn health_check(&self) -> ChannelResult<bool> {
        let me = self.client.get_me().await?;
        tracing::info!(
            bot_id = me.id,
            username = me.username.as_deref().unwrap_or("-"),
            "Authorized with Bot API"
        );
        Ok(me.is_bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chat_id_rejected() {
        let client = TelegramClient::with_base_url("123:abc", "http://localhost:1").unwrap();
        let result = TelegramChannel::new(client, "");
        assert!(matches!(result, Err(ChannelError::InvalidConfig(_))));
    }

    #[test]
    fn test_channel_name() {
        let client = TelegramClient::with_base_url("123:abc", "http://localhost:1").unwrap();
        let channel = TelegramChannel::new(client, "@thecreative_act").unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.chat_id().to_string(), "@thecreative_act");
    }
}
