//! Long-poll update loop
//!
//! Pulls updates with `getUpdates` and forwards the interesting ones into the
//! controller queue as [`BotEvent`]s. Network failures back off from 5s,
//! doubling up to 60s, and reset after the next successful poll.

use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::types::Update;
use super::TelegramClient;
use crate::bot::{BotEvent, ButtonPress, CommandRequest};

const INITIAL_BACKOFF_SECS: u64 = 5;
const MAX_BACKOFF_SECS: u64 = 60;

/// Turn a raw update into a controller event
///
/// Messages whose text starts with `/` become commands (a `@botname` suffix
/// on the command is dropped); callback queries become button presses.
/// Everything else is ignored.
pub fn translate_update(update: Update) -> Option<BotEvent> {
    if let Some(query) = update.callback_query {
        let (chat_id, message_id) = query
            .message
            .as_ref()
            .map(|m| (m.chat.id, m.message_id))
            .unwrap_or((query.from.id, 0));

        return Some(BotEvent::Button(ButtonPress {
            callback_id: query.id,
            chat_id,
            message_id,
            data: query.data.unwrap_or_default(),
        }));
    }

    let message = update.message?;
    let text = message.text?;
    let mut parts = text.split_whitespace();
    let head = parts.next()?.strip_prefix('/')?;
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }

    Some(BotEvent::Command(CommandRequest {
        chat_id: message.chat.id,
        name: name.to_string(),
        args: parts.map(str::to_string).collect(),
    }))
}

/// Long-polling producer of [`BotEvent`]s
pub struct UpdatePoller {
    client: TelegramClient,
    sender: mpsc::Sender<BotEvent>,
    timeout_secs: u64,
    offset: Option<i64>,
}

impl UpdatePoller {
    pub fn new(client: TelegramClient, sender: mpsc::Sender<BotEvent>, timeout_secs: u64) -> Self {
        Self {
            client,
            sender,
            timeout_secs,
            offset: None,
        }
    }

    /// Poll until shutdown is signalled or the queue closes
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff_secs = INITIAL_BACKOFF_SECS;
        tracing::info!(timeout_secs = self.timeout_secs, "Update poller started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let result = tokio::select! {
                _ = shutdown.changed() => break,
                result = self.client.get_updates(self.offset, self.timeout_secs) => result,
            };

            match result {
                Ok(updates) => {
                    backoff_secs = INITIAL_BACKOFF_SECS;
                    if !self.dispatch(updates).await {
                        tracing::debug!("Event queue closed, poller exiting");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, retry_in_secs = backoff_secs, "getUpdates failed");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                    }
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                }
            }
        }

        tracing::info!("Update poller stopped");
    }

    /// Forward updates; false once the receiver is gone
    async fn dispatch(&mut self, updates: Vec<Update>) -> bool {
        for update in updates {
            let next = update.update_id + 1;
            self.offset = Some(self.offset.map_or(next, |current| current.max(next)));

            let Some(event) = translate_update(update) else {
                continue;
            };
            tracing::debug!(event = ?event, "Update received");
            if self.sender.send(event).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Offset that the next poll will send
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }
}
