//! Common test utilities

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use stoik::bot::ReplySurface;
use stoik::corpus::{ParagraphSelector, ParagraphStore};
use stoik::delivery::{Channel, ChannelError, ChannelResult, DeliveryStatus};
use stoik::publish::Publisher;
use stoik::storage::{RngStateStore, UsedSetStore};
use stoik::telegram::InlineKeyboardMarkup;

/// Two paragraphs long enough to pass the default length filter
#[allow(dead_code)]
pub const FIRST_PARAGRAPH: &str =
    "Не то беда, что ты умрешь, а то, что ты не начинал жить по-настоящему. 12";
#[allow(dead_code)]
pub const SECOND_PARAGRAPH: &str =
    "Счастлив тот, кто правильно судит о вещах и довольствуется тем, что имеет.";

/// Write a corpus file made of the given paragraphs
#[allow(dead_code)]
pub fn write_corpus(dir: &Path, paragraphs: &[&str]) -> PathBuf {
    let path = dir.join("corpus.txt");
    std::fs::write(&path, paragraphs.join("\n\n")).expect("write corpus");
    path
}

/// Publisher over files in `dir` with a fixed seed
#[allow(dead_code)]
pub fn publisher_in(dir: &Path, channel: Arc<dyn Channel>) -> Publisher {
    Publisher::new(
        ParagraphStore::new(dir.join("corpus.txt")),
        UsedSetStore::new(dir.join("used_paragraphs.json")),
        RngStateStore::new(dir.join("random_state.json")),
        ParagraphSelector::with_seed(42, 50),
        channel,
    )
}

/// Channel that records every delivered text
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingChannel {
    delivered: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingChannel {
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    #[allow(dead_code)]
    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, text: &str) -> ChannelResult<DeliveryStatus> {
        if self.fail {
            return Err(ChannelError::Unavailable("test outage".into()));
        }
        self.delivered.lock().unwrap().push(text.to_string());
        Ok(DeliveryStatus::success("recording"))
    }
}

/// Reply surface that records replies, edits and acknowledgements
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSurface {
    pub replies: Mutex<Vec<(i64, String)>>,
    pub edits: Mutex<Vec<(i64, i64, String)>>,
    pub acks: Mutex<Vec<String>>,
}

impl RecordingSurface {
    #[allow(dead_code)]
    pub fn last_reply(&self) -> Option<String> {
        self.replies.lock().unwrap().last().map(|(_, text)| text.clone())
    }
}

#[async_trait]
impl ReplySurface for RecordingSurface {
    async fn reply(
        &self,
        chat_id: i64,
        text: &str,
        _menu: Option<&InlineKeyboardMarkup>,
    ) -> ChannelResult<()> {
        self.replies
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(())
    }

    async fn edit(&self, chat_id: i64, message_id: i64, text: &str) -> ChannelResult<()> {
        self.edits
            .lock()
            .unwrap()
            .push((chat_id, message_id, text.to_string()));
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> ChannelResult<()> {
        self.acks.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}

/// A Bot API `Message` object as JSON
#[allow(dead_code)]
pub fn message_json(message_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "message_id": message_id,
        "date": 1_700_000_000,
        "chat": {"id": chat_id, "type": "private"},
        "from": {"id": chat_id, "is_bot": false, "first_name": "Marcus"},
        "text": text,
    })
}
