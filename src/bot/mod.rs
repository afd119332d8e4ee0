//! Bot controller
//!
//! The [`Controller`] owns all mutable application state: the schedule, the
//! reconciler and the publisher. Commands, button presses and scheduler fire
//! events arrive as [`BotEvent`]s on one mpsc queue and are handled strictly
//! one at a time, so no two publications ever interleave.
//!
//! ```text
//!  UpdatePoller ──Command/Button──┐
//!                                 ▼
//!                         mpsc<BotEvent> ──▶ Controller ──▶ Publisher ──▶ Channel
//!                                 ▲               │
//!  fire tasks ─────────Fire───────┘               └──▶ ReplySurface (chat replies)
//! ```

pub mod commands;
pub mod menu;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::config::Config;
use crate::delivery::ChannelResult;
use crate::error::{Error, ErrorCategory, StoikErrorTrait};
use crate::i18n::t;
use crate::publish::Publisher;
use crate::scheduler::{
    FireEvent, ReconcilerState, Schedule, ScheduleReconciler, ScheduleStore, SchedulerError,
};
use crate::telegram::InlineKeyboardMarkup;

pub use commands::Command;
pub use menu::{main_menu, MenuAction};

/// Capacity of the controller queue
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// A slash command from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub chat_id: i64,
    /// Command name without the leading `/`
    pub name: String,
    pub args: Vec<String>,
}

/// A pressed inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonPress {
    pub callback_id: String,
    pub chat_id: i64,
    /// Message carrying the keyboard
    pub message_id: i64,
    pub data: String,
}

/// Everything the controller reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    Command(CommandRequest),
    Button(ButtonPress),
    Fire(FireEvent),
}

impl From<FireEvent> for BotEvent {
    fn from(event: FireEvent) -> Self {
        Self::Fire(event)
    }
}

/// Where replies to users go
#[async_trait]
pub trait ReplySurface: Send + Sync {
    /// Send a new message to a chat, optionally with a keyboard
    async fn reply(
        &self,
        chat_id: i64,
        text: &str,
        menu: Option<&InlineKeyboardMarkup>,
    ) -> ChannelResult<()>;

    /// Replace the text of an existing message
    async fn edit(&self, chat_id: i64, message_id: i64, text: &str) -> ChannelResult<()>;

    /// Acknowledge a button press
    async fn acknowledge(&self, callback_id: &str) -> ChannelResult<()>;
}

/// Presentation settings for replies
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Schedule timezone
    pub offset: FixedOffset,
    /// Label shown after times, e.g. `МСК`
    pub timezone_label: String,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let offset = config
            .timezone()
            .map_err(|e| Error::config(format!("{e:#}")))?;

        Ok(Self {
            offset,
            timezone_label: config.publishing.timezone_label.clone(),
        })
    }
}

/// Single owner of the bot's state
pub struct Controller {
    settings: ControllerSettings,
    started_at: DateTime<FixedOffset>,
    schedule: Schedule,
    schedule_store: ScheduleStore,
    reconciler: ScheduleReconciler<BotEvent>,
    publisher: Publisher,
    surface: Arc<dyn ReplySurface>,
}

impl Controller {
    /// Load the schedule and start its fire tasks
    ///
    /// Fire events are pushed into `events`; must be called inside a tokio
    /// runtime.
    pub fn new(
        settings: ControllerSettings,
        schedule_store: ScheduleStore,
        publisher: Publisher,
        surface: Arc<dyn ReplySurface>,
        events: mpsc::Sender<BotEvent>,
    ) -> Self {
        let started_at = Utc::now().with_timezone(&settings.offset);
        let schedule = schedule_store.load();
        let mut reconciler = ScheduleReconciler::new(settings.offset, events);
        reconciler.apply(&schedule);

        tracing::info!(
            schedule = %schedule,
            zone = %settings.timezone_label,
            "Controller started"
        );

        Self {
            settings,
            started_at,
            schedule,
            schedule_store,
            reconciler,
            publisher,
            surface,
        }
    }

    /// Current schedule
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Reconciler lifecycle state
    pub fn reconciler_state(&self) -> ReconcilerState {
        self.reconciler.state()
    }

    /// Earliest upcoming fire instant
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        self.reconciler.next_fire()
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Drain the queue until shutdown
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<BotEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("Shutdown requested, controller stopping");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
            }
        }

        self.reconciler.clear();
    }

    /// Process one event; failures are logged and reported, never returned
    pub async fn handle(&mut self, event: BotEvent) {
        match event {
            BotEvent::Fire(fire) => self.on_fire(fire).await,
            BotEvent::Command(request) => self.on_command(request).await,
            BotEvent::Button(press) => self.on_button(press).await,
        }
    }

    async fn on_fire(&mut self, fire: FireEvent) {
        tracing::info!(
            slot = fire.slot,
            time = %fire.time,
            scheduled_for = %fire.scheduled_for,
            "Scheduled publication"
        );

        if let Err(e) = self.publisher.publish().await {
            log_failure("scheduled_post", &e);
        }
    }

    async fn on_command(&mut self, request: CommandRequest) {
        let chat_id = request.chat_id;

        match Command::parse(&request) {
            Command::Start => {
                let text = t!(
                    "bot.start",
                    zone = self.settings.timezone_label,
                    started_at = self.started_at.format("%d. %m %H:%M:%S")
                );
                self.reply(chat_id, &text, Some(&main_menu())).await;
            }
            Command::SetTime(args) => {
                let text = match Schedule::parse_args(&args) {
                    Ok(schedule) => self.apply_schedule(schedule),
                    Err(e) => {
                        tracing::info!(args = ?args, error = %e, "Rejected /settime");
                        e.localized_desc()
                    }
                };
                self.reply(chat_id, &text, None).await;
            }
            Command::ResetUsed => {
                let text = match self.publisher.reset_used() {
                    Ok(()) => t!("bot.reset.done").to_string(),
                    Err(e) => {
                        log_failure("reset_used", &e);
                        e.localized_desc()
                    }
                };
                self.reply(chat_id, &text, None).await;
            }
            Command::Unknown(name) => {
                tracing::debug!(command = %name, chat_id, "Ignoring unknown command");
            }
        }
    }

    async fn on_button(&mut self, press: ButtonPress) {
        if let Err(e) = self.surface.acknowledge(&press.callback_id).await {
            tracing::warn!(error = %e, "Failed to acknowledge button press");
        }

        let Some(action) = MenuAction::from_callback_data(&press.data) else {
            tracing::debug!(data = %press.data, "Ignoring unknown button");
            return;
        };

        match action {
            MenuAction::PostNow => {
                let text = match self.publisher.publish().await {
                    Ok(_) => t!("bot.post.success").to_string(),
                    Err(e) => {
                        log_failure("post_now", &e);
                        e.localized_desc()
                    }
                };
                self.reply(press.chat_id, &text, None).await;
            }
            MenuAction::ViewSchedule => {
                let text = t!(
                    "bot.schedule.current",
                    times = self.schedule.display(),
                    zone = self.settings.timezone_label
                );
                self.edit(&press, &text).await;
            }
            MenuAction::ResetUsed => {
                let text = match self.publisher.reset_used() {
                    Ok(()) => t!("bot.reset.done_button").to_string(),
                    Err(e) => {
                        log_failure("reset_used", &e);
                        e.localized_desc()
                    }
                };
                self.edit(&press, &text).await;
            }
        }
    }

    /// Persist, reconcile and describe a new schedule
    fn apply_schedule(&mut self, schedule: Schedule) -> String {
        let saved = self.schedule_store.save(&schedule);
        self.reconciler.apply(&schedule);
        self.schedule = schedule;

        tracing::info!(schedule = %self.schedule, "Schedule changed");

        match saved {
            Ok(()) => t!(
                "bot.schedule.updated",
                times = self.schedule.display(),
                zone = self.settings.timezone_label
            )
            .to_string(),
            Err(e) => {
                log_failure("save_schedule", &Error::Scheduler(e.clone()));
                t!("bot.schedule.save_failed", reason = reason_of(&e)).to_string()
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str, menu: Option<&InlineKeyboardMarkup>) {
        if let Err(e) = self.surface.reply(chat_id, text, menu).await {
            tracing::warn!(chat_id, error = %e, "Failed to send reply");
        }
    }

    async fn edit(&self, press: &ButtonPress, text: &str) {
        if let Err(e) = self
            .surface
            .edit(press.chat_id, press.message_id, text)
            .await
        {
            tracing::warn!(
                chat_id = press.chat_id,
                message_id = press.message_id,
                error = %e,
                "Failed to edit message"
            );
        }
    }
}

fn reason_of(err: &SchedulerError) -> String {
    match err {
        SchedulerError::IoError { reason, .. } | SchedulerError::SourceUnavailable { reason, .. } => {
            reason.clone()
        }
        other => other.to_string(),
    }
}

/// Content problems are expected operating conditions; the rest are errors
fn log_failure(action: &str, err: &Error) {
    let category = err.category();
    match category {
        ErrorCategory::Content | ErrorCategory::Input => {
            tracing::warn!(action, category = ?category, error = %err, "Action not completed");
        }
        _ => {
            tracing::error!(
                action,
                category = ?category,
                recoverable = err.is_recoverable(),
                error = %err,
                "Action failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ParagraphSelector, ParagraphStore};
    use crate::delivery::{Channel, DeliveryStatus};
    use crate::scheduler::PostTime;
    use crate::storage::{RngStateStore, UsedSetStore};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Sink {
        posts: Mutex<Vec<String>>,
        replies: Mutex<Vec<(i64, String, bool)>>,
        edits: Mutex<Vec<(i64, i64, String)>>,
        acks: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Channel for Sink {
        fn name(&self) -> &str {
            "sink"
        }

        async fn deliver(&self, text: &str) -> ChannelResult<DeliveryStatus> {
            self.posts.lock().unwrap().push(text.to_string());
            Ok(DeliveryStatus::success("sink"))
        }
    }

    #[async_trait]
    impl ReplySurface for Sink {
        async fn reply(
            &self,
            chat_id: i64,
            text: &str,
            menu: Option<&InlineKeyboardMarkup>,
        ) -> ChannelResult<()> {
            self.replies
                .lock()
                .unwrap()
                .push((chat_id, text.to_string(), menu.is_some()));
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

    struct Fixture {
        _dir: TempDir,
        schedule_path: std::path::PathBuf,
        sink: Arc<Sink>,
        controller: Controller,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus.txt");
        std::fs::write(
            &corpus,
            "Первый абзац корпуса, достаточно длинный, чтобы пройти фильтр длины.\n\n\
             Второй абзац корпуса, тоже достаточно длинный для публикации в канал.",
        )
        .unwrap();

        let sink = Arc::new(Sink::default());
        let publisher = Publisher::new(
            ParagraphStore::new(corpus),
            UsedSetStore::new(dir.path().join("used.json")),
            RngStateStore::new(dir.path().join("rng.json")),
            ParagraphSelector::with_seed(1, 50),
            sink.clone(),
        );
        let schedule_path = dir.path().join("schedule.txt");
        let (tx, _rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let controller = Controller::new(
            ControllerSettings {
                offset: FixedOffset::east_opt(3 * 3600).unwrap(),
                timezone_label: "МСК".into(),
            },
            ScheduleStore::new(&schedule_path),
            publisher,
            sink.clone(),
            tx,
        );

        Fixture {
            _dir: dir,
            schedule_path,
            sink,
            controller,
        }
    }

    fn command(name: &str, args: &[&str]) -> BotEvent {
        BotEvent::Command(CommandRequest {
            chat_id: 5,
            name: name.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn button(data: &str) -> BotEvent {
        BotEvent::Button(ButtonPress {
            callback_id: "cb".into(),
            chat_id: 5,
            message_id: 10,
            data: data.into(),
        })
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        let settings = ControllerSettings::from_config(&config).unwrap();
        assert_eq!(settings.offset.local_minus_utc(), 3 * 3600);
        assert_eq!(settings.timezone_label, "МСК");

        config.publishing.utc_offset_minutes = i32::MIN;
        let err = ControllerSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_with_default_schedule() {
        let f = fixture();
        assert_eq!(f.controller.schedule(), &Schedule::default());
        assert_eq!(f.controller.reconciler_state(), ReconcilerState::Active(2));
        assert!(f.schedule_path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replies_with_menu() {
        let mut f = fixture();
        f.controller.handle(command("start", &[])).await;

        let replies = f.sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, 5);
        assert!(replies[0].2, "menu attached");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settime_updates_everything() {
        let mut f = fixture();
        f.controller.handle(command("settime", &["07:30"])).await;

        assert_eq!(f.controller.schedule().times(), &[PostTime::new(7, 30).unwrap()]);
        assert_eq!(f.controller.reconciler_state(), ReconcilerState::Active(1));
        assert_eq!(std::fs::read_to_string(&f.schedule_path).unwrap(), "07:30\n");
        assert!(f.sink.replies.lock().unwrap()[0].1.contains("07:30"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settime_rejections_keep_schedule() {
        let mut f = fixture();
        for args in [&[][..], &["7-30"][..], &["09:00", "12:00", "18:00"][..], &["bad", "1", "2"][..]] {
            f.controller.handle(command("settime", args)).await;
        }

        assert_eq!(f.controller.schedule(), &Schedule::default());
        let replies = f.sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 4);
        // malformed tokens are reported before the count
        assert_eq!(replies[3].1, SchedulerError::malformed("bad").localized_desc());
        assert_eq!(
            replies[2].1,
            SchedulerError::InvalidTimeCount { count: 3 }.localized_desc()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_command_ignored() {
        let mut f = fixture();
        f.controller.handle(command("help", &[])).await;
        assert!(f.sink.replies.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_button_publishes_and_confirms() {
        let mut f = fixture();
        f.controller.handle(button("post_immediately")).await;

        assert_eq!(f.sink.acks.lock().unwrap().as_slice(), ["cb"]);
        assert_eq!(f.sink.posts.lock().unwrap().len(), 1);
        assert_eq!(f.sink.replies.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_schedule_edits_menu() {
        let mut f = fixture();
        f.controller.handle(button("view_schedule")).await;

        let edits = f.sink.edits.lock().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!((edits[0].0, edits[0].1), (5, 10));
        assert!(edits[0].2.contains("09:00, 18:00"));
        assert!(edits[0].2.contains("МСК"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_publishes_without_reply() {
        let mut f = fixture();
        f.controller
            .handle(BotEvent::Fire(FireEvent {
                slot: 0,
                time: PostTime::new(9, 0).unwrap(),
                scheduled_for: Utc::now(),
            }))
            .await;

        assert_eq!(f.sink.posts.lock().unwrap().len(), 1);
        assert!(f.sink.replies.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_button_edits_message() {
        let mut f = fixture();
        f.controller.handle(button("post_immediately")).await;
        assert_eq!(f.controller.publisher().used_count().unwrap(), 1);

        f.controller.handle(button("reset_used_paragraphs")).await;
        assert_eq!(f.controller.publisher().used_count().unwrap(), 0);
        assert_eq!(f.sink.edits.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let f = fixture();
        let (_tx, rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(f.controller.run(rx, shutdown_rx));
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
