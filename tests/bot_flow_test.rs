//! End-to-end controller flows with a virtual clock
//!
//! Fire tasks sleep on tokio's timer, so with paused time a scheduled
//! publication arrives as soon as the queue is polled.

mod common;

use chrono::FixedOffset;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

use common::{
    publisher_in, write_corpus, RecordingChannel, RecordingSurface, FIRST_PARAGRAPH,
    SECOND_PARAGRAPH,
};
use stoik::bot::{
    BotEvent, ButtonPress, CommandRequest, Controller, ControllerSettings, EVENT_QUEUE_CAPACITY,
};
use stoik::corpus::CorpusError;
use stoik::scheduler::{PostTime, ReconcilerState, Schedule, ScheduleStore};

struct Harness {
    dir: TempDir,
    channel: Arc<RecordingChannel>,
    surface: Arc<RecordingSurface>,
    controller: Controller,
    events: mpsc::Receiver<BotEvent>,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path(), &[FIRST_PARAGRAPH, SECOND_PARAGRAPH]);

    let channel = Arc::new(RecordingChannel::default());
    let surface = Arc::new(RecordingSurface::default());
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let controller = Controller::new(
        ControllerSettings {
            offset: FixedOffset::east_opt(3 * 3600).unwrap(),
            timezone_label: "МСК".into(),
        },
        ScheduleStore::new(dir.path().join("schedule.txt")),
        publisher_in(dir.path(), channel.clone()),
        surface.clone(),
        tx,
    );

    Harness {
        dir,
        channel,
        surface,
        controller,
        events: rx,
    }
}

fn command(name: &str, args: &[&str]) -> BotEvent {
    BotEvent::Command(CommandRequest {
        chat_id: 77,
        name: name.into(),
        args: args.iter().map(|s| s.to_string()).collect(),
    })
}

fn press(data: &str) -> BotEvent {
    BotEvent::Button(ButtonPress {
        callback_id: format!("cb-{data}"),
        chat_id: 77,
        message_id: 3,
        data: data.into(),
    })
}

fn cleaned(paragraph: &str) -> String {
    stoik::corpus::strip_page_numbers(paragraph)
}

/// `/settime 07:30` replaces the fire tasks; the next fire publishes one paragraph
#[tokio::test(start_paused = true)]
async fn test_settime_then_scheduled_post() {
    let mut h = harness();

    h.controller.handle(command("settime", &["07:30"])).await;
    assert_eq!(h.controller.reconciler_state(), ReconcilerState::Active(1));
    assert_eq!(
        std::fs::read_to_string(h.dir.path().join("schedule.txt")).unwrap(),
        "07:30\n"
    );

    let event = h.events.recv().await.expect("fire event");
    match &event {
        BotEvent::Fire(fire) => assert_eq!(fire.time, PostTime::new(7, 30).unwrap()),
        other => panic!("expected a fire event, got {other:?}"),
    }

    h.controller.handle(event).await;

    let delivered = h.channel.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(
        delivered[0] == cleaned(FIRST_PARAGRAPH) || delivered[0] == cleaned(SECOND_PARAGRAPH),
        "unexpected text: {}",
        delivered[0]
    );
    // the replaced 09:00/18:00 tasks are gone, only 07:30 is pending
    assert_eq!(h.controller.schedule().times(), &[PostTime::new(7, 30).unwrap()]);
}

/// Consecutive fires for the same slot land one day apart
#[tokio::test(start_paused = true)]
async fn test_fire_repeats_daily() {
    let mut h = harness();
    h.controller.handle(command("settime", &["12:00"])).await;

    let first = match h.events.recv().await {
        Some(BotEvent::Fire(fire)) => fire,
        other => panic!("expected a fire event, got {other:?}"),
    };
    let second = match h.events.recv().await {
        Some(BotEvent::Fire(fire)) => fire,
        other => panic!("expected a fire event, got {other:?}"),
    };

    assert_eq!(second.scheduled_for - first.scheduled_for, chrono::Duration::days(1));
}

/// No paragraph repeats until a reset, after which both become available again
#[tokio::test(start_paused = true)]
async fn test_exhaustion_and_reset() {
    let mut h = harness();

    h.controller.handle(press("post_immediately")).await;
    h.controller.handle(press("post_immediately")).await;

    let delivered = h.channel.delivered();
    assert_eq!(delivered.len(), 2);
    assert_ne!(delivered[0], delivered[1]);

    h.controller.handle(press("post_immediately")).await;
    assert_eq!(h.channel.delivered().len(), 2);
    assert_eq!(
        h.surface.last_reply().as_deref(),
        Some(CorpusError::AllExhausted.localized_desc().as_str())
    );

    h.controller.handle(command("reset_used", &[])).await;
    assert_eq!(h.controller.publisher().used_count().unwrap(), 0);

    h.controller.handle(press("post_immediately")).await;
    h.controller.handle(press("post_immediately")).await;
    h.controller.handle(press("post_immediately")).await;

    assert_eq!(
        h.surface.last_reply().as_deref(),
        Some(CorpusError::AllExhausted.localized_desc().as_str())
    );

    let delivered = h.channel.delivered();
    assert_eq!(delivered.len(), 4);
    let mut after_reset = delivered[2..].to_vec();
    after_reset.sort();
    let mut expected = vec![cleaned(FIRST_PARAGRAPH), cleaned(SECOND_PARAGRAPH)];
    expected.sort();
    assert_eq!(after_reset, expected);

    // every button press is acknowledged
    assert_eq!(h.surface.acks.lock().unwrap().len(), 6);
}

/// The used set survives a restart of the controller
#[tokio::test(start_paused = true)]
async fn test_used_set_survives_restart() {
    let mut h = harness();
    h.controller.handle(press("post_immediately")).await;
    let first = h.channel.delivered()[0].clone();
    drop(h.controller);

    let channel = Arc::new(RecordingChannel::default());
    let (tx, _rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let mut restarted = Controller::new(
        ControllerSettings {
            offset: FixedOffset::east_opt(3 * 3600).unwrap(),
            timezone_label: "МСК".into(),
        },
        ScheduleStore::new(h.dir.path().join("schedule.txt")),
        publisher_in(h.dir.path(), channel.clone()),
        h.surface.clone(),
        tx,
    );
    restarted.handle(press("post_immediately")).await;

    let second = channel.delivered();
    assert_eq!(second.len(), 1);
    assert_ne!(second[0], first);
}

/// A saved schedule is picked up on startup
#[tokio::test(start_paused = true)]
async fn test_schedule_loaded_on_startup() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path(), &[FIRST_PARAGRAPH]);
    std::fs::write(dir.path().join("schedule.txt"), "06:15\n21:45\n").unwrap();

    let (tx, _rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let controller = Controller::new(
        ControllerSettings {
            offset: FixedOffset::east_opt(3 * 3600).unwrap(),
            timezone_label: "МСК".into(),
        },
        ScheduleStore::new(dir.path().join("schedule.txt")),
        publisher_in(dir.path(), Arc::new(RecordingChannel::default())),
        Arc::new(RecordingSurface::default()),
        tx,
    );

    assert_eq!(
        controller.schedule(),
        &Schedule::new(vec![PostTime::new(6, 15).unwrap(), PostTime::new(21, 45).unwrap()])
            .unwrap()
    );
    assert_eq!(controller.reconciler_state(), ReconcilerState::Active(2));
}

/// Delivery failures are reported to the user and the paragraph stays used
#[tokio::test(start_paused = true)]
async fn test_failed_delivery_reported() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path(), &[FIRST_PARAGRAPH, SECOND_PARAGRAPH]);
    let surface = Arc::new(RecordingSurface::default());
    let (tx, _rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let mut controller = Controller::new(
        ControllerSettings {
            offset: FixedOffset::east_opt(3 * 3600).unwrap(),
            timezone_label: "МСК".into(),
        },
        ScheduleStore::new(dir.path().join("schedule.txt")),
        publisher_in(dir.path(), Arc::new(RecordingChannel::failing())),
        surface.clone(),
        tx,
    );

    controller.handle(press("post_immediately")).await;

    assert_eq!(controller.publisher().used_count().unwrap(), 1);
    let reply = surface.last_reply().expect("error reply");
    assert!(reply.contains("test outage"), "reply: {reply}");
}
