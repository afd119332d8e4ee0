//! Keeps background fire tasks in sync with the schedule
//!
//! Each posting time gets its own tokio task that sleeps until the next
//! occurrence and then pushes a [`FireEvent`] into the controller queue. The
//! tasks never publish on their own; the controller serializes the work.

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::schedule::{PostTime, Schedule};
use super::trigger::{duration_until, next_fire_after, FireEvent};

/// Lifecycle of the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    /// No fire tasks registered
    Idle,
    /// The given number of fire tasks registered
    Active(usize),
}

struct FireTask {
    time: PostTime,
    handle: JoinHandle<()>,
}

/// Replaces all fire tasks whenever the schedule changes
///
/// `E` is the queue item type; anything built from a [`FireEvent`] works, so
/// the controller can share one queue between fire events and commands.
pub struct ScheduleReconciler<E = FireEvent> {
    offset: FixedOffset,
    sender: mpsc::Sender<E>,
    tasks: Vec<FireTask>,
}

impl<E> ScheduleReconciler<E>
where
    E: From<FireEvent> + Send + 'static,
{
    /// Create an idle reconciler
    pub fn new(offset: FixedOffset, sender: mpsc::Sender<E>) -> Self {
        Self {
            offset,
            sender,
            tasks: Vec::new(),
        }
    }

    /// Abort every registered task and register one per schedule entry
    ///
    /// Must be called from within a tokio runtime.
    pub fn apply(&mut self, schedule: &Schedule) {
        self.clear();

        for (slot, time) in schedule.times().iter().copied().enumerate() {
            let handle = tokio::spawn(fire_loop(slot, time, self.offset, self.sender.clone()));
            self.tasks.push(FireTask { time, handle });
        }

        tracing::info!(
            schedule = %schedule,
            offset = %self.offset,
            tasks = self.tasks.len(),
            "Schedule applied"
        );
    }

    /// Abort all registered tasks
    pub fn clear(&mut self) {
        for task in self.tasks.drain(..) {
            task.handle.abort();
            tracing::debug!(time = %task.time, "Fire task aborted");
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ReconcilerState {
        match self.tasks.len() {
            0 => ReconcilerState::Idle,
            n => ReconcilerState::Active(n),
        }
    }

    /// Number of registered fire tasks
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Times of the registered tasks, in schedule order
    pub fn active_times(&self) -> Vec<PostTime> {
        self.tasks.iter().map(|t| t.time).collect()
    }

    /// Earliest upcoming fire instant
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        let now = Utc::now();
        self.tasks
            .iter()
            .map(|t| next_fire_after(now, t.time, self.offset))
            .min()
    }
}

impl<E> Drop for ScheduleReconciler<E> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.handle.abort();
        }
    }
}

async fn fire_loop<E>(slot: usize, time: PostTime, offset: FixedOffset, sender: mpsc::Sender<E>)
where
    E: From<FireEvent> + Send + 'static,
{
    let mut after = Utc::now();

    loop {
        let target = next_fire_after(after, time, offset);
        let wait = duration_until(Utc::now(), target);
        tracing::debug!(
            slot,
            time = %time,
            target = %target,
            wait_secs = wait.as_secs(),
            "Fire task sleeping"
        );

        tokio::time::sleep(wait).await;

        let event = FireEvent {
            slot,
            time,
            scheduled_for: target,
        };
        if sender.send(event.into()).await.is_err() {
            tracing::debug!(slot, "Event queue closed, fire task exiting");
            break;
        }

        after = target.max(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msk() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn t(hour: u32, minute: u32) -> PostTime {
        PostTime::new(hour, minute).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_idle() {
        let (tx, _rx) = mpsc::channel::<FireEvent>(8);
        let reconciler = ScheduleReconciler::new(msk(), tx);
        assert_eq!(reconciler.state(), ReconcilerState::Idle);
        assert!(reconciler.next_fire().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_is_idempotent() {
        let (tx, _rx) = mpsc::channel::<FireEvent>(8);
        let mut reconciler = ScheduleReconciler::new(msk(), tx);
        let schedule = Schedule::default();

        reconciler.apply(&schedule);
        reconciler.apply(&schedule);

        assert_eq!(reconciler.active_count(), 2);
        assert_eq!(reconciler.state(), ReconcilerState::Active(2));
        assert_eq!(reconciler.active_times(), vec![t(9, 0), t(18, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_goes_idle() {
        let (tx, _rx) = mpsc::channel::<FireEvent>(8);
        let mut reconciler = ScheduleReconciler::new(msk(), tx);

        reconciler.apply(&Schedule::new(vec![t(7, 30)]).unwrap());
        assert_eq!(reconciler.state(), ReconcilerState::Active(1));

        reconciler.clear();
        assert_eq!(reconciler.state(), ReconcilerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_event_delivered() {
        let (tx, mut rx) = mpsc::channel::<FireEvent>(8);
        let mut reconciler = ScheduleReconciler::new(msk(), tx);
        reconciler.apply(&Schedule::new(vec![t(7, 30)]).unwrap());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.slot, 0);
        assert_eq!(event.time, t(7, 30));
        assert!(event.scheduled_for > Utc::now() - chrono::Duration::days(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_schedule_does_not_fire() {
        let (tx, mut rx) = mpsc::channel::<FireEvent>(8);
        let mut reconciler = ScheduleReconciler::new(msk(), tx);

        reconciler.apply(&Schedule::new(vec![t(3, 0), t(4, 0)]).unwrap());
        reconciler.apply(&Schedule::new(vec![t(12, 45)]).unwrap());

        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.time, t(12, 45));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_fire_is_upcoming() {
        let (tx, _rx) = mpsc::channel::<FireEvent>(8);
        let mut reconciler = ScheduleReconciler::new(msk(), tx);
        reconciler.apply(&Schedule::default());

        let next = reconciler.next_fire().unwrap();
        assert!(next > Utc::now());
        assert!(next <= Utc::now() + chrono::Duration::days(1));
    }
}
