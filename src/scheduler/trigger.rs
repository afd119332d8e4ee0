//! Fire-time arithmetic
//!
//! Posting times are wall-clock times in a fixed UTC offset (Moscow time by
//! default). Fixed offsets have no DST gaps, so every local time maps to
//! exactly one instant.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use super::schedule::{PostTime, Schedule};

/// A scheduler-triggered publish request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEvent {
    /// Index of the time within the schedule
    pub slot: usize,

    /// Configured time of day that fired
    pub time: PostTime,

    /// Instant the event was scheduled for
    pub scheduled_for: DateTime<Utc>,
}

/// Next occurrence of `time` strictly after `after`
pub fn next_fire_after(after: DateTime<Utc>, time: PostTime, offset: FixedOffset) -> DateTime<Utc> {
    let local_date = after.with_timezone(&offset).date_naive();
    let local_target = local_date.and_time(time.to_naive_time());
    let utc_target =
        local_target - Duration::seconds(i64::from(offset.local_minus_utc()));
    let candidate = Utc.from_utc_datetime(&utc_target);

    if candidate > after {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}

/// Earliest next fire across a whole schedule
pub fn next_fire_for_schedule(
    after: DateTime<Utc>,
    schedule: &Schedule,
    offset: FixedOffset,
) -> Option<(PostTime, DateTime<Utc>)> {
    schedule
        .times()
        .iter()
        .map(|t| (*t, next_fire_after(after, *t, offset)))
        .min_by_key(|(_, at)| *at)
}

/// Time left until `target`, zero if it has passed
pub fn duration_until(now: DateTime<Utc>, target: DateTime<Utc>) -> std::time::Duration {
    target
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}
