//! Posting schedule
//!
//! The schedule is one or two wall-clock times per day, interpreted in a
//! fixed UTC offset (Moscow time unless configured otherwise).
//!
//! # Modules
//!
//! - [`schedule`] - `PostTime`, `Schedule` and the text-file store
//! - [`trigger`] - next-fire arithmetic and the [`FireEvent`] type
//! - [`reconciler`] - one background fire task per posting time
//! - [`error`] - parse and persistence errors
//!
//! # Flow
//!
//! ```text
//!  schedule.txt ──load──▶ Schedule ──apply──▶ ScheduleReconciler
//!                                                   │
//!                                  ┌────────────────┼────────────────┐
//!                                  ▼                                 ▼
//!                           fire task 09:00                   fire task 18:00
//!                                  │                                 │
//!                                  └──────── FireEvent ──────────────┘
//!                                                   │
//!                                                   ▼
//!                                          controller queue
//! ```
//!
//! # Example
//!
//! ```
//! use stoik::scheduler::{PostTime, Schedule};
//!
//! let schedule = Schedule::parse_args(&["07:30", "21:00"]).unwrap();
//! assert_eq!(schedule.display(), "07:30, 21:00");
//! assert_eq!(schedule.times()[0], PostTime::new(7, 30).unwrap());
//! ```

pub mod error;
pub mod reconciler;
pub mod schedule;
pub mod trigger;

pub use error::{SchedulerError, SchedulerResult};
pub use reconciler::{ReconcilerState, ScheduleReconciler};
pub use schedule::{PostTime, Schedule, ScheduleStore, MAX_POST_TIMES};
pub use trigger::{duration_until, next_fire_after, next_fire_for_schedule, FireEvent};
