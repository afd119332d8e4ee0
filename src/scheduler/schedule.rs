//! Posting schedule and its file store
//!
//! A schedule holds one or two daily posting times. It is stored as a plain
//! text file with one `HH:MM` per line so it can be edited by hand.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::{SchedulerError, SchedulerResult};

/// Maximum number of daily posting times
pub const MAX_POST_TIMES: usize = 2;

// ============================================================================
// Post Time
// ============================================================================

/// A time of day (hour and minute) at which a post is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostTime {
    hour: u8,
    minute: u8,
}

impl PostTime {
    /// Create a post time, validating the clock range
    pub fn new(hour: u32, minute: u32) -> SchedulerResult<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(SchedulerError::TimeOutOfRange { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Hour of the day (0-23)
    pub fn hour(&self) -> u32 {
        u32::from(self.hour)
    }

    /// Minute of the hour (0-59)
    pub fn minute(&self) -> u32 {
        u32::from(self.minute)
    }

    /// Convert to a chrono time
    pub fn to_naive_time(&self) -> chrono::NaiveTime {
        chrono::NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
            .unwrap_or(chrono::NaiveTime::MIN)
    }
}

impl fmt::Display for PostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for PostTime {
    type Err = SchedulerError;

    /// Parse `H:MM` or `HH:MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| SchedulerError::malformed(trimmed))?;

        let parse = |part: &str| -> SchedulerResult<u32> {
            if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(SchedulerError::malformed(trimmed));
            }
            part.parse().map_err(|_| SchedulerError::malformed(trimmed))
        };

        Self::new(parse(hour)?, parse(minute)?)
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Ordered list of one or two daily posting times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    times: Vec<PostTime>,
}

impl Schedule {
    /// Create a schedule; fails unless 1 or 2 times are given
    pub fn new(times: Vec<PostTime>) -> SchedulerResult<Self> {
        match times.len() {
            0 => Err(SchedulerError::MissingTimes),
            1..=MAX_POST_TIMES => Ok(Self { times }),
            count => Err(SchedulerError::InvalidTimeCount { count }),
        }
    }

    /// Parse command arguments such as `["09:00", "18:00"]`
    ///
    /// Every token is parsed before the count is checked, so a malformed
    /// token is reported even when there are too many of them.
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> SchedulerResult<Self> {
        if args.is_empty() {
            return Err(SchedulerError::MissingTimes);
        }

        let times = args
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                arg.parse::<PostTime>().map_err(|_| SchedulerError::malformed(arg))
            })
            .collect::<SchedulerResult<Vec<_>>>()?;

        Self::new(times)
    }

    /// Posting times in order
    pub fn times(&self) -> &[PostTime] {
        &self.times
    }

    /// Number of posting times
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false; a schedule holds at least one time
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Comma-joined `HH:MM` list
    pub fn display(&self) -> String {
        self.times
            .iter()
            .map(PostTime::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// File representation: one `HH:MM` per line
    pub fn to_file_contents(&self) -> String {
        self.times.iter().map(|t| format!("{t}\n")).collect()
    }
}

impl Default for Schedule {
    /// 09:00 and 18:00
    fn default() -> Self {
        Self {
            times: vec![
                PostTime { hour: 9, minute: 0 },
                PostTime { hour: 18, minute: 0 },
            ],
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

// ============================================================================
// Schedule Store
// ============================================================================

/// Text-file store for the [`Schedule`]
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the schedule file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the schedule, falling back to the default
    ///
    /// Invalid lines are skipped with a warning. When nothing valid remains
    /// the default schedule is written back so later loads are stable. An
    /// unreadable file is left untouched.
    pub fn load(&self) -> Schedule {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Schedule file missing, using default");
                return self.persist_default();
            }
            Err(e) => {
                let err = SchedulerError::SourceUnavailable {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                };
                tracing::error!(error = %err, "Using default schedule");
                return Schedule::default();
            }
        };

        let mut times = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<PostTime>() {
                Ok(time) => times.push(time),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    content = line,
                    error = %e,
                    "Skipping invalid schedule line"
                ),
            }
        }

        if times.len() > MAX_POST_TIMES {
            tracing::warn!(
                path = %self.path.display(),
                found = times.len(),
                "Schedule file has too many times, keeping the first two"
            );
            times.truncate(MAX_POST_TIMES);
        }

        match Schedule::new(times) {
            Ok(schedule) => schedule,
            Err(_) => {
                tracing::warn!(path = %self.path.display(), "No valid schedule lines, using default");
                self.persist_default()
            }
        }
    }

    /// Overwrite the file with `schedule`
    pub fn save(&self, schedule: &Schedule) -> SchedulerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SchedulerError::io_error("create_schedule_dir", e.to_string()))?;
        }

        std::fs::write(&self.path, schedule.to_file_contents())
            .map_err(|e| SchedulerError::io_error("save_schedule", e.to_string()))?;

        tracing::debug!(path = %self.path.display(), schedule = %schedule, "Schedule saved");
        Ok(())
    }

    fn persist_default(&self) -> Schedule {
        let schedule = Schedule::default();
        if let Err(e) = self.save(&schedule) {
            tracing::error!(error = %e, "Failed to persist default schedule");
        }
        schedule
    }
}

// ============================================================================
// Tests
// ============================================================================
