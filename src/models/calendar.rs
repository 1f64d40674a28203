//! Shift calendars.
//!
//! A shift works a fixed daily window. Windows are expressed in minutes of
//! the day and may wrap past midnight (e.g. a third shift from 23:00 to
//! 06:30). Work that needs a crew is not split across window occurrences.
//!
//! # Time Model
//! Scheduling times are minutes relative to the horizon start. The horizon
//! start's own time of day (`epoch_offset`) anchors the daily pattern.

use serde::{Deserialize, Serialize};

/// Minutes per day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A half-open time interval `[start, end)` in scheduling minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: i64,
    /// Interval end (exclusive).
    pub end: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Length of the window (minutes).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether two windows overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Daily working window of one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalendar {
    /// Shift name as used on tasks.
    pub shift: String,
    /// Window start, minutes after midnight.
    pub start_minute: u32,
    /// Window end, minutes after midnight. `<= start_minute` wraps midnight.
    pub end_minute: u32,
}

impl ShiftCalendar {
    /// Creates a shift window from `HH`/`MM` pairs.
    pub fn new(shift: impl Into<String>, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            shift: shift.into(),
            start_minute: start.0 * 60 + start.1,
            end_minute: end.0 * 60 + end.1,
        }
    }

    /// Length of one window occurrence (minutes).
    pub fn window_length(&self) -> i64 {
        let start = i64::from(self.start_minute);
        let end = i64::from(self.end_minute);
        if end > start {
            end - start
        } else {
            MINUTES_PER_DAY - start + end
        }
    }

    /// Earliest start `>= from` such that `[start, start + duration)` lies
    /// inside one window occurrence.
    ///
    /// `epoch_offset` is the minute of day at scheduling time 0.
    /// Returns `None` when `duration` exceeds the window length.
    pub fn next_fit(&self, from: i64, duration: i64, epoch_offset: i64) -> Option<i64> {
        let length = self.window_length();
        if duration > length {
            return None;
        }
        let window_start = i64::from(self.start_minute) - epoch_offset;
        // Occurrence k opens at window_start + k * day; take the latest one
        // opening at or before `from`.
        let k = (from - window_start).div_euclid(MINUTES_PER_DAY);
        let open = window_start + k * MINUTES_PER_DAY;
        if from + duration <= open + length {
            Some(from)
        } else {
            Some(open + MINUTES_PER_DAY)
        }
    }

    /// Whether `[start, start + duration)` lies inside one window occurrence.
    pub fn contains(&self, start: i64, duration: i64, epoch_offset: i64) -> bool {
        self.next_fit(start, duration, epoch_offset) == Some(start)
    }
}
