//! Committed crew intervals of one staffing pool.
//!
//! Intervals are half-open `[start, end)`; an interval ending at `t` frees
//! its crew for work starting at `t`.

use crate::models::TimeWindow;

/// Crew committed to one pool over time.
#[derive(Debug, Clone, Default)]
pub struct PoolTimeline {
    committed: Vec<(TimeWindow, u32)>,
}

impl PoolTimeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `crew` workers busy during `window`.
    pub fn commit(&mut self, window: TimeWindow, crew: u32) {
        if crew > 0 && window.duration() > 0 {
            self.committed.push((window, crew));
        }
    }

    /// Number of committed intervals.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Highest concurrent crew at any instant inside `window`.
    pub fn peak_usage(&self, window: &TimeWindow) -> u32 {
        // (time, delta); ends sort before starts at the same instant.
        let mut events: Vec<(i64, i64)> = Vec::new();
        for (interval, crew) in self.overlapping(window) {
            let crew = i64::from(*crew);
            events.push((interval.start.max(window.start), crew));
            events.push((interval.end.min(window.end), -crew));
        }
        events.sort_unstable();

        let mut load = 0i64;
        let mut peak = 0i64;
        for (_, delta) in events {
            load += delta;
            peak = peak.max(load);
        }
        u32::try_from(peak).unwrap_or(u32::MAX)
    }

    /// Checks whether `crew` more workers fit during `window` under `headcount`.
    ///
    /// Returns `None` if they fit, otherwise the earliest end among the
    /// intervals overlapping `window`. No start before that instant can fit
    /// either: every overlapping interval is still running there.
    pub fn conflict(&self, window: &TimeWindow, crew: u32, headcount: u32) -> Option<i64> {
        if window.duration() <= 0 || crew == 0 {
            return None;
        }
        if self.peak_usage(window) + crew <= headcount {
            return None;
        }
        self.overlapping(window).map(|(interval, _)| interval.end).min()
    }

    fn overlapping<'a>(
        &'a self,
        window: &'a TimeWindow,
    ) -> impl Iterator<Item = &'a (TimeWindow, u32)> + 'a {
        self.committed
            .iter()
            .filter(move |(interval, _)| interval.overlaps(window))
    }
}
