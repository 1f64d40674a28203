//! Schedule (solution) model.
//!
//! A schedule assigns every task a concrete `[start, end)` interval in
//! scheduling minutes. Entries carry denormalized copies of the task
//! attributes downstream consumers need.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{PoolKey, Task};

/// A placed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Task identifier.
    pub task_id: String,
    /// Start time (minutes).
    pub start: i64,
    /// End time (minutes).
    pub end: i64,
    pub team: String,
    pub shift: String,
    pub product_line: String,
    /// Duration (minutes).
    pub duration: i64,
    /// Crew size.
    pub mechanics_required: u32,
    pub is_quality: bool,
}

impl ScheduleEntry {
    /// Places `task` at `start`.
    pub fn place(task: &Task, start: i64) -> Self {
        Self {
            task_id: task.task_id.clone(),
            start,
            end: start + task.duration,
            team: task.team.clone(),
            shift: task.shift.clone(),
            product_line: task.product_line.clone(),
            duration: task.duration,
            mechanics_required: task.mechanics_required,
            is_quality: task.is_quality,
        }
    }

    /// Pool this entry consumed.
    pub fn pool(&self) -> PoolKey {
        let role = if self.is_quality {
            super::Role::Quality
        } else {
            super::Role::Mechanic
        };
        PoolKey::new(self.team.clone(), self.shift.clone(), role)
    }
}

/// A complete schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// A constraint violation found by auditing a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related task or pool.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Successor placed against a precedence relationship.
    PrecedenceViolation,
    /// Concurrent crew above pool headcount.
    CapacityExceeded,
    /// Task placed outside its shift window.
    OutsideShift,
    /// Task in the catalog without an entry.
    Unscheduled,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Replaces a previous entry for the same task.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        match self.index.get(&entry.task_id) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.task_id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Entries in placement order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Entry of a task.
    pub fn entry(&self, task_id: &str) -> Option<&ScheduleEntry> {
        self.index.get(task_id).map(|&i| &self.entries[i])
    }

    /// Number of placed tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest end across all entries (minutes).
    pub fn makespan(&self) -> i64 {
        self.entries.iter().map(|e| e.end).max().unwrap_or(0)
    }

    /// Entries that consumed the given pool.
    pub fn entries_for_pool(&self, pool: &PoolKey) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.mechanics_required > 0 && &e.pool() == pool)
            .collect()
    }

    /// Busy crew-minutes divided by `headcount × makespan`.
    ///
    /// Returns `None` for an empty schedule or zero headcount.
    pub fn pool_utilization(&self, pool: &PoolKey, headcount: u32) -> Option<f64> {
        let horizon = self.makespan();
        if horizon <= 0 || headcount == 0 {
            return None;
        }
        let busy: i64 = self
            .entries_for_pool(pool)
            .iter()
            .map(|e| e.duration * i64::from(e.mechanics_required))
            .sum();
        Some(busy as f64 / (horizon as f64 * f64::from(headcount)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_entry(ScheduleEntry::place(
            &Task::new("A").with_duration(60).with_crew(2).on_team("M", "1st"),
            0,
        ));
        s.add_entry(ScheduleEntry::place(
            &Task::new("B").with_duration(30).with_crew(1).on_team("M", "1st"),
            60,
        ));
        s.add_entry(ScheduleEntry::place(
            &Task::inspection("Q", "B").with_duration(20).on_team("QA", "1st"),
            90,
        ));
        s
    }

    #[test]
    fn test_makespan() {
        assert_eq!(sample_schedule().makespan(), 110);
        assert_eq!(Schedule::new().makespan(), 0);
    }

    #[test]
    fn test_entry_lookup() {
        let s = sample_schedule();
        let b = s.entry("B").unwrap();
        assert_eq!((b.start, b.end), (60, 90));
        assert!(s.entry("Z").is_none());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_add_entry_replaces() {
        let mut s = sample_schedule();
        s.add_entry(ScheduleEntry::place(&Task::new("A").with_duration(60), 10));
        assert_eq!(s.len(), 3);
        assert_eq!(s.entry("A").unwrap().start, 10);
    }

    #[test]
    fn test_pool_entries_and_utilization() {
        let s = sample_schedule();
        let mech = PoolKey::new("M", "1st", Role::Mechanic);
        assert_eq!(s.entries_for_pool(&mech).len(), 2);
        // (60*2 + 30*1) / (110 * 2)
        let util = s.pool_utilization(&mech, 2).unwrap();
        assert!((util - 150.0 / 220.0).abs() < 1e-10);
        assert!(s.pool_utilization(&mech, 0).is_none());

        let qa = PoolKey::new("QA", "1st", Role::Quality);
        assert_eq!(s.entries_for_pool(&qa).len(), 1);
    }
}
