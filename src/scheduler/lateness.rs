//! Lateness objectives.
//!
//! A staffing search compares schedules by one signed lateness figure in
//! minutes. Which figure is a policy choice: plants with due dates care
//! about the latest delivery, plants without them about the makespan
//! against a delivery horizon. Values `<= 0` count as on time.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::models::{Schedule, TaskCatalog};

/// Reduces a schedule to a signed lateness in minutes.
pub trait LatenessObjective: Send + Sync + Debug {
    /// Objective name.
    fn name(&self) -> &'static str;

    /// Evaluates `schedule`.
    ///
    /// `target_makespan` is the completion target used when lateness is
    /// measured against the makespan.
    fn evaluate(&self, schedule: &Schedule, catalog: &TaskCatalog, target_makespan: i64) -> i64;
}

/// Largest `end - due` over tasks with a due time (signed).
///
/// Falls back to makespan overrun when no task has a due time.
#[derive(Debug, Clone, Copy)]
pub struct MaxLateness;

impl LatenessObjective for MaxLateness {
    fn name(&self) -> &'static str {
        "max_lateness"
    }

    fn evaluate(&self, schedule: &Schedule, catalog: &TaskCatalog, target_makespan: i64) -> i64 {
        schedule
            .entries()
            .iter()
            .filter_map(|entry| {
                let task = catalog.task(&entry.task_id)?;
                catalog.due_minutes(task).map(|due| entry.end - due)
            })
            .max()
            .unwrap_or_else(|| MakespanOverrun.evaluate(schedule, catalog, target_makespan))
    }
}

/// [`MaxLateness`] clamped at zero.
#[derive(Debug, Clone, Copy)]
pub struct MaxTardiness;

impl LatenessObjective for MaxTardiness {
    fn name(&self) -> &'static str {
        "max_tardiness"
    }

    fn evaluate(&self, schedule: &Schedule, catalog: &TaskCatalog, target_makespan: i64) -> i64 {
        MaxLateness.evaluate(schedule, catalog, target_makespan).max(0)
    }
}

/// `makespan - target_makespan`.
#[derive(Debug, Clone, Copy)]
pub struct MakespanOverrun;

impl LatenessObjective for MakespanOverrun {
    fn name(&self) -> &'static str {
        "makespan_overrun"
    }

    fn evaluate(&self, schedule: &Schedule, _catalog: &TaskCatalog, target_makespan: i64) -> i64 {
        schedule.makespan() - target_makespan
    }
}

/// Configurable choice of [`LatenessObjective`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatenessPolicy {
    MaxLateness,
    #[default]
    MaxTardiness,
    MakespanOverrun,
}

impl LatenessPolicy {
    /// The objective implementing this policy.
    pub fn objective(self) -> &'static dyn LatenessObjective {
        match self {
            LatenessPolicy::MaxLateness => &MaxLateness,
            LatenessPolicy::MaxTardiness => &MaxTardiness,
            LatenessPolicy::MakespanOverrun => &MakespanOverrun,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantSettings, ProductLine, ScheduleEntry, Task};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn catalog() -> TaskCatalog {
        let plant = PlantSettings::new(start())
            .with_product_line(ProductLine::new("L1", start() + Duration::minutes(100)));
        TaskCatalog::new(plant)
            .with_task(Task::new("A").with_duration(60).with_product_line("L1"))
            .with_task(
                Task::new("B")
                    .with_duration(30)
                    .with_due(start() + Duration::minutes(50)),
            )
    }

    fn schedule(catalog: &TaskCatalog, a_start: i64, b_start: i64) -> Schedule {
        let mut s = Schedule::new();
        s.add_entry(ScheduleEntry::place(catalog.task("A").unwrap(), a_start));
        s.add_entry(ScheduleEntry::place(catalog.task("B").unwrap(), b_start));
        s
    }

    #[test]
    fn test_max_lateness_signed() {
        let catalog = catalog();
        // A ends 60 (due 100 → -40), B ends 30 (due 50 → -20)
        let early = schedule(&catalog, 0, 0);
        assert_eq!(MaxLateness.evaluate(&early, &catalog, 0), -20);
        assert_eq!(MaxTardiness.evaluate(&early, &catalog, 0), 0);

        // B ends 100 → 50 late
        let late = schedule(&catalog, 0, 70);
        assert_eq!(MaxLateness.evaluate(&late, &catalog, 0), 50);
        assert_eq!(MaxTardiness.evaluate(&late, &catalog, 0), 50);
    }

    #[test]
    fn test_no_due_dates_uses_makespan() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(60));
        let mut s = Schedule::new();
        s.add_entry(ScheduleEntry::place(catalog.task("A").unwrap(), 30));
        assert_eq!(MaxLateness.evaluate(&s, &catalog, 60), 30);
        assert_eq!(MaxLateness.evaluate(&s, &catalog, 120), -30);
        assert_eq!(MaxTardiness.evaluate(&s, &catalog, 120), 0);
    }

    #[test]
    fn test_makespan_overrun_ignores_due_dates() {
        let catalog = catalog();
        let s = schedule(&catalog, 0, 70);
        assert_eq!(MakespanOverrun.evaluate(&s, &catalog, 80), 20);
    }

    #[test]
    fn test_policy_dispatch() {
        assert_eq!(LatenessPolicy::default(), LatenessPolicy::MaxTardiness);
        assert_eq!(LatenessPolicy::MaxLateness.objective().name(), "max_lateness");
        assert_eq!(LatenessPolicy::MakespanOverrun.objective().name(), "makespan_overrun");

        let policy: LatenessPolicy = serde_json::from_str("\"makespan_overrun\"").unwrap();
        assert_eq!(policy, LatenessPolicy::MakespanOverrun);
    }
}
