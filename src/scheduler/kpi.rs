//! Schedule quality metrics (KPIs).
//!
//! Computes standard scheduling performance indicators from a
//! completed schedule and its catalog.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Total Tardiness | Sum of max(0, completion - due) |
//! | Maximum Tardiness | Largest single delay |
//! | On-Time Rate | Fraction of due tasks meeting their due time |
//! | Avg Utilization | Mean pool busyness |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::{CapacityPlan, PoolKey, Schedule, TaskCatalog};

/// Schedule performance indicators.
///
/// All time values are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan_minutes: i64,
    /// Sum of tardiness across tasks with a due time.
    pub total_tardiness_minutes: i64,
    /// Maximum tardiness of any single task.
    pub max_tardiness_minutes: i64,
    /// Fraction of due tasks completing on time (1.0 when none are due).
    pub on_time_rate: f64,
    /// Average pool utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-pool utilization, keyed by `team/shift/role`.
    pub utilization_by_pool: BTreeMap<String, f64>,
}

impl ScheduleKpi {
    /// Computes KPIs for `schedule` under `capacity`.
    pub fn calculate(schedule: &Schedule, catalog: &TaskCatalog, capacity: &CapacityPlan) -> Self {
        let mut total_tardiness = 0i64;
        let mut max_tardiness = 0i64;
        let mut due_count = 0usize;
        let mut on_time = 0usize;

        for entry in schedule.entries() {
            let Some(due) = catalog
                .task(&entry.task_id)
                .and_then(|task| catalog.due_minutes(task))
            else {
                continue;
            };
            due_count += 1;
            let tardiness = (entry.end - due).max(0);
            if tardiness == 0 {
                on_time += 1;
            }
            total_tardiness += tardiness;
            max_tardiness = max_tardiness.max(tardiness);
        }

        let pools: BTreeSet<PoolKey> = schedule
            .entries()
            .iter()
            .filter(|e| e.mechanics_required > 0)
            .map(|e| e.pool())
            .collect();
        let utilization_by_pool: BTreeMap<String, f64> = pools
            .iter()
            .filter_map(|pool| {
                schedule
                    .pool_utilization(pool, capacity.headcount(pool))
                    .map(|u| (pool.to_string(), u))
            })
            .collect();

        let avg_utilization = if utilization_by_pool.is_empty() {
            0.0
        } else {
            utilization_by_pool.values().sum::<f64>() / utilization_by_pool.len() as f64
        };
        let on_time_rate = if due_count == 0 {
            1.0
        } else {
            on_time as f64 / due_count as f64
        };

        Self {
            makespan_minutes: schedule.makespan(),
            total_tardiness_minutes: total_tardiness,
            max_tardiness_minutes: max_tardiness,
            on_time_rate,
            avg_utilization,
            utilization_by_pool,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_tardiness: i64, min_utilization: f64) -> bool {
        self.max_tardiness_minutes <= max_tardiness && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantSettings, ScheduleEntry, StaffingConfig, Task};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn fixture() -> (TaskCatalog, Schedule) {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(
                Task::new("A")
                    .with_duration(60)
                    .with_crew(2)
                    .on_team("M", "1st")
                    .with_due(start() + Duration::minutes(50)),
            )
            .with_task(
                Task::new("B")
                    .with_duration(40)
                    .on_team("M", "1st")
                    .with_due(start() + Duration::minutes(200)),
            )
            .with_task(Task::new("C").with_duration(20).with_crew(0));
        let mut schedule = Schedule::new();
        schedule.add_entry(ScheduleEntry::place(catalog.task("A").unwrap(), 0));
        schedule.add_entry(ScheduleEntry::place(catalog.task("B").unwrap(), 60));
        schedule.add_entry(ScheduleEntry::place(catalog.task("C").unwrap(), 0));
        (catalog, schedule)
    }

    #[test]
    fn test_tardiness_and_on_time() {
        let (catalog, schedule) = fixture();
        let capacity = CapacityPlan::uniform(StaffingConfig::new(2, 1));
        let kpi = ScheduleKpi::calculate(&schedule, &catalog, &capacity);
        assert_eq!(kpi.makespan_minutes, 100);
        assert_eq!(kpi.max_tardiness_minutes, 10);
        assert_eq!(kpi.total_tardiness_minutes, 10);
        assert!((kpi.on_time_rate - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_pool_utilization() {
        let (catalog, schedule) = fixture();
        let capacity = CapacityPlan::uniform(StaffingConfig::new(2, 1));
        let kpi = ScheduleKpi::calculate(&schedule, &catalog, &capacity);
        // (60*2 + 40*1) / (100 * 2)
        let util = kpi.utilization_by_pool["M/1st/mechanic"];
        assert!((util - 0.8).abs() < 1e-10);
        assert_eq!(kpi.utilization_by_pool.len(), 1);
        assert!(kpi.meets_thresholds(10, 0.5));
        assert!(!kpi.meets_thresholds(5, 0.5));
    }

    #[test]
    fn test_empty_schedule() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()));
        let capacity = CapacityPlan::uniform(StaffingConfig::new(1, 1));
        let kpi = ScheduleKpi::calculate(&Schedule::new(), &catalog, &capacity);
        assert_eq!(kpi.makespan_minutes, 0);
        assert!((kpi.on_time_rate - 1.0).abs() < 1e-10);
        assert!(kpi.avg_utilization.abs() < 1e-10);
    }
}
