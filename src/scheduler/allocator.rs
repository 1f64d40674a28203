//! Resource-constrained time allocation.
//!
//! # Algorithm
//!
//! Serial list scheduling over the priority list:
//! 1. Reject staffing under which some task's crew exceeds its pool.
//! 2. Keep a ready set of tasks whose predecessors are all placed,
//!    ordered by priority rank.
//! 3. Take the highest-ranked ready task. Its lower bound is the latest of
//!    its release time and the bounds its placed predecessors impose.
//! 4. Scan forward from the bound: align to the shift window, then check
//!    pool capacity; on conflict jump to the earliest release among the
//!    overlapping commitments and repeat.
//! 5. Commit the interval and release its successors.
//!
//! # Complexity
//! O(n · k · m) where n=tasks, k=capacity jumps per task, m=commitments per pool.
//!
//! # Reference
//! Kolisch (1996), "Serial and parallel resource-constrained project
//! scheduling methods revisited"

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::dispatching::PriorityOrder;
use crate::error::{PlanError, PlanResult};
use crate::models::{
    CapacityPlan, PoolKey, Schedule, ScheduleEntry, Task, TaskCatalog, TimeWindow,
};
use crate::precedence::ConstraintGraph;
use crate::validation::{ValidationError, ValidationErrorKind};

use super::PoolTimeline;

/// Places every task of one run under one capacity plan.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use crew_schedule::critical_path::CriticalPathAnalyzer;
/// use crew_schedule::dispatching::PriorityListGenerator;
/// use crew_schedule::models::{
///     CapacityPlan, PlantSettings, Precedence, StaffingConfig, Task, TaskCatalog,
/// };
/// use crew_schedule::precedence::build_constraints;
/// use crew_schedule::scheduler::TimeAllocator;
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let catalog = TaskCatalog::new(PlantSettings::new(start))
///     .with_task(Task::new("A").with_duration(60).with_crew(2))
///     .with_task(Task::new("B").with_duration(30).with_crew(2))
///     .with_precedence(Precedence::finish_to_start("A", "B"));
/// let graph = build_constraints(&catalog).unwrap();
/// let analyzer = CriticalPathAnalyzer::new(&catalog, &graph, 0);
/// let order = PriorityListGenerator::default().generate(&catalog, analyzer.metrics());
///
/// let capacity = CapacityPlan::uniform(StaffingConfig::new(2, 1));
/// let schedule = TimeAllocator::new(&catalog, &graph, &capacity)
///     .allocate(&order)
///     .unwrap();
/// assert_eq!(schedule.entry("B").unwrap().start, 60);
/// ```
#[derive(Debug, Clone)]
pub struct TimeAllocator<'a> {
    catalog: &'a TaskCatalog,
    graph: &'a ConstraintGraph,
    capacity: &'a CapacityPlan,
    late_part_delay: i64,
}

impl<'a> TimeAllocator<'a> {
    /// Creates an allocator.
    pub fn new(
        catalog: &'a TaskCatalog,
        graph: &'a ConstraintGraph,
        capacity: &'a CapacityPlan,
    ) -> Self {
        Self {
            catalog,
            graph,
            capacity,
            late_part_delay: 0,
        }
    }

    /// Extra wait (minutes) after a late part's on-dock time.
    pub fn with_late_part_delay(mut self, minutes: i64) -> Self {
        self.late_part_delay = minutes;
        self
    }

    /// Assigns start and end times to every task.
    ///
    /// # Errors
    /// - `InfeasibleSchedule` if a task needs more crew than its pool has
    ///   (first such task in priority order).
    /// - `DataValidation` if a crewed task cannot fit its shift window.
    pub fn allocate(&self, priority: &PriorityOrder) -> PlanResult<Schedule> {
        self.check_crew_fits(priority)?;

        let tasks = self.catalog.tasks();
        let n = tasks.len();
        let epoch = self.catalog.epoch_offset();

        let mut waiting: Vec<usize> = (0..n).map(|i| self.graph.predecessors(i).len()).collect();
        let mut placed: Vec<Option<TimeWindow>> = vec![None; n];
        let mut timelines: HashMap<PoolKey, PoolTimeline> = HashMap::new();
        let mut schedule = Schedule::new();

        let mut ready: BTreeSet<(usize, usize)> = priority
            .iter()
            .filter(|&i| waiting[i] == 0)
            .map(|i| (priority.rank(i), i))
            .collect();

        while let Some((_, i)) = ready.pop_first() {
            let task = &tasks[i];
            let lower = self.lower_bound(i, task, &placed);
            let start = if task.needs_crew() {
                let pool = PoolKey::for_task(task);
                let headcount = self.capacity.headcount(&pool);
                let timeline = timelines.entry(pool).or_default();
                let start = self.scan(task, lower, epoch, timeline, headcount)?;
                let window = TimeWindow::new(start, start + task.duration);
                timeline.commit(window, task.mechanics_required);
                start
            } else {
                lower
            };

            trace!(task = %task.task_id, lower, start, "placed");
            placed[i] = Some(TimeWindow::new(start, start + task.duration));
            schedule.add_entry(ScheduleEntry::place(task, start));

            for edge in self.graph.successors(i) {
                waiting[edge.task] -= 1;
                if waiting[edge.task] == 0 {
                    ready.insert((priority.rank(edge.task), edge.task));
                }
            }
        }

        Ok(schedule)
    }

    fn check_crew_fits(&self, priority: &PriorityOrder) -> PlanResult<()> {
        let tasks = self.catalog.tasks();
        for i in priority.iter() {
            let task = &tasks[i];
            if !task.needs_crew() {
                continue;
            }
            let pool = PoolKey::for_task(task);
            let available = self.capacity.headcount(&pool);
            if task.mechanics_required > available {
                return Err(PlanError::InfeasibleSchedule {
                    task_id: task.task_id.clone(),
                    pool,
                    required: task.mechanics_required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Earliest start allowed by release time and placed predecessors.
    fn lower_bound(&self, i: usize, task: &Task, placed: &[Option<TimeWindow>]) -> i64 {
        let mut bound = self
            .catalog
            .release_minutes(task, self.late_part_delay)
            .max(0);
        for edge in self.graph.predecessors(i) {
            if let Some(pred) = placed[edge.task] {
                bound = bound.max(edge.relationship.successor_start_bound(
                    pred.start,
                    pred.end,
                    task.duration,
                ));
            }
        }
        bound
    }

    /// First start `>= lower` inside the shift window with free crew.
    fn scan(
        &self,
        task: &Task,
        lower: i64,
        epoch: i64,
        timeline: &PoolTimeline,
        headcount: u32,
    ) -> PlanResult<i64> {
        let calendar = self.catalog.shift_calendar(&task.shift);
        let mut start = lower;
        loop {
            if let Some(calendar) = calendar {
                start = calendar
                    .next_fit(start, task.duration, epoch)
                    .ok_or_else(|| {
                        PlanError::DataValidation(vec![ValidationError::new(
                            ValidationErrorKind::ExceedsShiftWindow,
                            format!(
                                "Task '{}' lasts {} min but shift '{}' is open {} min",
                                task.task_id,
                                task.duration,
                                task.shift,
                                calendar.window_length()
                            ),
                        )])
                    })?;
            }
            let window = TimeWindow::new(start, start + task.duration);
            match timeline.conflict(&window, task.mechanics_required, headcount) {
                None => return Ok(start),
                Some(release) => start = release,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical_path::CriticalPathAnalyzer;
    use crate::dispatching::PriorityListGenerator;
    use crate::models::{
        PlantSettings, Precedence, Relationship, Role, RosterEntry, ShiftCalendar,
        StaffingConfig, TaskType,
    };
    use crate::precedence::build_constraints;
    use crate::scheduler::audit;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    fn run(catalog: &TaskCatalog, capacity: &CapacityPlan, delay: i64) -> PlanResult<Schedule> {
        let graph = build_constraints(catalog)?;
        let analyzer = CriticalPathAnalyzer::new(catalog, &graph, delay);
        let order = PriorityListGenerator::default().generate(catalog, analyzer.metrics());
        let schedule = TimeAllocator::new(catalog, &graph, capacity)
            .with_late_part_delay(delay)
            .allocate(&order)?;
        assert!(audit(&schedule, &graph, capacity, catalog).is_empty());
        Ok(schedule)
    }

    fn span(schedule: &Schedule, id: &str) -> (i64, i64) {
        let e = schedule.entry(id).unwrap();
        (e.start, e.end)
    }

    #[test]
    fn test_chain_without_contention() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(60))
            .with_task(Task::new("B").with_duration(30))
            .with_precedence(Precedence::finish_to_start("A", "B"));
        let s = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(5, 1)), 0).unwrap();
        assert_eq!(span(&s, "A"), (0, 60));
        assert_eq!(span(&s, "B"), (60, 90));
    }

    #[test]
    fn test_capacity_serializes_parallel_work() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(60).with_crew(2))
            .with_task(Task::new("B").with_duration(60).with_crew(2))
            .with_task(Task::new("C").with_duration(60).with_crew(1));

        let tight = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(3, 1)), 0).unwrap();
        // A first (ID), C fits alongside it, B waits for A.
        assert_eq!(span(&tight, "A"), (0, 60));
        assert_eq!(span(&tight, "B"), (60, 120));
        assert_eq!(span(&tight, "C"), (0, 60));

        let loose = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(5, 1)), 0).unwrap();
        assert_eq!(loose.makespan(), 60);
    }

    #[test]
    fn test_quality_pool_is_separate() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(60))
            .with_task(Task::new("Q").with_duration(60).with_quality(true));
        let s = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(1, 1)), 0).unwrap();
        assert_eq!(span(&s, "A").0, 0);
        assert_eq!(span(&s, "Q").0, 0);
    }

    #[test]
    fn test_finish_to_finish_and_start_to_start() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(100))
            .with_task(Task::new("B").with_duration(30))
            .with_task(Task::new("C").with_duration(20))
            .with_precedence(Precedence::new("A", "B", Relationship::FinishToFinish))
            .with_precedence(Precedence::new("A", "C", Relationship::StartToStart));
        let s = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(5, 1)), 0).unwrap();
        assert_eq!(span(&s, "B"), (70, 100));
        assert_eq!(span(&s, "C"), (0, 20));
    }

    #[test]
    fn test_shift_window_respected() {
        // Epoch 06:00, shift 06:00-14:30 (510 min).
        let plant =
            PlantSettings::new(start()).with_shift(ShiftCalendar::new("1st", (6, 0), (14, 30)));
        let catalog = TaskCatalog::new(plant)
            .with_task(Task::new("A").with_duration(480).on_team("M", "1st"))
            .with_task(Task::new("B").with_duration(60).on_team("M", "1st"))
            .with_precedence(Precedence::finish_to_start("A", "B"));
        let s = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(1, 1)), 0).unwrap();
        assert_eq!(span(&s, "A"), (0, 480));
        // 14:00 + 60 passes 14:30 → next morning.
        assert_eq!(span(&s, "B"), (1440, 1500));
    }

    #[test]
    fn test_release_and_late_part_delay() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(
                Task::new("LP")
                    .with_type(TaskType::LatePart)
                    .with_duration(0)
                    .with_crew(0)
                    .with_on_dock(start() + Duration::minutes(120))
                    .attached_to("A"),
            )
            .with_task(Task::new("A").with_duration(30));
        let s = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(1, 1)), 1440).unwrap();
        assert_eq!(span(&s, "LP"), (1560, 1560));
        assert_eq!(span(&s, "A"), (1560, 1590));
    }

    #[test]
    fn test_crew_exceeds_pool_is_infeasible() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(30).with_crew(4).on_team("M", "1st"));
        let err = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(3, 1)), 0).unwrap_err();
        match err {
            PlanError::InfeasibleSchedule {
                task_id,
                required,
                available,
                ..
            } => {
                assert_eq!(task_id, "A");
                assert_eq!((required, available), (4, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_roster_missing_pool_is_infeasible() {
        let plant = PlantSettings::new(start())
            .with_roster(RosterEntry::new("M", "1st", Role::Mechanic, 2));
        let catalog = TaskCatalog::new(plant.clone())
            .with_task(Task::new("A").with_duration(30).on_team("M", "1st"))
            .with_task(Task::new("B").with_duration(30).on_team("Other", "1st"));
        let capacity = CapacityPlan::from_roster(&plant.roster);
        assert!(matches!(
            run(&catalog, &capacity, 0),
            Err(PlanError::InfeasibleSchedule { .. })
        ));
    }

    #[test]
    fn test_crewless_task_ignores_capacity() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(60).with_crew(1))
            .with_task(Task::new("SHIP").with_duration(60).with_crew(0));
        let s = run(&catalog, &CapacityPlan::uniform(StaffingConfig::new(1, 0)), 0).unwrap();
        assert_eq!(span(&s, "SHIP").0, 0);
    }

    #[test]
    fn test_deterministic() {
        let catalog = TaskCatalog::new(PlantSettings::new(start()))
            .with_task(Task::new("A").with_duration(45).with_crew(2))
            .with_task(Task::new("B").with_duration(30).with_crew(1))
            .with_task(Task::new("C").with_duration(60).with_crew(2))
            .with_task(Task::new("D").with_duration(15).with_crew(1))
            .with_precedence(Precedence::finish_to_start("A", "D"))
            .with_precedence(Precedence::new("B", "C", Relationship::FinishToFinish));
        let capacity = CapacityPlan::uniform(StaffingConfig::new(2, 1));
        let first = run(&catalog, &capacity, 0).unwrap();
        let second = run(&catalog, &capacity, 0).unwrap();
        assert_eq!(first, second);
    }
}
