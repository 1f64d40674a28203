//! Invocation surface for a serving layer.
//!
//! [`PlanningService`] wraps a [`CatalogSource`] and an [`EngineConfig`].
//! Every call loads a fresh catalog and computes from scratch; nothing is
//! cached between calls.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument};

use crate::assignment::{assign_crew, AssignmentPlan, AssignmentRequest};
use crate::config::EngineConfig;
use crate::error::{PlanError, PlanResult};
use crate::ingest::CatalogSource;
use crate::models::{PoolKey, Role, StaffingConfig, TaskCatalog};
use crate::report::TaskRecord;
use crate::scenario::{
    run_baseline, run_fixed, run_fixed_roster, run_optimization, run_target_lateness,
    OptimizationParams, ScenarioResult, TargetLatenessParams,
};

/// Scenario names accepted by [`PlanningService::refresh`].
pub const SCENARIO_NAMES: [&str; 4] = ["baseline", "scenario1", "scenario2", "scenario3"];

/// A scenario with explicit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioRequest {
    Baseline,
    Fixed(StaffingConfig),
    /// Scenario 1 at each pool's roster headcount.
    FixedRoster,
    TargetLateness(TargetLatenessParams),
    Optimize(OptimizationParams),
}

/// One crew pool with its roster headcount and scheduled load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team: String,
    pub shift: String,
    pub role: Role,
    pub headcount: u32,
    pub task_count: usize,
}

/// Scheduling entry points over one catalog source.
#[derive(Debug, Clone)]
pub struct PlanningService<S> {
    source: S,
    config: EngineConfig,
}

impl<S: CatalogSource> PlanningService<S> {
    pub fn new(source: S, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Schedules under the current roster.
    pub fn compute_baseline(&self) -> PlanResult<ScenarioResult> {
        self.run_scenario(ScenarioRequest::Baseline)
    }

    /// Runs one scenario with explicit parameters.
    #[instrument(skip(self))]
    pub fn run_scenario(&self, request: ScenarioRequest) -> PlanResult<ScenarioResult> {
        let catalog = self.source.load()?;
        self.execute(&catalog, request)
    }

    /// Recomputes a named scenario with the configured defaults.
    ///
    /// Scenario 1 uses `fixed_staffing` when configured and otherwise each
    /// pool's own roster headcount.
    ///
    /// # Errors
    /// `UnknownScenario` for names outside [`SCENARIO_NAMES`].
    pub fn refresh(&self, name: &str) -> PlanResult<ScenarioResult> {
        let request = self.resolve(name)?;
        let catalog = self.source.load()?;
        self.execute(&catalog, request)
    }

    /// Task records of one team in a named scenario, in priority order.
    ///
    /// A `limit` of `None` or `Some(0)` returns every matching task.
    pub fn team_tasks(
        &self,
        scenario: &str,
        team: &str,
        shift: Option<&str>,
        limit: Option<usize>,
    ) -> PlanResult<Vec<TaskRecord>> {
        let result = self.refresh(scenario)?;
        let limit = limit.filter(|&n| n > 0).unwrap_or(usize::MAX);
        Ok(result
            .tasks
            .into_iter()
            .filter(|t| t.team == team && shift.map_or(true, |s| t.shift == s))
            .take(limit)
            .collect())
    }

    /// Every pool named by the roster or by a task, sorted by team, shift, role.
    pub fn all_teams(&self) -> PlanResult<Vec<TeamSummary>> {
        let catalog = self.source.load()?;
        let mut pools: BTreeMap<PoolKey, (u32, usize)> = BTreeMap::new();
        for entry in &catalog.plant().roster {
            pools.entry(entry.pool()).or_default().0 += entry.headcount;
        }
        for task in catalog.tasks() {
            pools.entry(PoolKey::for_task(task)).or_default().1 += 1;
        }
        Ok(pools
            .into_iter()
            .map(|(pool, (headcount, task_count))| TeamSummary {
                team: pool.team,
                shift: pool.shift,
                role: pool.role,
                headcount,
                task_count,
            })
            .collect())
    }

    /// Names the mechanics working each of a team's tasks on `date`.
    ///
    /// Assigns from the schedule of the scenario run itself, against the
    /// same catalog load.
    pub fn generate_assignments(
        &self,
        team: &str,
        scenario: &str,
        date: NaiveDate,
        present_mechanics: &[String],
    ) -> PlanResult<AssignmentPlan> {
        let request = self.resolve(scenario)?;
        let catalog = self.source.load()?;
        let result = self.execute(&catalog, request)?;
        let crew = AssignmentRequest::new(team, date)
            .with_mechanics(present_mechanics.iter().cloned());
        Ok(assign_crew(&result.schedule, &catalog, &crew))
    }

    fn resolve(&self, name: &str) -> PlanResult<ScenarioRequest> {
        let scenarios = &self.config.scenarios;
        Ok(match name {
            "baseline" => ScenarioRequest::Baseline,
            "scenario1" => scenarios
                .fixed_staffing
                .map_or(ScenarioRequest::FixedRoster, ScenarioRequest::Fixed),
            "scenario2" => ScenarioRequest::TargetLateness(scenarios.target),
            "scenario3" => ScenarioRequest::Optimize(scenarios.optimize),
            other => return Err(PlanError::UnknownScenario(other.to_string())),
        })
    }

    fn execute(
        &self,
        catalog: &TaskCatalog,
        request: ScenarioRequest,
    ) -> PlanResult<ScenarioResult> {
        let config = &self.config;
        let result = match request {
            ScenarioRequest::Baseline => run_baseline(catalog, config),
            ScenarioRequest::Fixed(staffing) => run_fixed(catalog, config, staffing),
            ScenarioRequest::FixedRoster => run_fixed_roster(catalog, config),
            ScenarioRequest::TargetLateness(params) => {
                run_target_lateness(catalog, config, &params)
            }
            ScenarioRequest::Optimize(params) => run_optimization(catalog, config, &params),
        }?;
        info!(
            scenario = %result.scenario,
            lateness = result.lateness_minutes,
            makespan = result.makespan_minutes,
            "scenario complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::models::{PlantSettings, RosterEntry, Task};
    use crate::scenario::tests::{line_catalog, start};
    use crate::scenario::StaffingBounds;

    fn rostered_catalog() -> TaskCatalog {
        let plant = PlantSettings::new(start())
            .with_roster(RosterEntry::new("M", "1st", Role::Mechanic, 3))
            .with_roster(RosterEntry::new("N", "1st", Role::Mechanic, 2))
            .with_roster(RosterEntry::new("QA", "1st", Role::Quality, 1));
        TaskCatalog::new(plant)
            .with_task(Task::new("A").with_duration(60).with_crew(2).on_team("M", "1st"))
            .with_task(Task::new("B").with_duration(30).with_crew(1).on_team("M", "1st"))
            .with_task(Task::new("C").with_duration(30).with_crew(2).on_team("N", "1st"))
            .with_task(
                Task::inspection("QI", "A")
                    .with_duration(15)
                    .on_team("QA", "1st"),
            )
    }

    /// Counts catalog loads.
    struct CountingSource {
        catalog: TaskCatalog,
        loads: Cell<usize>,
    }

    impl CatalogSource for CountingSource {
        fn load(&self) -> PlanResult<TaskCatalog> {
            self.loads.set(self.loads.get() + 1);
            Ok(self.catalog.clone())
        }
    }

    #[test]
    fn test_refresh_names() {
        crate::logging::init_test();
        let service = PlanningService::new(rostered_catalog(), EngineConfig::default());
        assert_eq!(service.refresh("baseline").unwrap().scenario, "baseline");

        let fixed = service.refresh("scenario1").unwrap();
        assert_eq!(fixed.scenario, "scenario1");
        assert_eq!(fixed.staffing, None);

        assert!(matches!(
            service.refresh("scenario9"),
            Err(PlanError::UnknownScenario(name)) if name == "scenario9"
        ));
    }

    #[test]
    fn test_refresh_uses_configured_defaults() {
        let mut config = EngineConfig::default();
        config.scenarios.fixed_staffing = Some(StaffingConfig::new(4, 1));
        config.scenarios.target = TargetLatenessParams {
            bounds: StaffingBounds::new((1, 10), (1, 2)),
            target_lateness: 0,
            tolerance: 0,
        };
        config.scenarios.optimize = OptimizationParams {
            bounds: StaffingBounds::new((2, 10), (1, 3)),
            max_iterations: 1,
        };
        let service = PlanningService::new(line_catalog(), config);

        assert_eq!(service.refresh("scenario1").unwrap().lateness_minutes, 60);
        assert_eq!(
            service.refresh("scenario2").unwrap().staffing,
            Some(StaffingConfig::new(8, 1))
        );
        let optimized = service.refresh("scenario3").unwrap();
        assert_eq!(optimized.iterations, 1);
        assert!(!optimized.converged);
    }

    #[test]
    fn test_team_tasks_filters_and_limits() {
        let service = PlanningService::new(rostered_catalog(), EngineConfig::default());
        let tasks = service.team_tasks("baseline", "M", Some("1st"), None).unwrap();
        let mut ids: Vec<&str> = tasks.iter().map(|t| t.task_id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["A", "B"]);

        let limited = service.team_tasks("baseline", "M", None, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
        let unlimited = service.team_tasks("baseline", "M", None, Some(0)).unwrap();
        assert_eq!(unlimited, tasks);
        assert!(service.team_tasks("baseline", "M", Some("2nd"), None).unwrap().is_empty());
    }

    #[test]
    fn test_all_teams() {
        let service = PlanningService::new(rostered_catalog(), EngineConfig::default());
        let teams = service.all_teams().unwrap();
        let rows: Vec<(&str, Role, u32, usize)> = teams
            .iter()
            .map(|t| (t.team.as_str(), t.role, t.headcount, t.task_count))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("M", Role::Mechanic, 3, 2),
                ("N", Role::Mechanic, 2, 1),
                ("QA", Role::Quality, 1, 1),
            ]
        );
    }

    #[test]
    fn test_generate_assignments() {
        let service = PlanningService::new(rostered_catalog(), EngineConfig::default());
        let present = vec!["amy".to_string(), "bob".to_string(), "cy".to_string()];
        let plan = service
            .generate_assignments("M", "baseline", start().date(), &present)
            .unwrap();
        assert!(plan.is_complete());
        assert_eq!(plan.assignments.len(), 2);
        let crewed: usize = plan.assignments.iter().map(|a| a.mechanics.len()).sum();
        assert_eq!(crewed, 3);
    }

    #[test]
    fn test_each_call_loads_the_catalog_once() {
        let source = CountingSource {
            catalog: rostered_catalog(),
            loads: Cell::new(0),
        };
        let service = PlanningService::new(source, EngineConfig::default());
        let present = vec!["amy".to_string(), "bob".to_string()];
        let plan = service
            .generate_assignments("N", "scenario1", start().date(), &present)
            .unwrap();
        assert_eq!(service.source.loads.get(), 1);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].mechanics, vec!["amy", "bob"]);

        service.refresh("scenario1").unwrap();
        assert_eq!(service.source.loads.get(), 2);
    }

    #[test]
    fn test_fresh_catalog_errors_surface() {
        let broken = rostered_catalog().with_task(Task::new("A"));
        let service = PlanningService::new(broken, EngineConfig::default());
        assert!(matches!(service.compute_baseline(), Err(PlanError::DataValidation(_))));
    }
}
