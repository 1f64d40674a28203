//! Single-run scenarios: the roster baseline and a fixed headcount.

use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::error::{PlanError, PlanResult};
use crate::models::{CapacityPlan, StaffingConfig, TaskCatalog};
use crate::scheduler::run_pipeline;

use super::ScenarioResult;

/// Schedules the catalog under the plant's current roster.
pub fn run_baseline(catalog: &TaskCatalog, config: &EngineConfig) -> PlanResult<ScenarioResult> {
    run_roster(catalog, config, "baseline")
}

/// Scenario 1 without an explicit staffing: every pool keeps its own
/// roster headcount.
pub fn run_fixed_roster(
    catalog: &TaskCatalog,
    config: &EngineConfig,
) -> PlanResult<ScenarioResult> {
    run_roster(catalog, config, "scenario1")
}

#[instrument(skip_all, fields(tasks = catalog.len(), %scenario))]
fn run_roster(
    catalog: &TaskCatalog,
    config: &EngineConfig,
    scenario: &str,
) -> PlanResult<ScenarioResult> {
    config.validate()?;
    let capacity = CapacityPlan::from_roster(&catalog.plant().roster);
    let run = run_pipeline(catalog, &capacity, config)?;
    info!(
        makespan = run.schedule.makespan(),
        lateness = run.lateness,
        "roster headcount scheduled"
    );
    Ok(ScenarioResult::from_run(scenario, None, catalog, &run))
}

/// Scenario 1: schedules the catalog under one staffing configuration.
///
/// # Errors
/// `InfeasibleSchedule` is returned as is: with a single configuration
/// there is nothing to fall back to.
#[instrument(skip_all, fields(tasks = catalog.len(), %staffing))]
pub fn run_fixed(
    catalog: &TaskCatalog,
    config: &EngineConfig,
    staffing: StaffingConfig,
) -> PlanResult<ScenarioResult> {
    config.validate()?;
    let limits = config.staffing_limits;
    if staffing.mechanics > limits.max_mechanics || staffing.quality > limits.max_quality {
        return Err(PlanError::InvalidBounds(format!(
            "staffing {staffing} exceeds engine limit {}M/{}Q",
            limits.max_mechanics, limits.max_quality
        )));
    }
    let run = run_pipeline(catalog, &CapacityPlan::uniform(staffing), config)?;
    info!(
        makespan = run.schedule.makespan(),
        lateness = run.lateness,
        "fixed staffing scheduled"
    );
    Ok(ScenarioResult::from_run("scenario1", Some(staffing), catalog, &run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantSettings, Role, RosterEntry, Task};
    use crate::scenario::tests::{line_catalog, start};

    #[test]
    fn test_fixed_staffing() {
        let staffing = StaffingConfig::new(4, 1);
        let result = run_fixed(&line_catalog(), &EngineConfig::default(), staffing).unwrap();
        assert_eq!(result.scenario, "scenario1");
        assert_eq!(result.staffing, Some(StaffingConfig::new(4, 1)));
        assert_eq!(result.lateness_minutes, 60);
        assert_eq!(result.makespan_minutes, 150);
        assert_eq!((result.iterations, result.converged), (1, true));
        assert_eq!(result.tasks.len(), 5);
    }

    #[test]
    fn test_fixed_infeasible_is_fatal() {
        let staffing = StaffingConfig::new(1, 1);
        let err = run_fixed(&line_catalog(), &EngineConfig::default(), staffing).unwrap_err();
        assert!(matches!(err, PlanError::InfeasibleSchedule { .. }));
    }

    #[test]
    fn test_fixed_over_limit() {
        let staffing = StaffingConfig::new(501, 1);
        let err = run_fixed(&line_catalog(), &EngineConfig::default(), staffing).unwrap_err();
        assert!(matches!(err, PlanError::InvalidBounds(_)));
    }

    /// Team M: one mechanic for two jobs. Team N: three mechanics, one job.
    fn uneven_roster() -> TaskCatalog {
        let plant = PlantSettings::new(start())
            .with_roster(RosterEntry::new("M", "1st", Role::Mechanic, 1))
            .with_roster(RosterEntry::new("N", "1st", Role::Mechanic, 3));
        TaskCatalog::new(plant)
            .with_task(Task::new("A").with_duration(60).on_team("M", "1st"))
            .with_task(Task::new("B").with_duration(60).on_team("M", "1st"))
            .with_task(Task::new("C").with_duration(60).on_team("N", "1st"))
    }

    #[test]
    fn test_baseline_uses_roster() {
        let result = run_baseline(&uneven_roster(), &EngineConfig::default()).unwrap();
        assert_eq!(result.scenario, "baseline");
        assert_eq!(result.staffing, None);
        // Team M has one mechanic for two jobs; team N works in parallel.
        assert_eq!(result.makespan_minutes, 120);
    }

    #[test]
    fn test_fixed_roster_keeps_per_team_headcount() {
        let catalog = uneven_roster();
        let result = run_fixed_roster(&catalog, &EngineConfig::default()).unwrap();
        assert_eq!(result.scenario, "scenario1");
        assert_eq!(result.staffing, None);
        // Team M keeps its single mechanic; lending it team N's three would
        // finish both jobs in parallel.
        assert_eq!(result.makespan_minutes, 120);

        let uniform = run_fixed(&catalog, &EngineConfig::default(), StaffingConfig::new(3, 0));
        assert_eq!(uniform.unwrap().makespan_minutes, 60);
    }
}
