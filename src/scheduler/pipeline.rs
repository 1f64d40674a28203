//! One complete scheduling run.
//!
//! Catalog → constraint graph → critical path → priority list → allocation.
//! Every stage is built fresh from the catalog and owned by the run.

use tracing::{debug, error, info, instrument};

use crate::config::EngineConfig;
use crate::critical_path::{CriticalPathAnalyzer, CriticalPathMetrics};
use crate::dispatching::{PriorityListGenerator, PriorityOrder};
use crate::error::PlanResult;
use crate::models::{CapacityPlan, Schedule, TaskCatalog};
use crate::precedence::{build_constraints, ConstraintGraph};
use crate::validation::ensure_valid;

use super::{audit, ScheduleKpi, TimeAllocator};

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub schedule: Schedule,
    pub priority: PriorityOrder,
    pub graph: ConstraintGraph,
    pub metrics: CriticalPathMetrics,
    /// Signed lateness under the configured policy (minutes).
    pub lateness: i64,
    pub kpi: ScheduleKpi,
}

/// Validates `catalog` and runs the full pipeline under `capacity`.
///
/// # Errors
/// - `DataValidation` for malformed catalogs.
/// - `CyclicDependency` if the effective constraints contain a cycle.
/// - `InfeasibleSchedule` if a task cannot be staffed.
#[instrument(skip_all, fields(tasks = catalog.len()))]
pub fn run_pipeline(
    catalog: &TaskCatalog,
    capacity: &CapacityPlan,
    config: &EngineConfig,
) -> PlanResult<RunOutput> {
    ensure_valid(catalog)?;
    let output = run_validated(catalog, capacity, config)?;
    info!(
        makespan = output.schedule.makespan(),
        lateness = output.lateness,
        "schedule computed"
    );
    Ok(output)
}

/// Runs the pipeline on a catalog that already passed validation.
pub(crate) fn run_validated(
    catalog: &TaskCatalog,
    capacity: &CapacityPlan,
    config: &EngineConfig,
) -> PlanResult<RunOutput> {
    let delay = config.late_part_delay_minutes();
    let graph = build_constraints(catalog)?;
    let analyzer = CriticalPathAnalyzer::new(catalog, &graph, delay);
    let priority = PriorityListGenerator::default().generate(catalog, analyzer.metrics());
    let metrics = analyzer.into_metrics();

    let schedule = TimeAllocator::new(catalog, &graph, capacity)
        .with_late_part_delay(delay)
        .allocate(&priority)?;

    let violations = audit(&schedule, &graph, capacity, catalog);
    if !violations.is_empty() {
        error!(count = violations.len(), first = %violations[0].message, "schedule failed audit");
    }

    let target_makespan = config
        .delivery_horizon_minutes
        .unwrap_or_else(|| metrics.project_length());
    let lateness = config
        .lateness_policy
        .objective()
        .evaluate(&schedule, catalog, target_makespan);
    let kpi = ScheduleKpi::calculate(&schedule, catalog, capacity);
    debug!(
        critical = metrics.critical_tasks().len(),
        project_length = metrics.project_length(),
        makespan = schedule.makespan(),
        lateness,
        "run finished"
    );

    Ok(RunOutput {
        schedule,
        priority,
        graph,
        metrics,
        lateness,
        kpi,
    })
}
