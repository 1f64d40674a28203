//! Staffing scenario searches.
//!
//! Each search runs the full scheduling pipeline once per staffing trial.
//! Trials share only the read-only catalog and configuration; every trial
//! builds its own constraint graph, critical path and allocator state, so
//! trials run in parallel batches and are joined before any selection.
//!
//! | Scenario | Entry point | Search |
//! |----------|-------------|--------|
//! | Baseline | [`run_baseline`] | none, roster headcount |
//! | 1 | [`run_fixed`], [`run_fixed_roster`] | none, one staffing or the roster |
//! | 2 | [`run_target_lateness`] | upward sweep by total headcount |
//! | 3 | [`run_optimization`] | pattern search or exhaustive, bounded by iterations |
//!
//! Infeasible trials are never candidates. A search where every trial is
//! infeasible fails with `NoFeasibleStaffing`; a search that runs out of
//! bounds or budget still returns its best answer, flagged.
//!
//! # References
//! - Hooke & Jeeves (1961), "Direct Search Solution of Numerical and
//!   Statistical Problems"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 14

mod evaluator;
mod fixed;
mod optimize;
mod target;

pub use fixed::{run_baseline, run_fixed, run_fixed_roster};
pub use optimize::run_optimization;
pub use target::run_target_lateness;

pub(crate) use evaluator::{Outcome, TrialEvaluator};

use serde::{Deserialize, Serialize};

use crate::config::StaffingLimits;
use crate::error::{PlanError, PlanResult};
use crate::models::{Schedule, StaffingConfig, TaskCatalog};
use crate::report::{task_records, TaskRecord};
use crate::scheduler::{RunOutput, ScheduleKpi};

/// Inclusive staffing ranges searched by a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingBounds {
    pub min_mechanics: u32,
    pub max_mechanics: u32,
    pub min_quality: u32,
    pub max_quality: u32,
}

impl StaffingBounds {
    /// Creates bounds from `(min, max)` mechanics and quality ranges.
    pub fn new(mechanics: (u32, u32), quality: (u32, u32)) -> Self {
        Self {
            min_mechanics: mechanics.0,
            max_mechanics: mechanics.1,
            min_quality: quality.0,
            max_quality: quality.1,
        }
    }

    /// Checks that both ranges are non-empty and within `limits`.
    pub fn validate(&self, limits: &StaffingLimits) -> PlanResult<()> {
        if self.min_mechanics > self.max_mechanics {
            return Err(PlanError::InvalidBounds(format!(
                "mechanics range {}..={} is empty",
                self.min_mechanics, self.max_mechanics
            )));
        }
        if self.min_quality > self.max_quality {
            return Err(PlanError::InvalidBounds(format!(
                "quality range {}..={} is empty",
                self.min_quality, self.max_quality
            )));
        }
        if self.max_mechanics > limits.max_mechanics || self.max_quality > limits.max_quality {
            return Err(PlanError::InvalidBounds(format!(
                "maximum {}M/{}Q exceeds engine limit {}M/{}Q",
                self.max_mechanics, self.max_quality, limits.max_mechanics, limits.max_quality
            )));
        }
        Ok(())
    }

    /// Smallest configuration.
    pub fn min_corner(&self) -> StaffingConfig {
        StaffingConfig::new(self.min_mechanics, self.min_quality)
    }

    /// Whether `staffing` lies inside the bounds.
    pub fn contains(&self, staffing: StaffingConfig) -> bool {
        (self.min_mechanics..=self.max_mechanics).contains(&staffing.mechanics)
            && (self.min_quality..=self.max_quality).contains(&staffing.quality)
    }

    /// Number of configurations inside the bounds.
    pub fn size(&self) -> u64 {
        u64::from(self.max_mechanics.saturating_sub(self.min_mechanics) + 1)
            * u64::from(self.max_quality.saturating_sub(self.min_quality) + 1)
    }

    /// Totals `m + q` from smallest to largest.
    pub fn levels(&self) -> std::ops::RangeInclusive<u32> {
        (self.min_mechanics + self.min_quality)..=(self.max_mechanics + self.max_quality)
    }

    /// Configurations with `m + q == total`, mechanics ascending.
    pub fn configs_at_level(&self, total: u32) -> Vec<StaffingConfig> {
        let low = self.min_mechanics.max(total.saturating_sub(self.max_quality));
        let high = self.max_mechanics.min(total.saturating_sub(self.min_quality));
        (low..=high)
            .map(|m| StaffingConfig::new(m, total - m))
            .filter(|&s| self.contains(s))
            .collect()
    }
}

/// Scenario 2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLatenessParams {
    #[serde(flatten)]
    pub bounds: StaffingBounds,
    /// Desired lateness (minutes, may be negative).
    pub target_lateness: i64,
    /// Accepted distance from the target (minutes).
    pub tolerance: i64,
}

impl Default for TargetLatenessParams {
    fn default() -> Self {
        Self {
            bounds: StaffingBounds::new((1, 30), (1, 10)),
            target_lateness: -1440,
            tolerance: 2880,
        }
    }
}

/// Scenario 3 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationParams {
    #[serde(flatten)]
    pub bounds: StaffingBounds,
    /// Trial budget.
    pub max_iterations: usize,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        Self {
            bounds: StaffingBounds::new((1, 30), (1, 15)),
            max_iterations: 300,
        }
    }
}

/// Outcome of a scheduling scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub scenario: String,
    /// Chosen staffing; `None` for the roster baseline.
    pub staffing: Option<StaffingConfig>,
    pub lateness_minutes: i64,
    pub makespan_minutes: i64,
    /// Trials evaluated.
    pub iterations: usize,
    /// Whether the search finished on its own terms rather than its budget.
    pub converged: bool,
    /// Scenario 2 only: whether the chosen lateness is within tolerance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance_met: Option<bool>,
    pub kpi: ScheduleKpi,
    /// Tasks in priority order.
    pub tasks: Vec<TaskRecord>,
    /// Placements of the chosen run, for crew assignment.
    #[serde(skip)]
    pub schedule: Schedule,
}

impl ScenarioResult {
    pub(crate) fn from_run(
        scenario: impl Into<String>,
        staffing: Option<StaffingConfig>,
        catalog: &TaskCatalog,
        run: &RunOutput,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            staffing,
            lateness_minutes: run.lateness,
            makespan_minutes: run.schedule.makespan(),
            iterations: 1,
            converged: true,
            tolerance_met: None,
            kpi: run.kpi.clone(),
            tasks: task_records(catalog, run),
            schedule: run.schedule.clone(),
        }
    }

    pub(crate) fn with_search(mut self, iterations: usize, converged: bool) -> Self {
        self.iterations = iterations;
        self.converged = converged;
        self
    }

    pub(crate) fn with_tolerance_met(mut self, met: bool) -> Self {
        self.tolerance_met = Some(met);
        self
    }
}
