//! Parallel evaluation of staffing trials.

use std::cmp::Ordering;
use std::panic;
use std::thread;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::PlanResult;
use crate::models::{CapacityPlan, StaffingConfig, TaskCatalog};
use crate::precedence::build_constraints;
use crate::scheduler::{run_validated, RunOutput};
use crate::validation::ensure_valid;

/// Result of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Feasible { lateness: i64, makespan: i64 },
    /// Some task could not be staffed.
    Infeasible,
}

impl Outcome {
    pub(crate) fn lateness(&self) -> Option<i64> {
        match self {
            Outcome::Feasible { lateness, .. } => Some(*lateness),
            Outcome::Infeasible => None,
        }
    }

    /// Feasible with lateness `<= 0`.
    pub(crate) fn is_on_time(&self) -> bool {
        self.lateness().is_some_and(|l| l <= 0)
    }
}

/// Total order used to pick the best trial: feasible before infeasible,
/// then lower lateness, then fewer staff. Among infeasible trials more staff
/// ranks higher, being closer to feasibility.
pub(crate) fn rank(staffing: StaffingConfig, outcome: Outcome) -> (u8, i64, i64, u32, u32) {
    let total = i64::from(staffing.total());
    match outcome {
        Outcome::Feasible { lateness, .. } => {
            (0, lateness, total, staffing.mechanics, staffing.quality)
        }
        Outcome::Infeasible => (1, -total, 0, staffing.mechanics, staffing.quality),
    }
}

pub(crate) fn compare(a: (StaffingConfig, Outcome), b: (StaffingConfig, Outcome)) -> Ordering {
    rank(a.0, a.1).cmp(&rank(b.0, b.1))
}

/// Runs pipeline trials against one catalog.
#[derive(Debug)]
pub(crate) struct TrialEvaluator<'a> {
    catalog: &'a TaskCatalog,
    config: &'a EngineConfig,
    workers: usize,
}

impl<'a> TrialEvaluator<'a> {
    /// Validates the catalog and its constraint graph once, so trials only
    /// fail on staffing.
    pub(crate) fn new(catalog: &'a TaskCatalog, config: &'a EngineConfig) -> PlanResult<Self> {
        config.validate()?;
        ensure_valid(catalog)?;
        build_constraints(catalog)?;
        Ok(Self {
            catalog,
            config,
            workers: config.parallelism().max(1),
        })
    }

    /// Evaluates one staffing configuration.
    pub(crate) fn evaluate(&self, staffing: StaffingConfig) -> PlanResult<Outcome> {
        match run_validated(self.catalog, &CapacityPlan::uniform(staffing), self.config) {
            Ok(run) => {
                let makespan = run.schedule.makespan();
                debug!(%staffing, lateness = run.lateness, makespan, "trial");
                Ok(Outcome::Feasible {
                    lateness: run.lateness,
                    makespan,
                })
            }
            Err(e) if e.is_trial_infeasibility() => {
                warn!(%staffing, error = %e, "infeasible trial");
                Ok(Outcome::Infeasible)
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluates a batch in parallel. Results keep the order of `batch`.
    pub(crate) fn evaluate_batch(&self, batch: &[StaffingConfig]) -> PlanResult<Vec<Outcome>> {
        if batch.len() <= 1 || self.workers == 1 {
            return batch.iter().map(|&s| self.evaluate(s)).collect();
        }

        let chunk = batch.len().div_ceil(self.workers);
        let chunks: Vec<PlanResult<Vec<Outcome>>> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .chunks(chunk)
                .map(|part| {
                    scope.spawn(move || {
                        part.iter()
                            .map(|&s| self.evaluate(s))
                            .collect::<PlanResult<Vec<_>>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        let mut outcomes = Vec::with_capacity(batch.len());
        for part in chunks {
            outcomes.extend(part?);
        }
        Ok(outcomes)
    }

    /// Re-runs the chosen configuration to obtain its full schedule.
    pub(crate) fn materialize(&self, staffing: StaffingConfig) -> PlanResult<RunOutput> {
        run_validated(self.catalog, &CapacityPlan::uniform(staffing), self.config)
    }
}
