//! Scenario 3: bounded search for the best staffing.
//!
//! # Pattern search
//!
//! 1. Evaluate the minimal corner.
//! 2. Evaluate `±step` in each dimension as one parallel batch; steps start at
//!    a quarter of each range.
//! 3. Move to the best neighbour if it ranks above the current point,
//!    otherwise halve both steps.
//! 4. When unit steps find no improvement, spend the remaining budget on
//!    unevaluated points in order of total headcount.
//!
//! The search stops on a zero-lateness point, a spent budget or a fully
//! evaluated grid. Evaluated points are cached, so revisiting a point costs
//! no trial.
//!
//! # Reference
//! Hooke & Jeeves (1961), "Direct Search Solution of Numerical and
//! Statistical Problems"

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::config::{EngineConfig, SearchStrategy};
use crate::error::{PlanError, PlanResult};
use crate::models::{StaffingConfig, TaskCatalog};

use super::evaluator::{compare, rank};
use super::{OptimizationParams, Outcome, ScenarioResult, StaffingBounds, TrialEvaluator};

/// Runs the optimization search selected by `config.optimizer_strategy`.
///
/// `iterations` in the result counts evaluated trials and never exceeds
/// `params.max_iterations`. `converged` is false when the budget ran out
/// before the search finished.
///
/// # Errors
/// - `InvalidBounds` for empty or out-of-limit bounds, or a zero budget.
/// - `NoFeasibleStaffing` if every evaluated configuration is infeasible.
#[instrument(skip_all, fields(tasks = catalog.len(), budget = params.max_iterations))]
pub fn run_optimization(
    catalog: &TaskCatalog,
    config: &EngineConfig,
    params: &OptimizationParams,
) -> PlanResult<ScenarioResult> {
    params.bounds.validate(&config.staffing_limits)?;
    if params.max_iterations == 0 {
        return Err(PlanError::InvalidBounds("max_iterations must be at least 1".into()));
    }
    let evaluator = TrialEvaluator::new(catalog, config)?;
    let mut search = Search {
        evaluator: &evaluator,
        budget: params.max_iterations,
        cache: HashMap::new(),
    };

    let converged = match config.optimizer_strategy {
        SearchStrategy::PatternSearch => search.pattern(&params.bounds)?,
        SearchStrategy::Exhaustive => search.exhaustive(&params.bounds)?,
    };

    let (best, outcome) = search.best().ok_or_else(|| PlanError::NoFeasibleStaffing {
        scenario: "scenario3".into(),
        trials: search.cache.len(),
    })?;
    if outcome == Outcome::Infeasible {
        return Err(PlanError::NoFeasibleStaffing {
            scenario: "scenario3".into(),
            trials: search.cache.len(),
        });
    }

    let run = evaluator.materialize(best)?;
    info!(
        staffing = %best,
        lateness = run.lateness,
        trials = search.cache.len(),
        converged,
        "optimization finished"
    );
    Ok(ScenarioResult::from_run("scenario3", Some(best), catalog, &run)
        .with_search(search.cache.len(), converged))
}

struct Search<'e, 'a> {
    evaluator: &'e TrialEvaluator<'a>,
    budget: usize,
    cache: HashMap<StaffingConfig, Outcome>,
}

impl Search<'_, '_> {
    fn remaining(&self) -> usize {
        self.budget.saturating_sub(self.cache.len())
    }

    /// Evaluates the uncached configurations of `batch` that fit the budget.
    /// Returns false if some had to be skipped.
    fn evaluate(&mut self, batch: &[StaffingConfig]) -> PlanResult<bool> {
        let mut fresh: Vec<StaffingConfig> = Vec::new();
        for &s in batch {
            if !self.cache.contains_key(&s) && !fresh.contains(&s) {
                fresh.push(s);
            }
        }
        let complete = fresh.len() <= self.remaining();
        fresh.truncate(self.remaining());
        let outcomes = self.evaluator.evaluate_batch(&fresh)?;
        self.cache.extend(fresh.into_iter().zip(outcomes));
        Ok(complete)
    }

    fn outcome(&self, staffing: StaffingConfig) -> Option<Outcome> {
        self.cache.get(&staffing).copied()
    }

    fn best(&self) -> Option<(StaffingConfig, Outcome)> {
        self.cache
            .iter()
            .map(|(&s, &o)| (s, o))
            .min_by(|&a, &b| compare(a, b))
    }

    /// Returns whether the search converged within the budget.
    fn pattern(&mut self, bounds: &StaffingBounds) -> PlanResult<bool> {
        let mut current = bounds.min_corner();
        self.evaluate(&[current])?;
        let mut step_m = ((bounds.max_mechanics - bounds.min_mechanics) / 4).max(1);
        let mut step_q = ((bounds.max_quality - bounds.min_quality) / 4).max(1);

        loop {
            let Some(here) = self.outcome(current) else {
                return Ok(false);
            };
            if here.is_on_time() {
                return Ok(true);
            }
            if self.remaining() == 0 {
                return Ok(false);
            }

            let around = neighbours(bounds, current, step_m, step_q);
            let complete = self.evaluate(&around)?;
            let best_near = around
                .iter()
                .filter_map(|&s| self.outcome(s).map(|o| (s, o)))
                .min_by(|&a, &b| compare(a, b));

            match best_near {
                Some((next, outcome)) if rank(next, outcome) < rank(current, here) => {
                    debug!(from = %current, to = %next, step_m, step_q, "move");
                    current = next;
                }
                _ if !complete => return Ok(false),
                _ if step_m == 1 && step_q == 1 => {
                    debug!(at = %current, remaining = self.remaining(), "stalled, sweeping grid");
                    return self.exhaustive(bounds);
                }
                _ => {
                    step_m = (step_m / 2).max(1);
                    step_q = (step_q / 2).max(1);
                    debug!(at = %current, step_m, step_q, "shrink");
                }
            }
        }
    }

    /// Walks the grid by total headcount, stopping at the first total with
    /// an on-time configuration. Cached points cost no trial.
    fn exhaustive(&mut self, bounds: &StaffingBounds) -> PlanResult<bool> {
        for level in bounds.levels() {
            let batch = bounds.configs_at_level(level);
            let complete = self.evaluate(&batch)?;
            if batch
                .iter()
                .any(|&s| self.outcome(s).is_some_and(|o| o.is_on_time()))
            {
                return Ok(true);
            }
            if !complete {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// In-bounds points `±step` away from `at` along each axis.
fn neighbours(
    bounds: &StaffingBounds,
    at: StaffingConfig,
    step_m: u32,
    step_q: u32,
) -> Vec<StaffingConfig> {
    let candidates = [
        StaffingConfig::new(
            at.mechanics.saturating_add(step_m).min(bounds.max_mechanics),
            at.quality,
        ),
        StaffingConfig::new(
            at.mechanics,
            at.quality.saturating_add(step_q).min(bounds.max_quality),
        ),
        StaffingConfig::new(
            at.mechanics.saturating_sub(step_m).max(bounds.min_mechanics),
            at.quality,
        ),
        StaffingConfig::new(
            at.mechanics,
            at.quality.saturating_sub(step_q).max(bounds.min_quality),
        ),
    ];
    let mut out = Vec::with_capacity(4);
    for c in candidates {
        if c != at && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}
