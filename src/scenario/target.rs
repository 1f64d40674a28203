//! Scenario 2: smallest staffing that lands lateness near a target.
//!
//! Lateness does not increase with headcount, so the sweep walks totals
//! `m + q` upward from the minimal corner, one parallel batch per total,
//! and stops at the first total holding a configuration within tolerance.

use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::error::{PlanError, PlanResult};
use crate::models::{StaffingConfig, TaskCatalog};

use super::{Outcome, ScenarioResult, TargetLatenessParams, TrialEvaluator};

/// Runs the target-lateness search.
///
/// Returns the first configuration (fewest staff, then fewest mechanics)
/// whose lateness is within `target ± tolerance`. Otherwise returns the
/// configuration closest to the target with `tolerance_met == Some(false)`.
///
/// # Errors
/// - `InvalidBounds` for empty or out-of-limit bounds, or negative tolerance.
/// - `NoFeasibleStaffing` if every configuration is infeasible.
#[instrument(skip_all, fields(tasks = catalog.len(), target = params.target_lateness))]
pub fn run_target_lateness(
    catalog: &TaskCatalog,
    config: &EngineConfig,
    params: &TargetLatenessParams,
) -> PlanResult<ScenarioResult> {
    params.bounds.validate(&config.staffing_limits)?;
    if params.tolerance < 0 {
        return Err(PlanError::InvalidBounds(format!(
            "tolerance must be non-negative, got {}",
            params.tolerance
        )));
    }
    let evaluator = TrialEvaluator::new(catalog, config)?;
    let within = |lateness: i64| (lateness - params.target_lateness).abs() <= params.tolerance;

    let mut evaluated: Vec<(StaffingConfig, Outcome)> = Vec::new();
    let mut hit: Option<StaffingConfig> = None;
    for level in params.bounds.levels() {
        let batch = params.bounds.configs_at_level(level);
        let outcomes = evaluator.evaluate_batch(&batch)?;
        hit = batch
            .iter()
            .zip(&outcomes)
            .find(|(_, o)| o.lateness().is_some_and(within))
            .map(|(&s, _)| s);
        evaluated.extend(batch.into_iter().zip(outcomes));
        if hit.is_some() {
            break;
        }
    }

    let chosen = match hit {
        Some(staffing) => staffing,
        None => closest(&evaluated, params.target_lateness).ok_or_else(|| {
            PlanError::NoFeasibleStaffing {
                scenario: "scenario2".into(),
                trials: evaluated.len(),
            }
        })?,
    };

    let run = evaluator.materialize(chosen)?;
    info!(
        staffing = %chosen,
        lateness = run.lateness,
        trials = evaluated.len(),
        tolerance_met = hit.is_some(),
        "target search finished"
    );
    Ok(ScenarioResult::from_run("scenario2", Some(chosen), catalog, &run)
        .with_search(evaluated.len(), hit.is_some())
        .with_tolerance_met(hit.is_some()))
}

/// Feasible configuration nearest the target; ties go to fewer staff.
fn closest(evaluated: &[(StaffingConfig, Outcome)], target: i64) -> Option<StaffingConfig> {
    evaluated
        .iter()
        .filter_map(|&(s, o)| match o {
            Outcome::Feasible { lateness, makespan } => Some((
                (lateness - target).abs(),
                s.total(),
                s.mechanics,
                s.quality,
                makespan,
                s,
            )),
            Outcome::Infeasible => None,
        })
        .min_by_key(|&(distance, total, m, q, makespan, _)| (distance, total, m, q, makespan))
        .map(|(.., s)| s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::tests::line_catalog;
    use crate::scenario::StaffingBounds;

    fn search(
        mechanics: (u32, u32),
        quality: (u32, u32),
        target: i64,
        tolerance: i64,
    ) -> PlanResult<ScenarioResult> {
        let params = TargetLatenessParams {
            bounds: StaffingBounds::new(mechanics, quality),
            target_lateness: target,
            tolerance,
        };
        run_target_lateness(&line_catalog(), &EngineConfig::default(), &params)
    }

    #[test]
    fn test_exact_zero_target() {
        let result = search((1, 10), (1, 2), 0, 0).unwrap();
        assert_eq!(result.staffing, Some(StaffingConfig::new(8, 1)));
        assert_eq!(result.lateness_minutes, 0);
        assert_eq!(result.tolerance_met, Some(true));
        assert!(result.converged);
    }

    #[test]
    fn test_first_within_tolerance() {
        // 60 ± 0 first reached at 4 mechanics.
        let result = search((1, 10), (1, 2), 60, 0).unwrap();
        assert_eq!(result.staffing, Some(StaffingConfig::new(4, 1)));
        // Totals 2..=5 evaluated: 1 + 2 + 2 + 2 configurations.
        assert_eq!(result.iterations, 7);
    }

    #[test]
    fn test_tolerance_not_met_returns_closest() {
        // Lateness values are 180, 60, 0: 100 is closest to 60.
        let result = search((2, 8), (1, 1), 100, 10).unwrap();
        assert_eq!(result.tolerance_met, Some(false));
        assert!(!result.converged);
        assert_eq!(result.staffing, Some(StaffingConfig::new(4, 1)));
        assert_eq!(result.iterations, 7);
    }

    #[test]
    fn test_all_infeasible() {
        let err = search((1, 8), (0, 0), 0, 0).unwrap_err();
        match err {
            PlanError::NoFeasibleStaffing { trials, .. } => assert_eq!(trials, 8),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_tolerance() {
        let err = search((1, 2), (1, 1), 0, -1).unwrap_err();
        assert!(matches!(err, PlanError::InvalidBounds(_)));
    }

    #[test]
    fn test_raising_min_mechanics_never_lowers_lateness() {
        // An unreachable target makes the search report the lowest lateness in range.
        let latenesses: Vec<i64> = [2, 4, 6, 8]
            .into_iter()
            .map(|min| search((min, 8), (1, 1), -500, 0).unwrap().lateness_minutes)
            .collect();
        assert!(latenesses.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(latenesses, vec![0, 0, 0, 0]);
    }
}
