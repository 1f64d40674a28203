//! Error taxonomy for scheduling runs and scenario searches.
//!
//! Catalog and constraint errors are fatal and abort a run before any
//! scheduling happens. `InfeasibleSchedule` is fatal for a single fixed
//! staffing configuration but is folded into candidate ranking by the
//! scenario searches. Non-convergence is never an error; it is reported
//! through the flags on [`ScenarioResult`](crate::scenario::ScenarioResult).

use thiserror::Error;

use crate::models::PoolKey;
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors surfaced by the scheduling engine.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed or inconsistent catalog data.
    #[error("catalog validation failed: {}", join_messages(.0))]
    DataValidation(Vec<ValidationError>),

    /// The effective precedence graph contains a cycle.
    #[error("circular dependency among tasks: {}", .tasks.join(", "))]
    CyclicDependency { tasks: Vec<String> },

    /// A task cannot be placed under the given staffing.
    #[error("task '{task_id}' needs {required} from pool {pool} but only {available} configured")]
    InfeasibleSchedule {
        task_id: String,
        pool: PoolKey,
        required: u32,
        available: u32,
    },

    /// Every trial of a staffing search was infeasible.
    #[error("no schedulable staffing configuration for {scenario} after {trials} trials")]
    NoFeasibleStaffing { scenario: String, trials: usize },

    /// Search bounds are empty or outside the engine limits.
    #[error("invalid staffing bounds: {0}")]
    InvalidBounds(String),

    /// `refresh` was asked for a scenario name it does not know.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    /// Engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PlanError {
    /// Whether a scenario search may treat this error as a non-candidate trial.
    pub fn is_trial_infeasibility(&self) -> bool {
        matches!(self, PlanError::InfeasibleSchedule { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_messages() {
        let err = PlanError::CyclicDependency {
            tasks: vec!["A".into(), "B".into()],
        };
        assert_eq!(err.to_string(), "circular dependency among tasks: A, B");

        let err = PlanError::InfeasibleSchedule {
            task_id: "T1".into(),
            pool: PoolKey::new("Mech A", "1st", Role::Mechanic),
            required: 4,
            available: 2,
        };
        assert!(err.to_string().contains("T1"));
        assert!(err.to_string().contains("Mech A/1st/mechanic"));
        assert!(err.is_trial_infeasibility());
    }

    #[test]
    fn test_validation_messages_joined() {
        let err = PlanError::DataValidation(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "dup A"),
            ValidationError::new(ValidationErrorKind::EmptyId, "row 3 empty"),
        ]);
        assert_eq!(
            err.to_string(),
            "catalog validation failed: dup A; row 3 empty"
        );
        assert!(!err.is_trial_infeasibility());
    }
}
