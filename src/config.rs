//! Engine configuration.
//!
//! Loaded from JSON. Every field has a default, so an empty object is a
//! valid configuration:
//!
//! ```json
//! {
//!   "engine": { "late_part_delay_days": 1.0, "lateness_policy": "max_tardiness" },
//!   "plant": { "horizon_start": "2025-03-03T06:00:00", "roster": [], "shifts": [] }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::models::{PlantSettings, StaffingConfig, MINUTES_PER_DAY};
use crate::scenario::{OptimizationParams, TargetLatenessParams};
use crate::scheduler::LatenessPolicy;

/// Engine-wide upper bounds for staffing searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingLimits {
    pub max_mechanics: u32,
    pub max_quality: u32,
}

impl Default for StaffingLimits {
    fn default() -> Self {
        Self {
            max_mechanics: 500,
            max_quality: 500,
        }
    }
}

/// Search procedure used by the optimization scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Pattern search from the minimal corner with shrinking steps.
    #[default]
    PatternSearch,
    /// Every configuration in order of total headcount, up to the budget.
    Exhaustive,
}

/// Parameters `refresh` uses for each named scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioDefaults {
    /// Staffing of the fixed-headcount scenario. Derived from the roster when unset.
    pub fixed_staffing: Option<StaffingConfig>,
    pub target: TargetLatenessParams,
    pub optimize: OptimizationParams,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Extra wait after a late part's on-dock time (days).
    pub late_part_delay_days: f64,
    pub lateness_policy: LatenessPolicy,
    /// Makespan target (minutes) when lateness is measured against the makespan.
    /// Defaults to the critical-path length.
    pub delivery_horizon_minutes: Option<i64>,
    pub staffing_limits: StaffingLimits,
    /// Worker threads per trial batch. Defaults to the available parallelism.
    pub max_parallel_trials: Option<usize>,
    pub optimizer_strategy: SearchStrategy,
    pub scenarios: ScenarioDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            late_part_delay_days: 1.0,
            lateness_policy: LatenessPolicy::default(),
            delivery_horizon_minutes: None,
            staffing_limits: StaffingLimits::default(),
            max_parallel_trials: None,
            optimizer_strategy: SearchStrategy::default(),
            scenarios: ScenarioDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Reads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PlanResult<Self> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Late-part delay in whole minutes.
    pub fn late_part_delay_minutes(&self) -> i64 {
        (self.late_part_delay_days * MINUTES_PER_DAY as f64).round() as i64
    }

    /// Worker threads for one batch of trials.
    pub fn parallelism(&self) -> usize {
        self.max_parallel_trials.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Rejects unusable settings.
    pub fn validate(&self) -> PlanResult<()> {
        if !self.late_part_delay_days.is_finite() || self.late_part_delay_days < 0.0 {
            return Err(PlanError::Config(format!(
                "late_part_delay_days must be a non-negative number, got {}",
                self.late_part_delay_days
            )));
        }
        if self.staffing_limits.max_mechanics == 0 || self.staffing_limits.max_quality == 0 {
            return Err(PlanError::Config("staffing limits must be positive".into()));
        }
        if self.max_parallel_trials == Some(0) {
            return Err(PlanError::Config("max_parallel_trials must be positive".into()));
        }
        if let Some(horizon) = self.delivery_horizon_minutes {
            if horizon < 0 {
                return Err(PlanError::Config(format!(
                    "delivery_horizon_minutes must be non-negative, got {horizon}"
                )));
            }
        }
        if self.scenarios.target.tolerance < 0 {
            return Err(PlanError::Config("target tolerance must be non-negative".into()));
        }
        Ok(())
    }
}

/// Engine settings and plant data in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub engine: EngineConfig,
    pub plant: PlantSettings,
}

impl ConfigFile {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let file: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        file.engine.validate()?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.late_part_delay_minutes(), 1440);
        assert_eq!(config.lateness_policy, LatenessPolicy::MaxTardiness);
        assert_eq!(config.optimizer_strategy, SearchStrategy::PatternSearch);
        assert_eq!(config.scenarios.optimize.max_iterations, 300);
        assert!(config.parallelism() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "late_part_delay_days": 0.5, "optimizer_strategy": "exhaustive" }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.late_part_delay_minutes(), 720);
        assert_eq!(config.optimizer_strategy, SearchStrategy::Exhaustive);
        assert_eq!(config.staffing_limits, StaffingLimits::default());
    }

    #[test]
    fn test_validate_rejects() {
        let negative = EngineConfig {
            late_part_delay_days: -1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(negative.validate(), Err(PlanError::Config(_))));

        let no_workers = EngineConfig {
            max_parallel_trials: Some(0),
            ..EngineConfig::default()
        };
        assert!(no_workers.validate().is_err());

        let mut zero_limit = EngineConfig::default();
        zero_limit.staffing_limits.max_quality = 0;
        assert!(zero_limit.validate().is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "engine": {{ "lateness_policy": "max_lateness", "max_parallel_trials": 2 }},
                "plant": {{
                    "horizon_start": "2025-03-03T06:00:00",
                    "roster": [
                        {{ "team": "M", "shift": "1st", "role": "mechanic", "headcount": 4 }}
                    ],
                    "shifts": [{{ "shift": "1st", "start_minute": 360, "end_minute": 870 }}]
                }}
            }}"#
        )
        .unwrap();

        let loaded = ConfigFile::load(file.path()).unwrap();
        assert_eq!(loaded.engine.lateness_policy, LatenessPolicy::MaxLateness);
        assert_eq!(loaded.engine.parallelism(), 2);
        assert_eq!(loaded.plant.roster[0].headcount, 4);
        assert_eq!(loaded.plant.shifts[0].window_length(), 510);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ConfigFile::load("/nonexistent/crew.json"),
            Err(PlanError::Io(_))
        ));
    }
}
