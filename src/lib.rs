//! Resource-constrained production scheduling with staffing scenarios.
//!
//! Given a catalog of tasks with durations, crew sizes, team/shift pools and
//! precedence constraints, the engine builds a critical-path priority list,
//! places every task against pool capacity and shift windows, and searches
//! staffing levels for the headcount that meets a lateness goal.
//!
//! # Modules
//!
//! - **`models`**: `Task`, `TaskCatalog`, `Precedence`, `ShiftCalendar`,
//!   `PoolKey`/`StaffingConfig`/`CapacityPlan`, `Schedule`
//! - **`validation`**: catalog integrity checks (IDs, durations, references, shifts)
//! - **`precedence`**: effective constraint graph with derived inspection,
//!   late-part and rework edges, cycle detection
//! - **`critical_path`**: forward/backward pass, slack, critical tasks
//! - **`dispatching`**: composable dispatching rules and the priority list
//! - **`scheduler`**: time allocation, lateness objectives, KPIs, audit, pipeline
//! - **`scenario`**: baseline, fixed, target-lateness and optimization searches
//! - **`service`**: invocation surface (`compute_baseline`, `run_scenario`, `refresh`)
//! - **`report`**, **`assignment`**, **`ingest`**, **`config`**, **`error`**, **`logging`**
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use crew_schedule::config::EngineConfig;
//! use crew_schedule::models::{PlantSettings, Precedence, StaffingConfig, Task, TaskCatalog};
//! use crew_schedule::scenario::run_fixed;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().and_hms_opt(6, 0, 0).unwrap();
//! let catalog = TaskCatalog::new(PlantSettings::new(start))
//!     .with_task(Task::new("frame").with_duration(120).with_crew(2))
//!     .with_task(Task::new("wire").with_duration(60))
//!     .with_precedence(Precedence::finish_to_start("frame", "wire"));
//!
//! let result = run_fixed(&catalog, &EngineConfig::default(), StaffingConfig::new(2, 1)).unwrap();
//! assert_eq!(result.makespan_minutes, 180);
//! assert_eq!(result.tasks[0].task_id, "frame");
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited"

pub mod assignment;
pub mod config;
pub mod critical_path;
pub mod dispatching;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod precedence;
pub mod report;
pub mod scenario;
pub mod scheduler;
pub mod service;
pub mod validation;

pub use error::{PlanError, PlanResult};
