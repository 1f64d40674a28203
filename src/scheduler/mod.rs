//! Time allocation, lateness evaluation and schedule checks.
//!
//! # Algorithm
//!
//! `TimeAllocator` is a serial list scheduler: tasks are taken in priority
//! order as soon as their predecessors are placed and start at the earliest
//! instant that honors precedence, the shift window and pool headcount.
//!
//! # KPI
//!
//! `LatenessObjective` reduces a schedule to the single figure scenario
//! searches compare; `ScheduleKpi` reports the wider set of metrics.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited"

mod allocator;
mod audit;
mod kpi;
mod lateness;
mod pipeline;
mod timeline;

pub use allocator::TimeAllocator;
pub use audit::audit;
pub use kpi::ScheduleKpi;
pub use lateness::{LatenessObjective, LatenessPolicy, MakespanOverrun, MaxLateness, MaxTardiness};
pub use pipeline::{run_pipeline, RunOutput};
pub(crate) use pipeline::run_validated;
pub use timeline::PoolTimeline;
