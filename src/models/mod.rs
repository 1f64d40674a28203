//! Scheduling domain models.
//!
//! Provides the data types for production scheduling runs: the task catalog
//! with its plant settings, precedence constraints, shift windows, staffing
//! pools and the resulting schedule.
//!
//! # Domain Mappings
//!
//! | crew-schedule | Shop floor |
//! |---------------|------------|
//! | Task | Work order step |
//! | PoolKey | Team × shift × role crew |
//! | StaffingConfig | Mechanics / inspectors per crew |
//! | Schedule | Production plan |

mod calendar;
mod catalog;
mod constraint;
mod resource;
mod schedule;
mod task;

pub use calendar::{ShiftCalendar, TimeWindow, MINUTES_PER_DAY};
pub use catalog::{PlantSettings, ProductLine, TaskCatalog};
pub use constraint::{ConstraintOrigin, Precedence, Relationship};
pub use resource::{CapacityPlan, PoolKey, RosterEntry, StaffingConfig};
pub use schedule::{Schedule, ScheduleEntry, Violation, ViolationType};
pub use task::{Role, Task, TaskType};
