//! Task prioritisation.
//!
//! A [`DispatchingRule`] scores one task from a [`SchedulingContext`];
//! a [`RuleEngine`] combines rules into an ordering; the
//! [`PriorityListGenerator`] feeds it critical-path data and produces the
//! [`PriorityOrder`] the allocator walks.
//!
//! ```
//! use crew_schedule::dispatching::{rules, RuleEngine, SchedulingContext};
//! use crew_schedule::models::Task;
//!
//! let tasks = vec![Task::new("A"), Task::new("B")];
//! let context = SchedulingContext::new().with_slack("A", 120).with_slack("B", 0);
//! let engine = RuleEngine::new().with_rule(rules::LeastSlack);
//! assert_eq!(engine.sort_indices(&tasks, &context), vec![1, 0]);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
mod priority;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};
pub use priority::{PriorityListGenerator, PriorityOrder};

use std::fmt::Debug;

use crate::models::Task;

/// Rule output; smaller schedules sooner.
pub type RuleScore = f64;

/// Scores tasks for dispatching. A smaller score means higher priority.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Short code shown in logs, e.g. `"SLACK"`.
    fn name(&self) -> &'static str;

    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore;

    fn description(&self) -> &'static str {
        self.name()
    }
}
