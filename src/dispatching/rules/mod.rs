//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Network-based**: least slack, earliest start
//! - **Due-date**: EDD
//! - **Time/Load**: SPT, largest crew
//!
//! # Score Convention
//! All rules return lower scores for higher priority tasks. Tasks missing
//! from the context score `f64::MAX` and sort last.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Task;

// ======================== Network-based rules ========================

/// Least Slack.
///
/// Prioritizes tasks on or near the critical path.
#[derive(Debug, Clone, Copy)]
pub struct LeastSlack;

impl DispatchingRule for LeastSlack {
    fn name(&self) -> &'static str {
        "SLACK"
    }

    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore {
        context
            .slack
            .get(&task.task_id)
            .map_or(f64::MAX, |&s| s as f64)
    }

    fn description(&self) -> &'static str {
        "Least Slack"
    }
}

/// Earliest Start.
///
/// Prioritizes tasks whose predecessors allow them to begin first.
#[derive(Debug, Clone, Copy)]
pub struct EarliestStart;

impl DispatchingRule for EarliestStart {
    fn name(&self) -> &'static str {
        "EST"
    }

    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore {
        context
            .earliest_start
            .get(&task.task_id)
            .map_or(f64::MAX, |&es| es as f64)
    }

    fn description(&self) -> &'static str {
        "Earliest Start"
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, task: &Task, context: &SchedulingContext) -> RuleScore {
        context
            .due
            .get(&task.task_id)
            .map_or(f64::MAX, |&due| due as f64)
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}

// ======================== Time/Load rules ========================

/// Shortest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        task.duration as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Largest Crew first.
///
/// Places crew-hungry tasks before the pool fragments.
#[derive(Debug, Clone, Copy)]
pub struct LargestCrew;

impl DispatchingRule for LargestCrew {
    fn name(&self) -> &'static str {
        "CREW"
    }

    fn evaluate(&self, task: &Task, _context: &SchedulingContext) -> RuleScore {
        -f64::from(task.mechanics_required)
    }

    fn description(&self) -> &'static str {
        "Largest Crew"
    }
}
