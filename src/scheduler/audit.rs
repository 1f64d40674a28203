//! Independent schedule checks.
//!
//! Re-verifies a finished schedule against the constraint graph, the shift
//! windows and the capacity plan without trusting the allocator's
//! bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    CapacityPlan, PoolKey, Schedule, TaskCatalog, TimeWindow, Violation, ViolationType,
};
use crate::precedence::ConstraintGraph;

use super::PoolTimeline;

/// Lists every violation in `schedule`. An empty result means the schedule
/// honors all precedences, shift windows and pool headcounts.
pub fn audit(
    schedule: &Schedule,
    graph: &ConstraintGraph,
    capacity: &CapacityPlan,
    catalog: &TaskCatalog,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for task in catalog.tasks() {
        if schedule.entry(&task.task_id).is_none() {
            violations.push(Violation::new(
                ViolationType::Unscheduled,
                &task.task_id,
                format!("Task '{}' has no schedule entry", task.task_id),
            ));
        }
    }

    for c in graph.constraints() {
        let (Some(p), Some(s)) = (schedule.entry(&c.predecessor), schedule.entry(&c.successor))
        else {
            continue;
        };
        if !c.relationship.is_satisfied((p.start, p.end), (s.start, s.end)) {
            violations.push(Violation::new(
                ViolationType::PrecedenceViolation,
                &c.successor,
                format!(
                    "{} [{}, {}) and {} [{}, {}) break '{}'",
                    c.predecessor,
                    p.start,
                    p.end,
                    c.successor,
                    s.start,
                    s.end,
                    c.relationship.label()
                ),
            ));
        }
    }

    let epoch = catalog.epoch_offset();
    let mut pools: BTreeMap<PoolKey, PoolTimeline> = BTreeMap::new();
    for entry in schedule.entries().iter().filter(|e| e.mechanics_required > 0) {
        if let Some(calendar) = catalog.shift_calendar(&entry.shift) {
            if !calendar.contains(entry.start, entry.duration, epoch) {
                violations.push(Violation::new(
                    ViolationType::OutsideShift,
                    &entry.task_id,
                    format!(
                        "Task '{}' at [{}, {}) leaves shift '{}'",
                        entry.task_id, entry.start, entry.end, entry.shift
                    ),
                ));
            }
        }
        pools
            .entry(entry.pool())
            .or_default()
            .commit(TimeWindow::new(entry.start, entry.end), entry.mechanics_required);
    }

    let mut over: BTreeSet<PoolKey> = BTreeSet::new();
    for entry in schedule.entries().iter().filter(|e| e.mechanics_required > 0) {
        let pool = entry.pool();
        if over.contains(&pool) {
            continue;
        }
        let headcount = capacity.headcount(&pool);
        let peak = pools
            .get(&pool)
            .map_or(0, |t| t.peak_usage(&TimeWindow::new(entry.start, entry.end)));
        if peak > headcount {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                pool.to_string(),
                format!(
                    "Pool {pool} runs {peak} crew during [{}, {}) with headcount {headcount}",
                    entry.start, entry.end
                ),
            ));
            over.insert(pool);
        }
    }

    violations
}
