//! Task records handed to the serving layer.
//!
//! One record per scheduled task, in priority order, with ISO-8601 times
//! and the resolved predecessor and successor links of the effective
//! constraint graph.

use serde::Serialize;

use crate::models::{ConstraintOrigin, TaskCatalog};
use crate::precedence::Edge;
use crate::scheduler::RunOutput;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A predecessor or successor of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub task_id: String,
    /// Relationship label, e.g. `"Finish <= Start"`.
    pub relationship: String,
    pub origin: ConstraintOrigin,
}

/// One scheduled task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// 1-based position in the priority list.
    pub rank: usize,
    pub task_id: String,
    pub display_name: String,
    pub task_type: String,
    pub start_time: String,
    pub end_time: String,
    pub team: String,
    pub shift: String,
    pub product_line: String,
    pub duration: i64,
    pub mechanics_required: u32,
    pub is_quality: bool,
    pub slack_minutes: i64,
    pub dependencies: Vec<LinkRecord>,
    pub successors: Vec<LinkRecord>,
}

/// Builds task records for `run` in priority order.
pub fn task_records(catalog: &TaskCatalog, run: &RunOutput) -> Vec<TaskRecord> {
    let tasks = catalog.tasks();
    let links = |edges: &[Edge]| -> Vec<LinkRecord> {
        edges
            .iter()
            .map(|edge| LinkRecord {
                task_id: tasks[edge.task].task_id.clone(),
                relationship: edge.relationship.label().to_string(),
                origin: edge.origin,
            })
            .collect()
    };

    run.priority
        .iter()
        .enumerate()
        .filter_map(|(position, index)| {
            let task = &tasks[index];
            let entry = run.schedule.entry(&task.task_id)?;
            Some(TaskRecord {
                rank: position + 1,
                task_id: task.task_id.clone(),
                display_name: task.display_name.clone(),
                task_type: task.task_type.label().to_string(),
                start_time: catalog.to_datetime(entry.start).format(TIMESTAMP_FORMAT).to_string(),
                end_time: catalog.to_datetime(entry.end).format(TIMESTAMP_FORMAT).to_string(),
                team: task.team.clone(),
                shift: task.shift.clone(),
                product_line: task.product_line.clone(),
                duration: task.duration,
                mechanics_required: task.mechanics_required,
                is_quality: task.is_quality,
                slack_minutes: run.metrics.slack(index),
                dependencies: links(run.graph.predecessors(index)),
                successors: links(run.graph.successors(index)),
            })
        })
        .collect()
}
