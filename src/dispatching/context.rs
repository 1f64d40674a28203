//! Scheduling context for dispatching rule evaluation.

use std::collections::HashMap;

use crate::critical_path::CriticalPathMetrics;
use crate::models::TaskCatalog;

/// Per-task figures passed to dispatching rules.
///
/// All times are in minutes relative to the horizon start (t=0).
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    /// Total slack per task (task_id → minutes).
    pub slack: HashMap<String, i64>,
    /// Unconstrained earliest start per task (task_id → minutes).
    pub earliest_start: HashMap<String, i64>,
    /// Due time per task, where one applies (task_id → minutes).
    pub due: HashMap<String, i64>,
}

impl SchedulingContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the context of one run from its critical-path metrics.
    pub fn from_analysis(catalog: &TaskCatalog, metrics: &CriticalPathMetrics) -> Self {
        let mut context = Self::new();
        for (i, task) in catalog.tasks().iter().enumerate() {
            let timing = metrics.timing(i);
            context.slack.insert(task.task_id.clone(), timing.slack());
            context
                .earliest_start
                .insert(task.task_id.clone(), timing.earliest_start);
            if let Some(due) = catalog.due_minutes(task) {
                context.due.insert(task.task_id.clone(), due);
            }
        }
        context
    }

    /// Sets slack for a task.
    pub fn with_slack(mut self, task_id: impl Into<String>, minutes: i64) -> Self {
        self.slack.insert(task_id.into(), minutes);
        self
    }

    /// Sets earliest start for a task.
    pub fn with_earliest_start(mut self, task_id: impl Into<String>, minutes: i64) -> Self {
        self.earliest_start.insert(task_id.into(), minutes);
        self
    }

    /// Sets the due time for a task.
    pub fn with_due(mut self, task_id: impl Into<String>, minutes: i64) -> Self {
        self.due.insert(task_id.into(), minutes);
        self
    }
}
