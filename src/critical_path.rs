//! Critical-path analysis.
//!
//! Forward and backward passes over the constraint graph, ignoring staff
//! limits, to obtain each task's earliest and latest start/finish and its
//! slack. Zero slack marks the critical path.
//!
//! Results are memoized inside the analyzer. An analyzer borrows one
//! catalog and one graph, so a changed catalog or constraint set means a
//! new analyzer; there is no shared cache to invalidate.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use std::cell::OnceCell;

use crate::models::{Relationship, TaskCatalog};
use crate::precedence::ConstraintGraph;

/// Earliest/latest times of one task (minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTiming {
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
}

impl TaskTiming {
    /// `latest_start - earliest_start`.
    #[inline]
    pub fn slack(&self) -> i64 {
        self.latest_start - self.earliest_start
    }

    /// Whether the task is on the critical path.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.slack() == 0
    }
}

/// Critical-path results for every task, indexed like the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalPathMetrics {
    timings: Vec<TaskTiming>,
    project_length: i64,
}

impl CriticalPathMetrics {
    /// Timing of a task by catalog index.
    pub fn timing(&self, task: usize) -> &TaskTiming {
        &self.timings[task]
    }

    /// Slack of a task by catalog index.
    pub fn slack(&self, task: usize) -> i64 {
        self.timings[task].slack()
    }

    /// All timings, indexed like the catalog.
    pub fn timings(&self) -> &[TaskTiming] {
        &self.timings
    }

    /// Unconstrained-resource project length (latest earliest finish).
    pub fn project_length(&self) -> i64 {
        self.project_length
    }

    /// Catalog indices of zero-slack tasks.
    pub fn critical_tasks(&self) -> Vec<usize> {
        (0..self.timings.len())
            .filter(|&i| self.timings[i].is_critical())
            .collect()
    }
}

/// Memoizing critical-path analyzer for one run.
#[derive(Debug)]
pub struct CriticalPathAnalyzer<'a> {
    catalog: &'a TaskCatalog,
    graph: &'a ConstraintGraph,
    late_part_delay: i64,
    metrics: OnceCell<CriticalPathMetrics>,
}

impl<'a> CriticalPathAnalyzer<'a> {
    /// Creates an analyzer; nothing is computed until [`metrics`](Self::metrics).
    pub fn new(catalog: &'a TaskCatalog, graph: &'a ConstraintGraph, late_part_delay: i64) -> Self {
        Self {
            catalog,
            graph,
            late_part_delay,
            metrics: OnceCell::new(),
        }
    }

    /// Returns the metrics, computing them on first access.
    pub fn metrics(&self) -> &CriticalPathMetrics {
        self.metrics.get_or_init(|| self.compute())
    }

    /// Whether metrics have been computed yet.
    pub fn is_computed(&self) -> bool {
        self.metrics.get().is_some()
    }

    /// Consumes the analyzer, keeping its metrics.
    pub fn into_metrics(mut self) -> CriticalPathMetrics {
        match self.metrics.take() {
            Some(metrics) => metrics,
            None => self.compute(),
        }
    }

    fn compute(&self) -> CriticalPathMetrics {
        let tasks = self.catalog.tasks();
        let n = tasks.len();
        let order = self.graph.topological_order();
        let mut es = vec![0i64; n];
        let mut ef = vec![0i64; n];

        // Forward pass.
        for &s in order {
            let duration = tasks[s].duration;
            let mut start = self.catalog.release_minutes(&tasks[s], self.late_part_delay);
            for edge in self.graph.predecessors(s) {
                let p = edge.task;
                start = start.max(edge.relationship.successor_start_bound(es[p], ef[p], duration));
            }
            es[s] = start.max(0);
            ef[s] = es[s] + duration;
        }

        let horizon = ef.iter().copied().max().unwrap_or(0);
        let mut ls = vec![0i64; n];
        let mut lf = vec![0i64; n];

        // Backward pass.
        for &p in order.iter().rev() {
            let duration = tasks[p].duration;
            let mut finish = horizon;
            for edge in self.graph.successors(p) {
                let s = edge.task;
                let bound = match edge.relationship {
                    Relationship::FinishToStart => ls[s],
                    Relationship::FinishToFinish => lf[s],
                    Relationship::StartToStart => ls[s] + duration,
                };
                finish = finish.min(bound);
            }
            lf[p] = finish;
            ls[p] = finish - duration;
        }

        let timings = (0..n)
            .map(|i| TaskTiming {
                earliest_start: es[i],
                earliest_finish: ef[i],
                latest_start: ls[i],
                latest_finish: lf[i],
            })
            .collect();

        CriticalPathMetrics {
            timings,
            project_length: horizon,
        }
    }
}
