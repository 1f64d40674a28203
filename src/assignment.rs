//! Per-mechanic crew assignment for one team and day.
//!
//! Takes a computed schedule and the mechanics present on the floor and
//! names who works each task.
//!
//! # Algorithm
//!
//! Tasks of the team starting on the requested date are visited in start
//! order (ties by task id). Each task takes `mechanics_required` mechanics
//! that are free at its start, earliest-free first, then by name. A task
//! that cannot be fully crewed takes nobody and is listed as a shortfall.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::{Schedule, ScheduleEntry, TaskCatalog};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Who is available, and for which slice of the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub team: String,
    pub date: NaiveDate,
    /// Restrict to one shift; all shifts of the team when `None`.
    pub shift: Option<String>,
    pub present_mechanics: Vec<String>,
}

impl AssignmentRequest {
    pub fn new(team: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            team: team.into(),
            date,
            shift: None,
            present_mechanics: Vec::new(),
        }
    }

    pub fn with_shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = Some(shift.into());
        self
    }

    pub fn with_mechanics<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.present_mechanics.extend(names.into_iter().map(Into::into));
        self
    }
}

/// A task and the mechanics working it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewAssignment {
    pub task_id: String,
    pub start_time: String,
    pub end_time: String,
    pub mechanics: Vec<String>,
}

/// A task that could not be crewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    pub task_id: String,
    pub start_time: String,
    pub needed: u32,
    pub available: u32,
}

/// Assignments for one team and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPlan {
    pub team: String,
    pub date: NaiveDate,
    pub assignments: Vec<CrewAssignment>,
    pub unassigned: Vec<Shortfall>,
}

impl AssignmentPlan {
    /// Whether every task found a full crew.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Assigns present mechanics to the team's crewed mechanic tasks.
pub fn assign_crew(
    schedule: &Schedule,
    catalog: &TaskCatalog,
    request: &AssignmentRequest,
) -> AssignmentPlan {
    let mut entries: Vec<&ScheduleEntry> = schedule
        .entries()
        .iter()
        .filter(|e| e.team == request.team && !e.is_quality && e.mechanics_required > 0)
        .filter(|e| request.shift.as_ref().map_or(true, |s| &e.shift == s))
        .filter(|e| catalog.to_datetime(e.start).date() == request.date)
        .collect();
    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.task_id.cmp(&b.task_id)));

    // Minute each mechanic becomes free.
    let mut free_at: BTreeMap<&str, i64> = request
        .present_mechanics
        .iter()
        .map(|name| (name.as_str(), i64::MIN))
        .collect();

    let mut plan = AssignmentPlan {
        team: request.team.clone(),
        date: request.date,
        assignments: Vec::new(),
        unassigned: Vec::new(),
    };

    for entry in entries {
        let mut free: Vec<(i64, &str)> = free_at
            .iter()
            .filter(|&(_, &at)| at <= entry.start)
            .map(|(&name, &at)| (at, name))
            .collect();
        free.sort_unstable();

        let needed = entry.mechanics_required;
        let start_time = catalog.to_datetime(entry.start).format(TIMESTAMP_FORMAT).to_string();
        if free.len() < needed as usize {
            debug!(task = %entry.task_id, needed, available = free.len(), "crew shortfall");
            plan.unassigned.push(Shortfall {
                task_id: entry.task_id.clone(),
                start_time,
                needed,
                available: free.len() as u32,
            });
            continue;
        }

        let mut crew = Vec::with_capacity(needed as usize);
        for &(_, name) in free.iter().take(needed as usize) {
            free_at.insert(name, entry.end);
            crew.push(name.to_string());
        }
        plan.assignments.push(CrewAssignment {
            task_id: entry.task_id.clone(),
            start_time,
            end_time: catalog.to_datetime(entry.end).format(TIMESTAMP_FORMAT).to_string(),
            mechanics: crew,
        });
    }
    plan
}
