//! Task model.
//!
//! A task is the smallest schedulable unit of production work. It belongs
//! to a team and shift, needs a crew drawn from either the mechanic pool or
//! the quality-inspector pool, and lasts a fixed number of minutes.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A production task to be scheduled.
///
/// Immutable for the duration of one scheduling run.
///
/// # Time Representation
/// `duration` is in minutes. Calendar fields (`due`, `on_dock`) are absolute
/// and are converted to minutes relative to the catalog horizon start when a
/// run begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub task_id: String,
    /// Production category.
    pub task_type: TaskType,
    /// Human-readable name.
    pub display_name: String,
    /// Processing time (minutes).
    pub duration: i64,
    /// Crew size drawn from the task's pool while it runs.
    pub mechanics_required: u32,
    /// Draws from the quality-inspector pool instead of the mechanic pool.
    pub is_quality: bool,
    /// Owning team.
    pub team: String,
    /// Shift the task is worked in.
    pub shift: String,
    /// Product line the task contributes to.
    pub product_line: String,
    /// Task-level due time. `None` = inherit the product line's due date.
    pub due: Option<NaiveDateTime>,
    /// Material availability (earliest start). `None` = available at horizon start.
    pub on_dock: Option<NaiveDateTime>,
    /// Primary task this one is attached to (late parts, rework, inspections).
    pub attached_to: Option<String>,
}

impl Task {
    /// Creates a production task with the given ID and a one-mechanic crew.
    pub fn new(task_id: impl Into<String>) -> Self {
        let task_id = task_id.into();
        Self {
            display_name: task_id.clone(),
            task_id,
            task_type: TaskType::Production,
            duration: 0,
            mechanics_required: 1,
            is_quality: false,
            team: String::new(),
            shift: String::new(),
            product_line: String::new(),
            due: None,
            on_dock: None,
            attached_to: None,
        }
    }

    /// Creates a quality inspection attached to `inspected`.
    pub fn inspection(task_id: impl Into<String>, inspected: impl Into<String>) -> Self {
        Self::new(task_id)
            .with_type(TaskType::QualityInspection)
            .with_quality(true)
            .attached_to(inspected)
    }

    /// Sets the task type.
    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the duration (minutes).
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration = minutes;
        self
    }

    /// Sets the crew size.
    pub fn with_crew(mut self, mechanics: u32) -> Self {
        self.mechanics_required = mechanics;
        self
    }

    /// Marks the task as drawing from the quality-inspector pool.
    pub fn with_quality(mut self, is_quality: bool) -> Self {
        self.is_quality = is_quality;
        self
    }

    /// Sets team and shift.
    pub fn on_team(mut self, team: impl Into<String>, shift: impl Into<String>) -> Self {
        self.team = team.into();
        self.shift = shift.into();
        self
    }

    /// Sets the product line.
    pub fn with_product_line(mut self, product_line: impl Into<String>) -> Self {
        self.product_line = product_line.into();
        self
    }

    /// Sets a task-level due time.
    pub fn with_due(mut self, due: NaiveDateTime) -> Self {
        self.due = Some(due);
        self
    }

    /// Sets the material on-dock time.
    pub fn with_on_dock(mut self, on_dock: NaiveDateTime) -> Self {
        self.on_dock = Some(on_dock);
        self
    }

    /// Attaches this task to a primary task.
    pub fn attached_to(mut self, primary: impl Into<String>) -> Self {
        self.attached_to = Some(primary.into());
        self
    }

    /// Which staffing pool the task draws from.
    pub fn role(&self) -> Role {
        if self.is_quality {
            Role::Quality
        } else {
            Role::Mechanic
        }
    }

    /// Whether the task occupies pool capacity at all.
    #[inline]
    pub fn needs_crew(&self) -> bool {
        self.mechanics_required > 0
    }
}

/// Production task category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    /// Regular assembly work.
    #[default]
    Production,
    /// Inspection performed by the quality pool.
    QualityInspection,
    /// Delivery of a part that arrives after the plan start.
    LatePart,
    /// Corrective work that must finish before its primary task.
    Rework,
}

impl TaskType {
    /// Display label used in reports and tabular input.
    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Production => "Production",
            TaskType::QualityInspection => "Quality Inspection",
            TaskType::LatePart => "Late Part",
            TaskType::Rework => "Rework",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "production" | "" => Ok(TaskType::Production),
            "qualityinspection" | "quality" | "qi" => Ok(TaskType::QualityInspection),
            "latepart" => Ok(TaskType::LatePart),
            "rework" => Ok(TaskType::Rework),
            _ => Err(format!("unknown task type '{s}'")),
        }
    }
}

/// Staffing pool a task draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mechanic,
    Quality,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Mechanic => f.write_str("mechanic"),
            Role::Quality => f.write_str("quality"),
        }
    }
}
