//! Task catalog and plant settings.
//!
//! The catalog is the immutable input of one scheduling run: tasks, the
//! precedence rows listed with them, and the plant settings (horizon start,
//! roster, shift windows, product-line delivery dates). It is loaded fresh
//! for every run so no state leaks between runs.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{Precedence, RosterEntry, ShiftCalendar, Task, TaskType};

/// Delivery target of a product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub name: String,
    pub due: NaiveDateTime,
}

impl ProductLine {
    /// Creates a product line with a due date.
    pub fn new(name: impl Into<String>, due: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            due,
        }
    }
}

/// Plant-level settings shared by every task of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSettings {
    /// Scheduling time 0.
    pub horizon_start: NaiveDateTime,
    /// Current headcount per pool.
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
    /// Daily working windows per shift. Shifts without an entry are always open.
    #[serde(default)]
    pub shifts: Vec<ShiftCalendar>,
    /// Product-line delivery dates.
    #[serde(default)]
    pub product_lines: Vec<ProductLine>,
}

impl PlantSettings {
    /// Creates settings with only a horizon start.
    pub fn new(horizon_start: NaiveDateTime) -> Self {
        Self {
            horizon_start,
            roster: Vec::new(),
            shifts: Vec::new(),
            product_lines: Vec::new(),
        }
    }

    /// Adds a roster entry.
    pub fn with_roster(mut self, entry: RosterEntry) -> Self {
        self.roster.push(entry);
        self
    }

    /// Adds a shift window.
    pub fn with_shift(mut self, shift: ShiftCalendar) -> Self {
        self.shifts.push(shift);
        self
    }

    /// Adds a product line.
    pub fn with_product_line(mut self, line: ProductLine) -> Self {
        self.product_lines.push(line);
        self
    }
}

/// In-memory task catalog for one scheduling run.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    plant: PlantSettings,
    tasks: Vec<Task>,
    precedences: Vec<Precedence>,
    index: HashMap<String, usize>,
}

impl TaskCatalog {
    /// Creates an empty catalog.
    pub fn new(plant: PlantSettings) -> Self {
        Self {
            plant,
            tasks: Vec::new(),
            precedences: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a task. The first task with a given ID wins lookups;
    /// duplicates are reported by validation.
    pub fn add_task(&mut self, task: Task) {
        self.index
            .entry(task.task_id.clone())
            .or_insert(self.tasks.len());
        self.tasks.push(task);
    }

    /// Adds a catalog precedence row.
    pub fn add_precedence(&mut self, precedence: Precedence) {
        self.precedences.push(precedence);
    }

    /// Builder: adds a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.add_task(task);
        self
    }

    /// Builder: adds a precedence row.
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.add_precedence(precedence);
        self
    }

    /// All tasks in load order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Catalog precedence rows.
    pub fn precedences(&self) -> &[Precedence] {
        &self.precedences
    }

    /// Plant settings.
    pub fn plant(&self) -> &PlantSettings {
        &self.plant
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the catalog has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Position of a task in load order.
    pub fn index_of(&self, task_id: &str) -> Option<usize> {
        self.index.get(task_id).copied()
    }

    /// Looks up a task by ID.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.index_of(task_id).map(|i| &self.tasks[i])
    }

    /// Scheduling time 0.
    pub fn horizon_start(&self) -> NaiveDateTime {
        self.plant.horizon_start
    }

    /// Minute of day at scheduling time 0.
    pub fn epoch_offset(&self) -> i64 {
        i64::from(self.plant.horizon_start.time().num_seconds_from_midnight() / 60)
    }

    /// Converts an absolute time to scheduling minutes.
    pub fn to_minutes(&self, at: NaiveDateTime) -> i64 {
        (at - self.plant.horizon_start).num_minutes()
    }

    /// Converts scheduling minutes to an absolute time.
    pub fn to_datetime(&self, minutes: i64) -> NaiveDateTime {
        self.plant.horizon_start + Duration::minutes(minutes)
    }

    /// Working window of a shift, if one is configured.
    pub fn shift_calendar(&self, shift: &str) -> Option<&ShiftCalendar> {
        self.plant.shifts.iter().find(|s| s.shift == shift)
    }

    /// Due time of a task in scheduling minutes (task due, else product-line due).
    pub fn due_minutes(&self, task: &Task) -> Option<i64> {
        task.due
            .or_else(|| {
                self.plant
                    .product_lines
                    .iter()
                    .find(|p| p.name == task.product_line)
                    .map(|p| p.due)
            })
            .map(|due| self.to_minutes(due))
    }

    /// Earliest start of a task in scheduling minutes.
    ///
    /// Late parts additionally wait `late_part_delay` minutes after on-dock.
    pub fn release_minutes(&self, task: &Task, late_part_delay: i64) -> i64 {
        let Some(on_dock) = task.on_dock else {
            return 0;
        };
        let mut release = self.to_minutes(on_dock);
        if task.task_type == TaskType::LatePart {
            release += late_part_delay;
        }
        release.max(0)
    }
}
