//! Task catalog loading.
//!
//! [`CatalogSource`] is the seam between the engine and wherever task data
//! lives. [`CsvCatalogSource`] reads one task per row:
//!
//! | Column | Required | Notes |
//! |--------|----------|-------|
//! | `task_id` | yes | |
//! | `task_type` | no | `Production`, `Quality Inspection`, `Late Part`, `Rework` |
//! | `display_name` | no | defaults to the id |
//! | `duration_minutes` | yes | |
//! | `mechanics_required` | no | defaults to 1 |
//! | `is_quality` | no | `true/false`, `yes/no`, `1/0` |
//! | `team`, `shift`, `product_line` | no | |
//! | `predecessors` | no | `;`-separated `ID` or `ID:REL` |
//! | `due`, `on_dock` | no | `%Y-%m-%d %H:%M` or `%Y-%m-%dT%H:%M:%S` |
//! | `attached_to` | no | primary task of an inspection, late part or rework |
//!
//! Every malformed row is reported, not just the first.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{PlanError, PlanResult};
use crate::models::{PlantSettings, Precedence, Relationship, Task, TaskCatalog, TaskType};
use crate::validation::{ValidationError, ValidationErrorKind};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Produces a fresh task catalog on every call.
pub trait CatalogSource {
    fn load(&self) -> PlanResult<TaskCatalog>;
}

impl CatalogSource for TaskCatalog {
    fn load(&self) -> PlanResult<TaskCatalog> {
        Ok(self.clone())
    }
}

/// CSV task file plus the plant settings it runs against.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    path: PathBuf,
    plant: PlantSettings,
}

impl CsvCatalogSource {
    pub fn new(path: impl Into<PathBuf>, plant: PlantSettings) -> Self {
        Self {
            path: path.into(),
            plant,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvCatalogSource {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn load(&self) -> PlanResult<TaskCatalog> {
        let file = File::open(&self.path)?;
        let catalog = read_tasks(file, self.plant.clone())?;
        debug!(tasks = catalog.len(), precedences = catalog.precedences().len(), "catalog loaded");
        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    task_id: String,
    #[serde(default)]
    task_type: String,
    #[serde(default)]
    display_name: String,
    duration_minutes: String,
    #[serde(default)]
    mechanics_required: String,
    #[serde(default)]
    is_quality: String,
    #[serde(default)]
    team: String,
    #[serde(default)]
    shift: String,
    #[serde(default)]
    product_line: String,
    #[serde(default)]
    predecessors: String,
    #[serde(default)]
    due: String,
    #[serde(default)]
    on_dock: String,
    #[serde(default)]
    attached_to: String,
}

/// Reads a task table from any reader.
///
/// # Errors
/// `DataValidation` with one `MalformedRow` entry per bad row; `Csv` if the
/// header itself cannot be read.
pub fn read_tasks<R: Read>(reader: R, plant: PlantSettings) -> PlanResult<TaskCatalog> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    reader.headers()?;

    let mut catalog = TaskCatalog::new(plant);
    let mut errors = Vec::new();
    for (i, result) in reader.deserialize::<TaskRow>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let parsed = result.map_err(|e| e.to_string()).and_then(parse_row);
        match parsed {
            Ok((task, precedences)) => {
                catalog.add_task(task);
                for p in precedences {
                    catalog.add_precedence(p);
                }
            }
            Err(message) => errors.push(ValidationError::new(
                ValidationErrorKind::MalformedRow,
                format!("line {line}: {message}"),
            )),
        }
    }

    if errors.is_empty() {
        Ok(catalog)
    } else {
        Err(PlanError::DataValidation(errors))
    }
}

fn parse_row(row: TaskRow) -> Result<(Task, Vec<Precedence>), String> {
    if row.task_id.is_empty() {
        return Err("task_id is empty".into());
    }
    let duration: i64 = row
        .duration_minutes
        .parse()
        .map_err(|_| format!("duration_minutes '{}' is not an integer", row.duration_minutes))?;
    let crew: u32 = if row.mechanics_required.is_empty() {
        1
    } else {
        row.mechanics_required
            .parse()
            .map_err(|_| format!("mechanics_required '{}' is not a count", row.mechanics_required))?
    };
    let task_type: TaskType = row.task_type.parse()?;

    let mut task = Task::new(row.task_id.as_str())
        .with_type(task_type)
        .with_duration(duration)
        .with_crew(crew)
        .with_quality(parse_flag(&row.is_quality)?)
        .on_team(row.team, row.shift)
        .with_product_line(row.product_line);
    if !row.display_name.is_empty() {
        task = task.with_name(row.display_name);
    }
    if let Some(due) = parse_date(&row.due)? {
        task = task.with_due(due);
    }
    if let Some(on_dock) = parse_date(&row.on_dock)? {
        task = task.with_on_dock(on_dock);
    }
    if !row.attached_to.is_empty() {
        task = task.attached_to(row.attached_to);
    }

    let precedences = parse_predecessors(&row.predecessors, &row.task_id)?;
    Ok((task, precedences))
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Ok(false),
        "true" | "yes" | "y" | "1" => Ok(true),
        _ => Err(format!("is_quality '{raw}' is not a flag")),
    }
}

fn parse_date(raw: &str) -> Result<Option<NaiveDateTime>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(Some)
        .ok_or_else(|| format!("'{raw}' is not a date"))
}

/// Parses `A;B:SS;C:Finish <= Finish` into constraints ending at `successor`.
fn parse_predecessors(raw: &str, successor: &str) -> Result<Vec<Precedence>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (id, relationship) = match item.split_once(':') {
                Some((id, rel)) => (id.trim(), rel.parse::<Relationship>()?),
                None => (item, Relationship::FinishToStart),
            };
            if id.is_empty() {
                return Err(format!("predecessor '{item}' has no task id"));
            }
            Ok(Precedence::new(id, successor, relationship))
        })
        .collect()
}
