//! Input validation for task catalogs.
//!
//! Checks structural integrity of a catalog before any constraint is built.
//! Detects:
//! - Empty and duplicate task IDs
//! - Negative durations
//! - Precedence rows and attachments that reference unknown tasks
//! - Malformed or duplicate shift windows
//! - Crewed tasks longer than their shift window
//!
//! Cycles are detected later, on the effective constraint graph, because
//! derived constraints can close a cycle the catalog rows alone do not.

use std::collections::HashSet;

use crate::error::{PlanError, PlanResult};
use crate::models::{TaskCatalog, MINUTES_PER_DAY};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A task has an empty identifier.
    EmptyId,
    /// Two entities share the same ID.
    DuplicateId,
    /// Duration is negative.
    InvalidDuration,
    /// A precedence row or attachment names a task that doesn't exist.
    UnknownTaskReference,
    /// A task is attached to itself.
    InvalidAttachment,
    /// A shift window has minutes outside the day.
    InvalidShiftWindow,
    /// A crewed task cannot fit in one occurrence of its shift window.
    ExceedsShiftWindow,
    /// A tabular input row could not be read.
    MalformedRow,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a catalog, collecting every issue found.
pub fn validate_catalog(catalog: &TaskCatalog) -> ValidationResult {
    let mut errors = Vec::new();

    let mut task_ids = HashSet::new();
    for (row, task) in catalog.tasks().iter().enumerate() {
        if task.task_id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Task at position {row} has an empty ID"),
            ));
            continue;
        }
        if !task_ids.insert(task.task_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.task_id),
            ));
        }
        if task.duration < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Task '{}' has negative duration {}", task.task_id, task.duration),
            ));
        }
        if let Some(primary) = &task.attached_to {
            if primary == &task.task_id {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidAttachment,
                    format!("Task '{}' is attached to itself", task.task_id),
                ));
            } else if catalog.task(primary).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTaskReference,
                    format!(
                        "Task '{}' is attached to unknown task '{}'",
                        task.task_id, primary
                    ),
                ));
            }
        }
    }

    for p in catalog.precedences() {
        for id in [&p.predecessor, &p.successor] {
            if catalog.task(id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTaskReference,
                    format!(
                        "Constraint {} -> {} references unknown task '{}'",
                        p.predecessor, p.successor, id
                    ),
                ));
            }
        }
    }

    let mut shift_names = HashSet::new();
    for shift in &catalog.plant().shifts {
        if !shift_names.insert(shift.shift.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift window: {}", shift.shift),
            ));
        }
        let day = MINUTES_PER_DAY as u32;
        if shift.start_minute >= day || shift.end_minute > day {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShiftWindow,
                format!(
                    "Shift '{}' window {}..{} is outside the day",
                    shift.shift, shift.start_minute, shift.end_minute
                ),
            ));
        }
    }

    for task in catalog.tasks().iter().filter(|t| t.needs_crew()) {
        if let Some(calendar) = catalog.shift_calendar(&task.shift) {
            if task.duration > calendar.window_length() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ExceedsShiftWindow,
                    format!(
                        "Task '{}' lasts {} min but shift '{}' is open {} min",
                        task.task_id,
                        task.duration,
                        task.shift,
                        calendar.window_length()
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a catalog and converts failures into [`PlanError::DataValidation`].
pub fn ensure_valid(catalog: &TaskCatalog) -> PlanResult<()> {
    validate_catalog(catalog).map_err(PlanError::DataValidation)
}
