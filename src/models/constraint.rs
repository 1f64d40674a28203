//! Precedence constraints.
//!
//! A precedence constraint orders two tasks' start/finish times. The set of
//! relationships is closed over the three forms the allocator and the
//! critical-path passes understand.
//!
//! # Reference
//! Brucker (2007), "Scheduling Algorithms", Ch. 2

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Timing relationship between a predecessor and a successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Relationship {
    /// `end(p) <= start(s)`.
    #[default]
    FinishToStart,
    /// `end(p) <= end(s)`.
    FinishToFinish,
    /// `start(p) <= start(s)`.
    StartToStart,
}

impl Relationship {
    /// Report label, e.g. `"Finish <= Start"`.
    pub fn label(&self) -> &'static str {
        match self {
            Relationship::FinishToStart => "Finish <= Start",
            Relationship::FinishToFinish => "Finish <= Finish",
            Relationship::StartToStart => "Start <= Start",
        }
    }

    /// Lower bound this edge imposes on the successor's start.
    ///
    /// `pred_start`/`pred_end` are the predecessor's times, `succ_duration`
    /// the successor's duration.
    #[inline]
    pub fn successor_start_bound(&self, pred_start: i64, pred_end: i64, succ_duration: i64) -> i64 {
        match self {
            Relationship::FinishToStart => pred_end,
            Relationship::FinishToFinish => pred_end - succ_duration,
            Relationship::StartToStart => pred_start,
        }
    }

    /// Whether the pair of placed intervals satisfies this relationship.
    #[inline]
    pub fn is_satisfied(&self, pred: (i64, i64), succ: (i64, i64)) -> bool {
        match self {
            Relationship::FinishToStart => pred.1 <= succ.0,
            Relationship::FinishToFinish => pred.1 <= succ.1,
            Relationship::StartToStart => pred.0 <= succ.0,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_lowercase().as_str() {
            "fs" | "finish<=start" | "finishtostart" => Ok(Relationship::FinishToStart),
            "ff" | "finish<=finish" | "finishtofinish" => Ok(Relationship::FinishToFinish),
            "ss" | "start<=start" | "starttostart" => Ok(Relationship::StartToStart),
            _ => Err(format!("unknown relationship '{s}'")),
        }
    }
}

/// Why a constraint exists in the effective graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintOrigin {
    /// Listed in the catalog.
    Catalog,
    /// A late part must arrive before the task it feeds.
    LatePart,
    /// Rework must finish before its primary task.
    Rework,
    /// Inspection gate after a primary task.
    QualityGate,
}

/// A precedence constraint between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precedence {
    /// Task that constrains.
    pub predecessor: String,
    /// Task that is constrained.
    pub successor: String,
    /// Timing relationship.
    pub relationship: Relationship,
    /// Where the constraint came from.
    pub origin: ConstraintOrigin,
}

impl Precedence {
    /// Creates a catalog finish-to-start constraint.
    pub fn finish_to_start(predecessor: impl Into<String>, successor: impl Into<String>) -> Self {
        Self::new(predecessor, successor, Relationship::FinishToStart)
    }

    /// Creates a catalog constraint with the given relationship.
    pub fn new(
        predecessor: impl Into<String>,
        successor: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        Self {
            predecessor: predecessor.into(),
            successor: successor.into(),
            relationship,
            origin: ConstraintOrigin::Catalog,
        }
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: ConstraintOrigin) -> Self {
        self.origin = origin;
        self
    }
}
