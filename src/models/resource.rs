//! Staffing pools and capacity plans.
//!
//! Capacity is tracked per pool: a `(team, shift, role)` triple. A pool's
//! headcount bounds the total crew of tasks running in it at any instant.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1.2

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Role, Task};

/// Identity of a staffing pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolKey {
    pub team: String,
    pub shift: String,
    pub role: Role,
}

impl PoolKey {
    /// Creates a pool key.
    pub fn new(team: impl Into<String>, shift: impl Into<String>, role: Role) -> Self {
        Self {
            team: team.into(),
            shift: shift.into(),
            role,
        }
    }

    /// Pool a task draws from.
    pub fn for_task(task: &Task) -> Self {
        Self::new(task.team.clone(), task.shift.clone(), task.role())
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.team, self.shift, self.role)
    }
}

/// Headcount pair for one scenario trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffingConfig {
    /// Headcount of every mechanic pool.
    pub mechanics: u32,
    /// Headcount of every quality-inspector pool.
    pub quality: u32,
}

impl StaffingConfig {
    /// Creates a staffing configuration.
    pub fn new(mechanics: u32, quality: u32) -> Self {
        Self { mechanics, quality }
    }

    /// Total people across both roles.
    #[inline]
    pub fn total(&self) -> u32 {
        self.mechanics + self.quality
    }

    /// Headcount for a role.
    #[inline]
    pub fn for_role(&self, role: Role) -> u32 {
        match role {
            Role::Mechanic => self.mechanics,
            Role::Quality => self.quality,
        }
    }
}

impl fmt::Display for StaffingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}M/{}Q", self.mechanics, self.quality)
    }
}

/// Current headcount of one pool, as listed in plant settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub team: String,
    pub shift: String,
    pub role: Role,
    pub headcount: u32,
}

impl RosterEntry {
    /// Creates a roster entry.
    pub fn new(
        team: impl Into<String>,
        shift: impl Into<String>,
        role: Role,
        headcount: u32,
    ) -> Self {
        Self {
            team: team.into(),
            shift: shift.into(),
            role,
            headcount,
        }
    }

    /// Pool this entry staffs.
    pub fn pool(&self) -> PoolKey {
        PoolKey::new(self.team.clone(), self.shift.clone(), self.role)
    }
}

/// Headcount source for one scheduling run.
#[derive(Debug, Clone, PartialEq)]
pub enum CapacityPlan {
    /// Per-pool headcount from the roster. Unlisted pools have no staff.
    Roster(HashMap<PoolKey, u32>),
    /// Same headcount for every pool of a role.
    Uniform(StaffingConfig),
}

impl CapacityPlan {
    /// Builds a roster plan; repeated pools add up.
    pub fn from_roster(entries: &[RosterEntry]) -> Self {
        let mut pools: HashMap<PoolKey, u32> = HashMap::new();
        for entry in entries {
            *pools.entry(entry.pool()).or_insert(0) += entry.headcount;
        }
        CapacityPlan::Roster(pools)
    }

    /// Builds a uniform plan.
    pub fn uniform(staffing: StaffingConfig) -> Self {
        CapacityPlan::Uniform(staffing)
    }

    /// Configured headcount of a pool.
    pub fn headcount(&self, pool: &PoolKey) -> u32 {
        match self {
            CapacityPlan::Roster(pools) => pools.get(pool).copied().unwrap_or(0),
            CapacityPlan::Uniform(staffing) => staffing.for_role(pool.role),
        }
    }

    /// Staffing pair when the plan is uniform.
    pub fn staffing(&self) -> Option<StaffingConfig> {
        match self {
            CapacityPlan::Uniform(staffing) => Some(*staffing),
            CapacityPlan::Roster(_) => None,
        }
    }
}
