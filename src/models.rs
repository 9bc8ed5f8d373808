//! Snapshot value types for the schedule analytics core.
//!
//! These are the immutable inputs shared by the critical path engine, the
//! advisor, and the capacity calculator. They are produced by the snapshot
//! adapter (`crate::snapshot`) from raw persistence records and are never
//! mutated by any engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default weekly capacity in working days for a resource.
pub const DEFAULT_WEEKLY_CAPACITY: f64 = 5.0;

/// One resource assignment on a task or phase.
///
/// `allocation_percent` is the share of the resource's full weekly capacity
/// consumed by this assignment; it may exceed 100 (signalling overbooking).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAssignment {
    pub resource_id: String,
    pub allocation_percent: f64,
}

/// A scheduled task with inclusive calendar dates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub phase_id: String,
    pub phase_name: String,
    pub phase_color: String,
    #[serde(rename = "resourceAssignments", default)]
    pub assignments: Vec<ResourceAssignment>,
}

impl Task {
    /// Inclusive duration in calendar days. A milestone (start == end)
    /// contributes zero duration to schedule math.
    pub fn duration_days(&self) -> f64 {
        if self.is_milestone() {
            return 0.0;
        }
        ((self.end_date - self.start_date).num_days() + 1) as f64
    }

    /// A task whose start and end coincide is a milestone marker.
    pub fn is_milestone(&self) -> bool {
        self.start_date == self.end_date
    }

    /// Day offset of this task's start from the given project start.
    pub fn start_offset(&self, project_start: NaiveDate) -> f64 {
        (self.start_date - project_start).num_days() as f64
    }
}

/// A phase grouping tasks. Phases carry color/grouping metadata and may hold
/// their own resource assignments (which feed capacity, not critical path).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub name: String,
    pub color: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(rename = "resourceAssignments", default)]
    pub assignments: Vec<ResourceAssignment>,
}

/// A resource that can be assigned to tasks and phases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Working days available per week (default 5).
    pub weekly_capacity: f64,
}

/// A normalized, validated project snapshot.
///
/// Built once by the snapshot adapter; every engine call takes it by shared
/// reference and recomputes its derived values from scratch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub phases: Vec<Phase>,
    pub resources: Vec<Resource>,
}

impl ProjectSnapshot {
    /// Iterate all tasks across all phases in phase order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases.iter().flat_map(|p| p.tasks.iter())
    }

    /// Number of tasks across all phases.
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    /// The inclusive span (earliest task start, latest task end), if the
    /// project has any tasks.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.tasks().map(|t| t.start_date).min()?;
        let end = self.tasks().map(|t| t.end_date).max()?;
        Some((start, end))
    }

    /// Look up a task by id.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.id == task_id)
    }
}

/// Round half-to-even at the given number of decimal places.
///
/// All percentages and day totals reported by the engines pass through this
/// so results are bit-identical across runs and platforms.
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}
