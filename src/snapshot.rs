//! Project snapshot adapter.
//!
//! Normalizes raw persistence records (string ISO dates, optional fields)
//! into the validated, immutable [`ProjectSnapshot`] the engines consume.
//! Validation is fail-fast: the first malformed record aborts the build and
//! no partial snapshot is produced.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    Phase, ProjectSnapshot, Resource, ResourceAssignment, Task, DEFAULT_WEEKLY_CAPACITY,
};

/// Errors raised while normalizing persistence records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Malformed date {value:?} on {entity}")]
    MalformedDate { entity: String, value: String },
    #[error("Task {0} ends before it starts")]
    EndBeforeStart(String),
    #[error("Phase {0} ends before it starts")]
    PhaseEndBeforeStart(String),
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),
    #[error("Duplicate resource id: {0}")]
    DuplicateResourceId(String),
    #[error("Resource {0} has non-positive weekly capacity")]
    InvalidWeeklyCapacity(String),
}

/// Raw assignment record as stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub resource_id: String,
    pub allocation_percent: f64,
}

/// Raw task record as stored. Dates are ISO-8601 strings; phase metadata is
/// carried by the enclosing phase record, not the task itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub resource_assignments: Vec<AssignmentRecord>,
}

/// Raw phase record as stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub resource_assignments: Vec<AssignmentRecord>,
}

/// Raw resource record as stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Missing capacity falls back to [`DEFAULT_WEEKLY_CAPACITY`].
    pub weekly_capacity: Option<f64>,
}

/// A whole project as received from the persistence layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(default)]
    pub phases: Vec<PhaseRecord>,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

fn parse_date(entity: &str, value: &str) -> Result<NaiveDate, SnapshotError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| SnapshotError::MalformedDate {
        entity: entity.to_string(),
        value: value.to_string(),
    })
}

fn convert_assignments(records: &[AssignmentRecord]) -> Vec<ResourceAssignment> {
    records
        .iter()
        .map(|a| ResourceAssignment {
            resource_id: a.resource_id.clone(),
            allocation_percent: a.allocation_percent,
        })
        .collect()
}

/// Build a validated snapshot from raw persistence records.
pub fn build_snapshot(record: &ProjectRecord) -> Result<ProjectSnapshot, SnapshotError> {
    let mut task_ids: FxHashSet<&str> = FxHashSet::default();
    let mut phases = Vec::with_capacity(record.phases.len());

    for phase_record in &record.phases {
        let phase_entity = format!("phase {}", phase_record.id);
        let phase_start = parse_date(&phase_entity, &phase_record.start_date)?;
        let phase_end = parse_date(&phase_entity, &phase_record.end_date)?;
        if phase_end < phase_start {
            return Err(SnapshotError::PhaseEndBeforeStart(phase_record.id.clone()));
        }

        let mut tasks = Vec::with_capacity(phase_record.tasks.len());
        for task_record in &phase_record.tasks {
            if !task_ids.insert(task_record.id.as_str()) {
                return Err(SnapshotError::DuplicateTaskId(task_record.id.clone()));
            }
            let task_entity = format!("task {}", task_record.id);
            let start = parse_date(&task_entity, &task_record.start_date)?;
            let end = parse_date(&task_entity, &task_record.end_date)?;
            if end < start {
                return Err(SnapshotError::EndBeforeStart(task_record.id.clone()));
            }

            tasks.push(Task {
                id: task_record.id.clone(),
                name: task_record.name.clone(),
                start_date: start,
                end_date: end,
                phase_id: phase_record.id.clone(),
                phase_name: phase_record.name.clone(),
                phase_color: phase_record.color.clone(),
                assignments: convert_assignments(&task_record.resource_assignments),
            });
        }

        phases.push(Phase {
            id: phase_record.id.clone(),
            name: phase_record.name.clone(),
            color: phase_record.color.clone(),
            start_date: phase_start,
            end_date: phase_end,
            tasks,
            assignments: convert_assignments(&phase_record.resource_assignments),
        });
    }

    let mut resource_ids: FxHashSet<&str> = FxHashSet::default();
    let mut resources = Vec::with_capacity(record.resources.len());
    for resource_record in &record.resources {
        if !resource_ids.insert(resource_record.id.as_str()) {
            return Err(SnapshotError::DuplicateResourceId(resource_record.id.clone()));
        }
        let weekly_capacity = resource_record
            .weekly_capacity
            .unwrap_or(DEFAULT_WEEKLY_CAPACITY);
        if weekly_capacity <= 0.0 {
            return Err(SnapshotError::InvalidWeeklyCapacity(
                resource_record.id.clone(),
            ));
        }
        resources.push(Resource {
            id: resource_record.id.clone(),
            name: resource_record.name.clone(),
            category: resource_record.category.clone(),
            weekly_capacity,
        });
    }

    Ok(ProjectSnapshot { phases, resources })
}
