//! Per-resource weekly capacity aggregation.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{round_half_even, Phase, Resource, ResourceAssignment};

use super::week::{week_buckets, working_day_overlap, WeekBucket};

/// Allocation percentage above which a resource-week is overallocated.
const OVERALLOCATION_THRESHOLD: f64 = 100.0;
/// Allocation percentage at which a resource-week becomes at-risk.
const AT_RISK_THRESHOLD: f64 = 80.0;

/// Errors that fail a capacity calculation. There are no partial results:
/// the first invalid record aborts the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapacityError {
    #[error("Project end precedes project start")]
    InvalidProjectSpan,
    #[error("Task {0} ends before it starts")]
    InvalidTaskSpan(String),
    #[error("Phase {0} ends before it starts")]
    InvalidPhaseSpan(String),
    #[error("Resource {0} has no usable weekly capacity")]
    MissingWeeklyCapacity(String),
    #[error("Capacity worker failed: {0}")]
    Boundary(String),
    #[error("Capacity worker is no longer running")]
    WorkerClosed,
}

/// Input for one capacity calculation, as carried across the worker
/// boundary. Manual override keys are `resourceId_weekIdentifier`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInput {
    pub phases: Vec<Phase>,
    pub resources: Vec<Resource>,
    pub project_start_date: NaiveDate,
    pub project_end_date: NaiveDate,
    #[serde(default)]
    pub manual_overrides: HashMap<String, f64>,
}

/// One task or phase-level allocation feeding a resource-week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekContribution {
    pub source_id: String,
    pub source_name: String,
    pub phase_name: String,
    pub percent: f64,
}

/// A resource's computed load for one week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceWeekAllocation {
    pub resource_id: String,
    pub week_identifier: String,
    pub allocated_percent: f64,
    pub allocated_days: f64,
    pub available_percent: f64,
    pub available_days: f64,
    pub contributions: Vec<WeekContribution>,
    pub is_overallocated: bool,
    pub is_at_risk: bool,
    pub is_manual_override: bool,
    pub manual_override_value: Option<f64>,
}

/// Whole-timeline rollup for one resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapacitySummary {
    pub total_allocated_days: f64,
    pub total_available_days: f64,
    pub average_utilization: f64,
    pub overallocated_weeks: usize,
    pub at_risk_weeks: usize,
}

/// Capacity result for one resource across the project timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapacityResult {
    pub resource_id: String,
    pub resource_name: String,
    pub weeks: Vec<ResourceWeekAllocation>,
    pub summary: ResourceCapacitySummary,
}

/// A task or phase span with its per-week working-day overlap precomputed.
struct SpanLoad<'a> {
    source_id: &'a str,
    source_name: &'a str,
    phase_name: &'a str,
    assignments: &'a [ResourceAssignment],
    week_overlap: Vec<u32>,
}

/// Aggregate per-resource weekly allocation across Monday-aligned weeks.
///
/// For each task a resource is assigned to, its weekly contribution is
/// `(working-day overlap / weekly capacity) * allocation percent`;
/// phase-level assignments contribute analogously over the phase span.
/// Manual overrides replace the computed percentage entirely for that
/// resource-week pair.
pub fn calculate_capacity(
    input: &CalculatorInput,
) -> Result<Vec<ResourceCapacityResult>, CapacityError> {
    if input.project_end_date < input.project_start_date {
        return Err(CapacityError::InvalidProjectSpan);
    }
    for phase in &input.phases {
        if phase.end_date < phase.start_date {
            return Err(CapacityError::InvalidPhaseSpan(phase.id.clone()));
        }
        for task in &phase.tasks {
            if task.end_date < task.start_date {
                return Err(CapacityError::InvalidTaskSpan(task.id.clone()));
            }
        }
    }
    for resource in &input.resources {
        if resource.weekly_capacity <= 0.0 {
            return Err(CapacityError::MissingWeeklyCapacity(resource.id.clone()));
        }
    }

    let weeks = week_buckets(input.project_start_date, input.project_end_date);
    debug!(
        weeks = weeks.len(),
        resources = input.resources.len(),
        "aggregating weekly capacity"
    );

    let loads = build_span_loads(&input.phases, &weeks);

    let mut results = Vec::with_capacity(input.resources.len());
    for resource in &input.resources {
        results.push(resource_weeks(resource, &weeks, &loads, &input.manual_overrides));
    }
    Ok(results)
}

/// Precompute each task's and phase's working-day overlap with every week.
fn build_span_loads<'a>(phases: &'a [Phase], weeks: &[WeekBucket]) -> Vec<SpanLoad<'a>> {
    let mut loads = Vec::new();
    for phase in phases {
        for task in &phase.tasks {
            if task.assignments.is_empty() {
                continue;
            }
            loads.push(SpanLoad {
                source_id: &task.id,
                source_name: &task.name,
                phase_name: &task.phase_name,
                assignments: &task.assignments,
                week_overlap: weeks
                    .iter()
                    .map(|w| working_day_overlap(task.start_date, task.end_date, w.start, w.end))
                    .collect(),
            });
        }
        if !phase.assignments.is_empty() {
            loads.push(SpanLoad {
                source_id: &phase.id,
                source_name: &phase.name,
                phase_name: &phase.name,
                assignments: &phase.assignments,
                week_overlap: weeks
                    .iter()
                    .map(|w| working_day_overlap(phase.start_date, phase.end_date, w.start, w.end))
                    .collect(),
            });
        }
    }
    loads
}

fn resource_weeks(
    resource: &Resource,
    weeks: &[WeekBucket],
    loads: &[SpanLoad<'_>],
    manual_overrides: &HashMap<String, f64>,
) -> ResourceCapacityResult {
    let capacity = resource.weekly_capacity;
    let mut week_rows = Vec::with_capacity(weeks.len());

    for (week_idx, week) in weeks.iter().enumerate() {
        let mut computed_percent = 0.0;
        let mut contributions = Vec::new();

        for load in loads {
            let overlap = load.week_overlap[week_idx];
            if overlap == 0 {
                continue;
            }
            for assignment in load.assignments {
                if assignment.resource_id != resource.id {
                    continue;
                }
                let percent = overlap as f64 / capacity * assignment.allocation_percent;
                if percent > 0.0 {
                    computed_percent += percent;
                    contributions.push(WeekContribution {
                        source_id: load.source_id.to_string(),
                        source_name: load.source_name.to_string(),
                        phase_name: load.phase_name.to_string(),
                        percent: round_half_even(percent, 2),
                    });
                }
            }
        }

        let override_key = format!("{}_{}", resource.id, week.identifier);
        let manual_override_value = manual_overrides.get(&override_key).copied();
        // An override replaces the computed percentage entirely; it is never
        // merged with computed contributions.
        let allocated_percent = round_half_even(
            manual_override_value.unwrap_or(computed_percent),
            2,
        );

        let allocated_days = round_half_even(allocated_percent / 100.0 * capacity, 2);
        let available_percent =
            round_half_even((100.0 - allocated_percent).max(0.0), 2);
        let available_days =
            round_half_even((capacity - allocated_percent / 100.0 * capacity).max(0.0), 2);

        week_rows.push(ResourceWeekAllocation {
            resource_id: resource.id.clone(),
            week_identifier: week.identifier.clone(),
            allocated_percent,
            allocated_days,
            available_percent,
            available_days,
            contributions,
            is_overallocated: allocated_percent > OVERALLOCATION_THRESHOLD,
            is_at_risk: allocated_percent >= AT_RISK_THRESHOLD
                && allocated_percent <= OVERALLOCATION_THRESHOLD,
            is_manual_override: manual_override_value.is_some(),
            manual_override_value,
        });
    }

    let total_allocated_days =
        round_half_even(week_rows.iter().map(|w| w.allocated_days).sum(), 2);
    let total_available_days =
        round_half_even(week_rows.iter().map(|w| w.available_days).sum(), 2);
    // Utilization is measured against the standard five-day week regardless
    // of the resource's own capacity setting.
    let average_utilization = if weeks.is_empty() {
        0.0
    } else {
        round_half_even(
            total_allocated_days / (weeks.len() as f64 * 5.0) * 100.0,
            2,
        )
    };

    ResourceCapacityResult {
        resource_id: resource.id.clone(),
        resource_name: resource.name.clone(),
        summary: ResourceCapacitySummary {
            total_allocated_days,
            total_available_days,
            average_utilization,
            overallocated_weeks: week_rows.iter().filter(|w| w.is_overallocated).count(),
            at_risk_weeks: week_rows.iter().filter(|w| w.is_at_risk).count(),
        },
        weeks: week_rows,
    }
}
