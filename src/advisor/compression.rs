//! Schedule compression suggestions: crashing and fast-tracking.

use serde::{Deserialize, Serialize};

use crate::critical_path::{calculate_critical_path, CriticalPathTask};
use crate::models::{round_half_even, ProjectSnapshot, Task};

use super::{AdvisorConfig, AdvisorError};

/// How much extra coordination a crashing move costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

/// How likely a fast-track pairing is to backfire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Shorten a critical task by adding staff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashingOpportunity {
    pub task_id: String,
    pub task_name: String,
    pub phase_name: String,
    pub duration_days: f64,
    pub assignment_count: usize,
    pub potential_savings_days: f64,
    pub effort: EffortLevel,
}

/// Run two normally sequential critical tasks in parallel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastTrackOpportunity {
    pub first_task_id: String,
    pub second_task_id: String,
    pub phase_name: String,
    pub potential_savings_days: f64,
    pub shared_resource_ids: Vec<String>,
    pub risk: RiskLevel,
}

/// All compression suggestions for a project, in stable order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub crashing: Vec<CrashingOpportunity>,
    pub fast_tracking: Vec<FastTrackOpportunity>,
}

/// Propose crashing and fast-tracking opportunities for the critical path.
///
/// Suggestions are emitted in ascending (early start, id) order so identical
/// input always yields identical output.
pub fn compression_suggestions(
    snapshot: &ProjectSnapshot,
    config: &AdvisorConfig,
) -> Result<CompressionReport, AdvisorError> {
    let analysis = calculate_critical_path(snapshot, &config.critical_path)?;
    let eps = config.critical_path.epsilon_days;

    // Crashing: critical tasks long enough to split and not already staffed
    // past the point of diminishing returns.
    let mut crashing = Vec::new();
    for entry in &analysis.critical_path {
        if entry.duration_days < config.min_crash_duration_days {
            continue;
        }
        let Some(task) = snapshot.task(&entry.id) else {
            continue;
        };
        let assignment_count = task.assignments.len();
        if assignment_count >= config.max_crash_assignments {
            continue;
        }

        // Ideal staffing model: adding one person to n equal workers cuts
        // the duration to n/(n+1) of itself.
        let workers = assignment_count.max(1) as f64;
        let savings = round_half_even(entry.duration_days / (workers + 1.0), 1);
        if savings < 0.5 {
            continue;
        }

        crashing.push(CrashingOpportunity {
            task_id: entry.id.clone(),
            task_name: entry.name.clone(),
            phase_name: entry.phase_name.clone(),
            duration_days: entry.duration_days,
            assignment_count,
            potential_savings_days: savings,
            effort: crash_effort(entry.duration_days, assignment_count),
        });
    }

    // Fast-tracking: consecutive critical tasks in the same phase sequence.
    // With no explicit dependency data, date adjacency is the proxy for a
    // sequential relationship.
    let mut fast_track_entries: Vec<(f64, FastTrackOpportunity)> = Vec::new();
    for phase in &snapshot.phases {
        let mut members: Vec<&CriticalPathTask> = analysis
            .critical_path
            .iter()
            .filter(|t| phase.tasks.iter().any(|pt| pt.id == t.id))
            .collect();
        members.sort_by(|a, b| {
            a.early_start
                .total_cmp(&b.early_start)
                .then_with(|| a.id.cmp(&b.id))
        });

        for pair in members.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            if second.early_start < first.early_finish - eps {
                continue; // already overlapping
            }
            let (Some(first_task), Some(second_task)) =
                (snapshot.task(&first.id), snapshot.task(&second.id))
            else {
                continue;
            };

            let overlap = shared_allocation_overlap(first_task, second_task);
            let shared_resource_ids = shared_resources(first_task, second_task);
            let risk = if shared_resource_ids.is_empty() {
                RiskLevel::Low
            } else if overlap <= config.fast_track_medium_overlap {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            };

            fast_track_entries.push((
                first.early_start,
                FastTrackOpportunity {
                    first_task_id: first.id.clone(),
                    second_task_id: second.id.clone(),
                    phase_name: phase.name.clone(),
                    potential_savings_days: first.duration_days.min(second.duration_days),
                    shared_resource_ids,
                    risk,
                },
            ));
        }
    }
    fast_track_entries.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.first_task_id.cmp(&b.1.first_task_id))
    });
    let fast_tracking: Vec<FastTrackOpportunity> =
        fast_track_entries.into_iter().map(|(_, f)| f).collect();

    Ok(CompressionReport {
        crashing,
        fast_tracking,
    })
}

fn crash_effort(duration_days: f64, assignment_count: usize) -> EffortLevel {
    if duration_days > 10.0 || assignment_count >= 2 {
        EffortLevel::High
    } else if duration_days > 5.0 {
        EffortLevel::Medium
    } else {
        EffortLevel::Low
    }
}

/// Resource ids assigned to both tasks, in first-task assignment order.
fn shared_resources(a: &Task, b: &Task) -> Vec<String> {
    a.assignments
        .iter()
        .filter(|x| b.assignments.iter().any(|y| y.resource_id == x.resource_id))
        .map(|x| x.resource_id.clone())
        .collect()
}

/// Combined allocation the two tasks would contend for if run in parallel:
/// the sum over shared resources of the smaller allocation.
fn shared_allocation_overlap(a: &Task, b: &Task) -> f64 {
    a.assignments
        .iter()
        .filter_map(|x| {
            b.assignments
                .iter()
                .find(|y| y.resource_id == x.resource_id)
                .map(|y| x.allocation_percent.min(y.allocation_percent))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, ResourceAssignment};
    use chrono::NaiveDate;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn task(id: &str, start: NaiveDate, end: NaiveDate, resources: &[(&str, f64)]) -> Task {
        Task {
            id: id.to_string(),
            name: id.to_string(),
            start_date: start,
            end_date: end,
            phase_id: "p1".to_string(),
            phase_name: "Build".to_string(),
            phase_color: "#224466".to_string(),
            assignments: resources
                .iter()
                .map(|(rid, pct)| ResourceAssignment {
                    resource_id: rid.to_string(),
                    allocation_percent: *pct,
                })
                .collect(),
        }
    }

    fn project(tasks: Vec<Task>) -> ProjectSnapshot {
        let start = tasks.iter().map(|t| t.start_date).min().unwrap();
        let end = tasks.iter().map(|t| t.end_date).max().unwrap();
        ProjectSnapshot {
            phases: vec![Phase {
                id: "p1".to_string(),
                name: "Build".to_string(),
                color: "#224466".to_string(),
                start_date: start,
                end_date: end,
                tasks,
                assignments: vec![],
            }],
            resources: vec![],
        }
    }

    #[test]
    fn test_crashing_savings_and_effort() {
        let snapshot = project(vec![
            task("a", d(2025, 1, 1), d(2025, 1, 5), &[("r1", 100.0)]),
            task("b", d(2025, 1, 6), d(2025, 1, 15), &[("r1", 100.0)]),
            task("c", d(2025, 1, 16), d(2025, 1, 20), &[("r1", 100.0)]),
        ]);
        let report = compression_suggestions(&snapshot, &AdvisorConfig::default()).unwrap();

        assert_eq!(report.crashing.len(), 3);
        let a = &report.crashing[0];
        assert_eq!(a.task_id, "a");
        assert_eq!(a.potential_savings_days, 2.5);
        assert_eq!(a.effort, EffortLevel::Low);
        let b = &report.crashing[1];
        assert_eq!(b.potential_savings_days, 5.0);
        assert_eq!(b.effort, EffortLevel::Medium);
    }

    #[test]
    fn test_short_or_fully_staffed_tasks_not_crashed() {
        let snapshot = project(vec![
            // Too short to crash.
            task("a", d(2025, 1, 1), d(2025, 1, 2), &[("r1", 100.0)]),
            // Staffed past the useful limit.
            task(
                "b",
                d(2025, 1, 3),
                d(2025, 1, 12),
                &[("r1", 50.0), ("r2", 50.0), ("r3", 50.0)],
            ),
            task("c", d(2025, 1, 13), d(2025, 1, 20), &[("r1", 100.0)]),
        ]);
        let report = compression_suggestions(&snapshot, &AdvisorConfig::default()).unwrap();
        let ids: Vec<&str> = report.crashing.iter().map(|c| c.task_id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_fast_track_shared_resource_risk() {
        let snapshot = project(vec![
            task("a", d(2025, 1, 1), d(2025, 1, 5), &[("r1", 100.0)]),
            task("b", d(2025, 1, 6), d(2025, 1, 15), &[("r1", 100.0)]),
            task("c", d(2025, 1, 16), d(2025, 1, 20), &[("r2", 100.0)]),
        ]);
        let report = compression_suggestions(&snapshot, &AdvisorConfig::default()).unwrap();

        assert_eq!(report.fast_tracking.len(), 2);
        let ab = &report.fast_tracking[0];
        assert_eq!((ab.first_task_id.as_str(), ab.second_task_id.as_str()), ("a", "b"));
        assert_eq!(ab.potential_savings_days, 5.0);
        assert_eq!(ab.shared_resource_ids, vec!["r1".to_string()]);
        assert_eq!(ab.risk, RiskLevel::High);

        let bc = &report.fast_tracking[1];
        assert!(bc.shared_resource_ids.is_empty());
        assert_eq!(bc.risk, RiskLevel::Low);
    }

    #[test]
    fn test_fast_track_medium_risk_on_partial_overlap() {
        let snapshot = project(vec![
            task("a", d(2025, 1, 1), d(2025, 1, 5), &[("r1", 40.0), ("r2", 100.0)]),
            task("b", d(2025, 1, 6), d(2025, 1, 15), &[("r1", 60.0), ("r3", 100.0)]),
        ]);
        let report = compression_suggestions(&snapshot, &AdvisorConfig::default()).unwrap();
        let ab = &report.fast_tracking[0];
        // Shared r1 at min(40, 60) = 40 <= 50 medium threshold.
        assert_eq!(ab.risk, RiskLevel::Medium);
    }

    #[test]
    fn test_suggestions_are_deterministic() {
        let snapshot = project(vec![
            task("a", d(2025, 1, 1), d(2025, 1, 5), &[("r1", 100.0)]),
            task("b", d(2025, 1, 6), d(2025, 1, 15), &[("r1", 100.0)]),
            task("c", d(2025, 1, 16), d(2025, 1, 20), &[("r2", 100.0)]),
        ]);
        let config = AdvisorConfig::default();
        let first = compression_suggestions(&snapshot, &config).unwrap();
        let second = compression_suggestions(&snapshot, &config).unwrap();
        assert_eq!(first, second);
    }
}
