//! Task delay impact simulation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::critical_path::calculate_critical_path;
use crate::models::ProjectSnapshot;

use super::{AdvisorConfig, AdvisorError};

/// Result of simulating a delay on one task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayImpact {
    pub task_id: String,
    pub delay_days: f64,
    pub original_project_duration: f64,
    pub new_project_duration: f64,
    /// How much the project as a whole slips (may be less than the delay if
    /// the task had slack to absorb it).
    pub project_delta_days: f64,
    /// Tasks whose inferred ordering places them after the delayed task,
    /// ascending by early start then id.
    pub shifted_task_ids: Vec<String>,
    pub shifted_milestone_ids: Vec<String>,
}

/// Simulate shifting `task_id`'s finish by `delay_days` and report the ripple
/// effect. The snapshot itself is left untouched; all shifting is done on the
/// derived offsets.
///
/// Ordering is inferred from scheduled dates: every task or milestone that
/// starts on or after the delayed task's original finish shifts with it.
pub fn simulate_task_delay(
    snapshot: &ProjectSnapshot,
    task_id: &str,
    delay_days: f64,
    config: &AdvisorConfig,
) -> Result<DelayImpact, AdvisorError> {
    let analysis = calculate_critical_path(snapshot, &config.critical_path)?;
    let eps = config.critical_path.epsilon_days;

    // The target may be a regular task or a milestone marker.
    let original_finish = if let Some(t) = analysis.all_tasks.iter().find(|t| t.id == task_id) {
        t.early_finish
    } else if let Some(m) = analysis.milestones.iter().find(|m| m.id == task_id) {
        m.day_offset
    } else {
        return Err(AdvisorError::TaskNotFound(task_id.to_string()));
    };

    let shifted_task_ids: Vec<String> = analysis
        .all_tasks
        .iter()
        .filter(|t| t.id != task_id && t.early_start >= original_finish - eps)
        .map(|t| t.id.clone())
        .collect();
    let shifted_milestone_ids: Vec<String> = analysis
        .milestones
        .iter()
        .filter(|m| m.id != task_id && m.day_offset >= original_finish - eps)
        .map(|m| m.id.clone())
        .collect();

    // Recompute the project finish from shifted offsets. A milestone's date
    // occupies one inclusive day of the span, hence offset + 1.
    let mut new_finish = 0.0f64;
    for t in &analysis.all_tasks {
        let shift = if t.id == task_id || shifted_task_ids.contains(&t.id) {
            delay_days
        } else {
            0.0
        };
        new_finish = new_finish.max(t.early_finish + shift);
    }
    for m in &analysis.milestones {
        let shift = if m.id == task_id || shifted_milestone_ids.contains(&m.id) {
            delay_days
        } else {
            0.0
        };
        new_finish = new_finish.max(m.day_offset + 1.0 + shift);
    }

    let new_project_duration = new_finish.max(0.0);
    let project_delta_days = new_project_duration - analysis.project_duration;
    debug!(
        task_id,
        delay_days,
        project_delta_days,
        shifted = shifted_task_ids.len(),
        "simulated task delay"
    );

    Ok(DelayImpact {
        task_id: task_id.to_string(),
        delay_days,
        original_project_duration: analysis.project_duration,
        new_project_duration,
        project_delta_days,
        shifted_task_ids,
        shifted_milestone_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, Task};
    use chrono::NaiveDate;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn task(id: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task {
            id: id.to_string(),
            name: id.to_string(),
            start_date: start,
            end_date: end,
            phase_id: "p1".to_string(),
            phase_name: "Delivery".to_string(),
            phase_color: "#336699".to_string(),
            assignments: vec![],
        }
    }

    fn project() -> ProjectSnapshot {
        ProjectSnapshot {
            phases: vec![Phase {
                id: "p1".to_string(),
                name: "Delivery".to_string(),
                color: "#336699".to_string(),
                start_date: d(2025, 1, 1),
                end_date: d(2025, 1, 20),
                tasks: vec![
                    task("a", d(2025, 1, 1), d(2025, 1, 5)),
                    task("b", d(2025, 1, 6), d(2025, 1, 15)),
                    task("c", d(2025, 1, 16), d(2025, 1, 20)),
                ],
                assignments: vec![],
            }],
            resources: vec![],
        }
    }

    #[test]
    fn test_delay_on_critical_task_shifts_project() {
        let snapshot = project();
        let impact =
            simulate_task_delay(&snapshot, "b", 3.0, &AdvisorConfig::default()).unwrap();

        assert_eq!(impact.original_project_duration, 20.0);
        assert_eq!(impact.new_project_duration, 23.0);
        assert_eq!(impact.project_delta_days, 3.0);
        assert_eq!(impact.shifted_task_ids, vec!["c".to_string()]);
    }

    #[test]
    fn test_delay_ripples_to_date_successors() {
        let mut snapshot = project();
        // Short parallel task finishing at offset 3; b starts at offset 5.
        snapshot.phases[0]
            .tasks
            .push(task("d", d(2025, 1, 1), d(2025, 1, 3)));
        let impact =
            simulate_task_delay(&snapshot, "d", 1.0, &AdvisorConfig::default()).unwrap();

        // Everything starting on or after d's original finish shifts with
        // it, so b and c move and the project slips by the full day.
        assert_eq!(impact.shifted_task_ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(impact.project_delta_days, 1.0);
    }

    #[test]
    fn test_delay_on_terminal_task() {
        let snapshot = project();
        let impact =
            simulate_task_delay(&snapshot, "c", 2.0, &AdvisorConfig::default()).unwrap();
        assert!(impact.shifted_task_ids.is_empty());
        assert_eq!(impact.project_delta_days, 2.0);
    }

    #[test]
    fn test_milestones_shift_with_delay() {
        let mut snapshot = project();
        snapshot.phases[0]
            .tasks
            .push(task("m1", d(2025, 1, 18), d(2025, 1, 18)));
        let impact =
            simulate_task_delay(&snapshot, "b", 2.0, &AdvisorConfig::default()).unwrap();
        assert_eq!(impact.shifted_milestone_ids, vec!["m1".to_string()]);
    }

    #[test]
    fn test_unknown_task_rejected() {
        let snapshot = project();
        let result = simulate_task_delay(&snapshot, "nope", 1.0, &AdvisorConfig::default());
        assert_eq!(result, Err(AdvisorError::TaskNotFound("nope".to_string())));
    }

    #[test]
    fn test_snapshot_not_mutated() {
        let snapshot = project();
        let before = snapshot.clone();
        simulate_task_delay(&snapshot, "b", 5.0, &AdvisorConfig::default()).unwrap();
        assert_eq!(snapshot, before);
    }
}
