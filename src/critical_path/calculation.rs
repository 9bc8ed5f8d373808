//! Forward/backward pass critical path calculation.

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::models::{round_half_even, ProjectSnapshot, Task};

use super::types::{
    CriticalPathAnalysis, CriticalPathConfig, CriticalPathTask, Milestone,
};

/// Errors that can occur during critical path calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriticalPathError {
    /// A task's end date precedes its start date. The whole calculation is
    /// aborted; no partial analysis is returned.
    #[error("Task {0} ends before it starts")]
    InvalidTaskDates(String),
    /// The backward pass produced negative slack. This indicates a defect in
    /// the schedule math, not bad input, and must never surface in correct
    /// operation.
    #[error("Negative slack computed for task {0}")]
    NegativeSlack(String),
}

/// Working timing record during the passes.
#[derive(Clone, Debug)]
struct Timing<'a> {
    task: &'a Task,
    duration: f64,
    early_start: f64,
    early_finish: f64,
    late_start: f64,
    late_finish: f64,
    slack: f64,
}

/// Calculate per-task float, the critical set, and the longest critical chain
/// for a project snapshot.
///
/// Early starts and finishes are taken directly from each task's scheduled
/// dates as day offsets from the project start; there are no explicit
/// precedence edges, so the backward pass infers succession from scheduled
/// dates within each phase's task sequence.
pub fn calculate_critical_path(
    snapshot: &ProjectSnapshot,
    config: &CriticalPathConfig,
) -> Result<CriticalPathAnalysis, CriticalPathError> {
    for task in snapshot.tasks() {
        if task.end_date < task.start_date {
            return Err(CriticalPathError::InvalidTaskDates(task.id.clone()));
        }
    }

    let Some((project_start, project_end)) = snapshot.span() else {
        return Ok(CriticalPathAnalysis {
            critical_path: Vec::new(),
            all_tasks: Vec::new(),
            project_duration: 0.0,
            total_slack: 0.0,
            longest_chain: Vec::new(),
            risky_tasks: Vec::new(),
            milestones: Vec::new(),
        });
    };

    let project_duration = ((project_end - project_start).num_days() + 1) as f64;
    debug!(
        tasks = snapshot.task_count(),
        project_duration, "running critical path passes"
    );

    let eps = config.epsilon_days;

    // Forward pass: offsets come straight from the scheduled dates.
    let mut timings: Vec<Timing<'_>> = Vec::with_capacity(snapshot.task_count());
    for task in snapshot.tasks().filter(|t| !t.is_milestone()) {
        let duration = task.duration_days();
        let early_start = task.start_offset(project_start);
        timings.push(Timing {
            task,
            duration,
            early_start,
            early_finish: early_start + duration,
            late_start: 0.0,
            late_finish: 0.0,
            slack: 0.0,
        });
    }

    // Backward pass, phase by phase: a task's latest finish is bounded by the
    // latest start of same-phase tasks scheduled no earlier than its finish;
    // tasks with no such successor are bounded by the project end.
    let phase_ids: Vec<&str> = snapshot.phases.iter().map(|p| p.id.as_str()).collect();
    for phase_id in phase_ids {
        let mut members: Vec<usize> = timings
            .iter()
            .enumerate()
            .filter(|(_, t)| t.task.phase_id == phase_id)
            .map(|(i, _)| i)
            .collect();
        members.sort_by(|&a, &b| {
            timings[a]
                .early_start
                .total_cmp(&timings[b].early_start)
                .then_with(|| timings[a].task.id.cmp(&timings[b].task.id))
        });

        // Reverse date order so successors are resolved before their
        // predecessors.
        for position in (0..members.len()).rev() {
            let idx = members[position];
            let finish = timings[idx].early_finish;

            let mut late_finish = f64::MAX;
            for &succ_idx in &members[position + 1..] {
                if timings[succ_idx].early_start >= finish - eps {
                    late_finish = late_finish.min(timings[succ_idx].late_start);
                }
            }
            if late_finish == f64::MAX {
                late_finish = project_duration;
            }

            let timing = &mut timings[idx];
            timing.late_finish = late_finish;
            timing.late_start = late_finish - timing.duration;
            timing.slack = timing.late_start - timing.early_start;
            if timing.slack < -eps {
                return Err(CriticalPathError::NegativeSlack(timing.task.id.clone()));
            }
        }
    }

    let mut all_tasks: Vec<CriticalPathTask> = timings
        .iter()
        .map(|t| CriticalPathTask {
            id: t.task.id.clone(),
            name: t.task.name.clone(),
            phase_name: t.task.phase_name.clone(),
            duration_days: t.duration,
            early_start: t.early_start,
            early_finish: t.early_finish,
            late_start: t.late_start,
            late_finish: t.late_finish,
            slack: t.slack,
            is_critical: t.slack <= eps,
        })
        .collect();
    all_tasks.sort_by(|a, b| {
        a.early_start
            .total_cmp(&b.early_start)
            .then_with(|| a.id.cmp(&b.id))
    });

    let critical_path: Vec<CriticalPathTask> = all_tasks
        .iter()
        .filter(|t| t.is_critical)
        .cloned()
        .collect();

    let longest_chain = longest_critical_chain(&critical_path, eps);

    let mut risky_tasks: Vec<CriticalPathTask> = all_tasks
        .iter()
        .filter(|t| !t.is_critical)
        .cloned()
        .collect();
    risky_tasks.sort_by(|a, b| {
        a.slack
            .total_cmp(&b.slack)
            .then_with(|| a.early_start.total_cmp(&b.early_start))
            .then_with(|| a.id.cmp(&b.id))
    });
    risky_tasks.truncate(config.risky_task_limit);

    let total_slack = round_half_even(all_tasks.iter().map(|t| t.slack).sum(), 2);

    // Milestones inherit criticality from sitting on a zero-slack boundary.
    let critical_dates: FxHashSet<chrono::NaiveDate> = critical_path
        .iter()
        .filter_map(|t| snapshot.task(&t.id))
        .flat_map(|t| [t.start_date, t.end_date])
        .collect();
    let mut milestones: Vec<Milestone> = snapshot
        .tasks()
        .filter(|t| t.is_milestone())
        .map(|t| Milestone {
            id: t.id.clone(),
            name: t.name.clone(),
            date: t.start_date,
            day_offset: t.start_offset(project_start),
            is_critical: critical_dates.contains(&t.start_date),
        })
        .collect();
    milestones.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    Ok(CriticalPathAnalysis {
        critical_path,
        all_tasks,
        project_duration,
        total_slack,
        longest_chain,
        risky_tasks,
        milestones,
    })
}

/// Find the maximal-duration chain of contiguous critical tasks.
///
/// Input must be sorted ascending by (early_start, id); the result preserves
/// that order. Ties between equally long chains resolve to the earliest
/// early start, then the lexically smallest id, so output is deterministic.
fn longest_critical_chain(critical: &[CriticalPathTask], eps: f64) -> Vec<CriticalPathTask> {
    if critical.is_empty() {
        return Vec::new();
    }

    let n = critical.len();
    // chain_duration[i]: total duration of the best chain starting at i.
    let mut chain_duration = vec![0.0f64; n];
    let mut next_in_chain: Vec<Option<usize>> = vec![None; n];

    for i in (0..n).rev() {
        chain_duration[i] = critical[i].duration_days;
        for j in (i + 1)..n {
            // Contiguous succession: j starts where i finishes.
            if (critical[j].early_start - critical[i].early_finish).abs() <= eps {
                let candidate = critical[i].duration_days + chain_duration[j];
                if candidate > chain_duration[i] + eps {
                    chain_duration[i] = candidate;
                    next_in_chain[i] = Some(j);
                }
            }
        }
    }

    // Earliest-starting maximal chain wins ties (slice is already sorted).
    let mut best = 0;
    for i in 1..n {
        if chain_duration[i] > chain_duration[best] + eps {
            best = i;
        }
    }

    let mut chain = Vec::new();
    let mut cursor = Some(best);
    while let Some(i) = cursor {
        chain.push(critical[i].clone());
        cursor = next_in_chain[i];
    }
    chain
}
