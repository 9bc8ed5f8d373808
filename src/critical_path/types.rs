//! Types for critical path analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Configuration for the critical path engine.
#[derive(Clone, Debug)]
pub struct CriticalPathConfig {
    /// Slack at or below this threshold (in days) counts as critical.
    /// Absorbs rounding noise from date arithmetic.
    pub epsilon_days: f64,
    /// Maximum number of low-slack tasks reported as risky.
    pub risky_task_limit: usize,
}

impl Default for CriticalPathConfig {
    fn default() -> Self {
        Self {
            epsilon_days: 1e-6,
            risky_task_limit: 5,
        }
    }
}

/// Per-task timing derived by the forward and backward passes.
///
/// All day values are offsets from the project start; finishes are exclusive
/// (a 5-day task starting at offset 0 finishes at 5).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathTask {
    pub id: String,
    pub name: String,
    pub phase_name: String,
    pub duration_days: f64,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    /// Days this task can slip without delaying the project.
    pub slack: f64,
    pub is_critical: bool,
}

/// A zero-duration marker derived from a task whose start and end coincide.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub day_offset: f64,
    /// Critical when the marker sits on a zero-slack date of the chain.
    pub is_critical: bool,
}

/// How a task relates to the schedule's critical structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskClassification {
    Critical,
    Risky,
    Normal,
}

/// Full output of a critical path calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathAnalysis {
    /// Zero-slack tasks, ascending by early start then id.
    pub critical_path: Vec<CriticalPathTask>,
    /// Every non-milestone task with its timing, ascending by early start then id.
    pub all_tasks: Vec<CriticalPathTask>,
    /// Inclusive day span from earliest task start to latest task end.
    pub project_duration: f64,
    /// Sum of slack across all non-milestone tasks.
    pub total_slack: f64,
    /// The maximal-duration contiguous chain of critical tasks.
    pub longest_chain: Vec<CriticalPathTask>,
    /// Lowest-slack non-critical tasks, ascending by slack.
    pub risky_tasks: Vec<CriticalPathTask>,
    pub milestones: Vec<Milestone>,
}

impl CriticalPathAnalysis {
    /// Classify a task id against this analysis.
    ///
    /// Every non-milestone task falls in exactly one bucket: critical, risky
    /// (listed in `risky_tasks`), or normal.
    pub fn classify(&self, task_id: &str) -> Option<TaskClassification> {
        if self.critical_path.iter().any(|t| t.id == task_id) {
            return Some(TaskClassification::Critical);
        }
        if self.risky_tasks.iter().any(|t| t.id == task_id) {
            return Some(TaskClassification::Risky);
        }
        if self.all_tasks.iter().any(|t| t.id == task_id) {
            return Some(TaskClassification::Normal);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CriticalPathConfig::default();
        assert!(config.epsilon_days > 0.0);
        assert_eq!(config.risky_task_limit, 5);
    }
}
