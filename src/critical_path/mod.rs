//! Critical path engine.
//!
//! Forward/backward pass over a project's scheduled dates, producing per-task
//! float, the critical set, and the longest critical chain. Ordering between
//! tasks is inferred purely from scheduled dates and phase grouping; the data
//! model carries no explicit precedence edges.

mod calculation;
mod types;

pub use calculation::{calculate_critical_path, CriticalPathError};
pub use types::{
    CriticalPathAnalysis, CriticalPathConfig, CriticalPathTask, Milestone, TaskClassification,
};
