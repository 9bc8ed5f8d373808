//! Risk and optimization advisor.
//!
//! Consumes critical path analyses to simulate delay impact and propose
//! schedule compression (crashing and fast-tracking). Pure functions; the
//! project snapshot is never mutated.

use thiserror::Error;

use crate::critical_path::{CriticalPathConfig, CriticalPathError};

mod compression;
mod delay;

pub use compression::{
    compression_suggestions, CompressionReport, CrashingOpportunity, EffortLevel,
    FastTrackOpportunity, RiskLevel,
};
pub use delay::{simulate_task_delay, DelayImpact};

/// Errors that can occur in advisor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdvisorError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error(transparent)]
    CriticalPath(#[from] CriticalPathError),
}

/// Tuning knobs for advisor heuristics.
#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// Critical tasks shorter than this are not worth crashing.
    pub min_crash_duration_days: f64,
    /// Tasks staffed at or above this many assignments get no crashing
    /// suggestion; extra hands stop paying off.
    pub max_crash_assignments: usize,
    /// Shared-resource overlap (percent) at or below which a fast-track
    /// pairing is medium rather than high risk.
    pub fast_track_medium_overlap: f64,
    pub critical_path: CriticalPathConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            min_crash_duration_days: 3.0,
            max_crash_assignments: 3,
            fast_track_medium_overlap: 50.0,
            critical_path: CriticalPathConfig::default(),
        }
    }
}
