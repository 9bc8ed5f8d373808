//! Project-schedule analytics core for a presales project-planning tool.
//!
//! Given a hierarchical project snapshot (phases containing tasks with dates
//! and resource assignments), this crate computes:
//!
//! - the critical path and per-task float ([`critical_path`]),
//! - schedule-compression suggestions and delay impact ([`advisor`]),
//! - per-resource weekly capacity and utilization ([`capacity`]).
//!
//! The engines are pure, deterministic functions over immutable snapshots;
//! they never rewrite dates, persist anything, or share mutable state. The
//! capacity calculator additionally runs behind an asynchronous
//! request/response boundary because it is the heaviest computation.

pub mod advisor;
pub mod capacity;
pub mod critical_path;
pub mod models;
pub mod snapshot;

pub use advisor::{
    compression_suggestions, simulate_task_delay, AdvisorConfig, AdvisorError,
    CompressionReport, CrashingOpportunity, DelayImpact, EffortLevel, FastTrackOpportunity,
    RiskLevel,
};
pub use capacity::{
    calculate_capacity, CalculatorInput, CalculatorRequest, CalculatorResponse, CapacityError,
    CapacityWorker, ResourceCapacityResult, ResourceCapacitySummary, ResourceWeekAllocation,
    WeekBucket, WeekContribution,
};
pub use critical_path::{
    calculate_critical_path, CriticalPathAnalysis, CriticalPathConfig, CriticalPathError,
    CriticalPathTask, Milestone, TaskClassification,
};
pub use models::{
    Phase, ProjectSnapshot, Resource, ResourceAssignment, Task, DEFAULT_WEEKLY_CAPACITY,
};
pub use snapshot::{build_snapshot, ProjectRecord, SnapshotError};
