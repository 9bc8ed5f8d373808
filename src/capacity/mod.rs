//! Resource capacity calculator.
//!
//! Buckets the project timeline into Monday-aligned ISO weeks and aggregates
//! each resource's allocation per week. The calculation itself is a pure
//! function; callers in-process normally reach it through the asynchronous
//! worker boundary in [`worker`].

mod calculator;
mod week;
pub mod worker;

pub use calculator::{
    calculate_capacity, CalculatorInput, CapacityError, ResourceCapacityResult,
    ResourceCapacitySummary, ResourceWeekAllocation, WeekContribution,
};
pub use week::{monday_of, week_buckets, week_identifier, working_day_overlap, WeekBucket};
pub use worker::{CalculatorRequest, CalculatorResponse, CapacityWorker};
