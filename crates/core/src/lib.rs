//! RunLens core data models.
//!
//! This crate defines the records read from a run's task store, the
//! metrics snapshot produced for each run, and the derived-metric
//! primitives every ratio in the snapshot is computed with.

#![warn(missing_docs)]

// Core identities
mod id;

// Raw store records
mod task;
mod interval;
mod dependency;

// Metrics
mod snapshot;
pub mod derive;

// Re-exports
pub use id::*;

// Records
pub use task::{TaskStatus, TaskRecord, CompletedTask};
pub use interval::{StateInterval, WORKING_STATE, BLOCKED_STATES};
pub use dependency::DependencyEdge;

// Snapshot
pub use snapshot::{
    MetricsSnapshot, TimeMetrics, TokenMetrics, CostMetrics, TaskDistribution,
    QualityMetrics, ThroughputMetrics, WorkerStats,
};

/// Epoch timestamp in milliseconds, as stored by the task platform.
pub type Millis = i64;
