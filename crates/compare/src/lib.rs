//! Run comparison
//!
//! Policy-aware deltas between a baseline and a candidate run, and the
//! labels runs are shown under.

#![warn(missing_docs)]

pub mod engine;
pub mod labels;
pub mod policy;

pub use engine::{compare, compare_runs, Comparison, Delta, Direction, Marker};
pub use labels::{resolve_labels, LabelError};
pub use policy::{MetricUnit, TrackedMetric};
