//! Dependency edges between tasks.

use serde::{Deserialize, Serialize};
use crate::id::TaskId;

/// A directed dependency between two tasks.
///
/// Edges are exported as-is; no metric is computed from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Source task
    pub from_task_id: TaskId,
    /// Target task
    pub to_task_id: TaskId,
    /// Dependency kind ("blocks", "follows", "contains", or custom)
    pub dep_type: String,
}
