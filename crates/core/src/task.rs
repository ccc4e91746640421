//! Task records - the unit of work a run is made of.

use serde::{Deserialize, Serialize};
use crate::id::{TaskId, WorkerId};
use crate::Millis;

/// Lifecycle status of a task as stored by the platform.
///
/// Statuses the platform adds later are read as [`TaskStatus::Unknown`]
/// and only show up in the total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting to be claimed
    Pending,
    /// Claimed and in progress
    Working,
    /// Finished successfully
    Completed,
    /// Finished unsuccessfully
    Failed,
    /// Withdrawn before completion
    Cancelled,
    /// Any status this tool does not know about
    Unknown,
}

impl TaskStatus {
    /// Parse the raw status column value.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => TaskStatus::Pending,
            "working" => TaskStatus::Working,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            "cancelled" => TaskStatus::Cancelled,
            _ => TaskStatus::Unknown,
        }
    }

    /// The value stored in the status column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Working => "working",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }

    /// Whether the task will not change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full task row, as exported for offline analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task id
    pub id: TaskId,
    /// Task title
    pub title: String,
    /// Raw status value, kept verbatim so unknown statuses survive
    pub status: String,
    /// Claiming worker
    pub worker_id: Option<WorkerId>,
    /// Point estimate
    pub points: Option<i64>,
    /// Estimated duration
    pub time_estimate_ms: Option<Millis>,
    /// Measured duration
    pub time_actual_ms: Option<Millis>,
    /// Creation time
    pub created_at: Millis,
    /// First claim time
    pub started_at: Option<Millis>,
    /// Completion time
    pub completed_at: Option<Millis>,
    /// Cost charged to the task
    pub cost_usd: f64,
    /// Raw `metric_0..metric_7` channels
    pub metrics: [i64; 8],
}

/// A completed task, as listed on a run's completion timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    /// Task id
    pub task_id: TaskId,
    /// Task title
    pub title: String,
    /// Worker that completed it, if recorded
    pub worker_id: Option<WorkerId>,
    /// Completion time
    pub completed_at: Millis,
    /// Measured duration
    pub time_actual_ms: Option<Millis>,
    /// Cost charged to the task
    pub cost_usd: f64,
}
