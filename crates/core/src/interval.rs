//! State intervals - how long a task spent in each state.

use serde::{Deserialize, Serialize};
use crate::id::{TaskId, WorkerId};
use crate::Millis;

/// State label of an interval during which a task was being worked.
pub const WORKING_STATE: &str = "working";

/// State labels of intervals during which a task was waiting.
pub const BLOCKED_STATES: [&str; 2] = ["pending", "assigned"];

/// One contiguous period a task spent in a given state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateInterval {
    /// Owning task
    pub task_id: TaskId,
    /// State label; `None` for phase-only transitions
    pub state: Option<String>,
    /// Worker that caused the transition, if recorded
    pub worker_id: Option<WorkerId>,
    /// Start of the interval
    pub start_ms: Millis,
    /// End of the interval; `None` while still ongoing
    pub end_ms: Option<Millis>,
}

impl StateInterval {
    /// Whether the interval is still open.
    pub fn is_open(&self) -> bool {
        self.end_ms.is_none()
    }

    /// Length of the interval; zero while it is still open.
    pub fn recorded_duration_ms(&self) -> Millis {
        self.end_ms.map_or(0, |end| end - self.start_ms)
    }
}
