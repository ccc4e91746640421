//! Completion check for a run store.

use runlens_core::TaskStatus;
use runlens_storage::RunStore;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Status breakdown of a run at the time of the check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatus {
    /// Task count per raw status value, sorted by status
    pub counts: Vec<(String, i64)>,
    /// Non-deleted tasks
    pub total: i64,
    /// Completed, cancelled or failed tasks
    pub terminal: i64,
    /// Everything else, including unrecognised statuses
    pub non_terminal: i64,
}

impl RunStatus {
    /// A run is complete once it has tasks and none of them can still change.
    pub fn is_complete(&self) -> bool {
        self.non_terminal == 0 && self.total > 0
    }
}

/// Read the status breakdown of the run at `path`.
pub async fn check_completion(path: &Path) -> Result<RunStatus> {
    let mut store = RunStore::open(path).await?;
    let counts = store.status_counts().await;
    store.close().await;

    let mut status = RunStatus {
        counts: counts?,
        ..Default::default()
    };
    for (raw, count) in &status.counts {
        status.total += count;
        if TaskStatus::parse(raw).is_terminal() {
            status.terminal += count;
        } else {
            status.non_terminal += count;
        }
    }

    debug!(
        "{}: {} of {} tasks terminal",
        path.display(),
        status.terminal,
        status.total
    );
    Ok(status)
}
