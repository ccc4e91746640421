//! Schema adapter - resolves which optional datasets a store carries.
//!
//! Stores written by different platform versions differ in where the
//! per-task state history lives:
//! - `task_sequence`, with the state label in a `status` column
//! - `task_state_sequence`, with the state label in an `event` column
//!
//! The adapter probes once per extraction and hands back a [`SchemaPlan`]
//! that callers thread through their queries. Table and column names in
//! the plan are closed enums, so nothing caller-supplied is ever
//! interpolated into SQL.

use tracing::{debug, warn};

use crate::error::Result;
use crate::store::RunStore;

/// Table holding state intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceTable {
    /// Current name
    TaskSequence,
    /// Older name
    TaskStateSequence,
}

impl SequenceTable {
    /// Columns every interval table must carry besides the state label.
    pub const REQUIRED_COLUMNS: [&'static str; 3] = ["task_id", "timestamp", "end_timestamp"];

    /// Candidates, in probe order.
    pub const CANDIDATES: [SequenceTable; 2] =
        [SequenceTable::TaskSequence, SequenceTable::TaskStateSequence];

    /// Table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceTable::TaskSequence => "task_sequence",
            SequenceTable::TaskStateSequence => "task_state_sequence",
        }
    }
}

/// Column holding the state label of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateColumn {
    /// `status`
    Status,
    /// `event`
    Event,
}

impl StateColumn {
    /// Column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateColumn::Status => "status",
            StateColumn::Event => "event",
        }
    }
}

/// A resolved state-interval table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTable {
    /// Which table
    pub table: SequenceTable,
    /// Which column carries the state label
    pub state_column: StateColumn,
    /// Whether intervals record the worker
    pub has_worker_column: bool,
}

/// Availability of the state-interval dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSchema {
    /// No usable interval table; dependent metrics stay at zero
    Absent,
    /// Intervals can be read from this table
    Present(IntervalTable),
}

impl IntervalSchema {
    /// The resolved table, if any.
    pub fn table(&self) -> Option<IntervalTable> {
        match self {
            IntervalSchema::Absent => None,
            IntervalSchema::Present(table) => Some(*table),
        }
    }
}

/// Capabilities of one store, resolved once per extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaPlan {
    /// State-interval dataset
    pub intervals: IntervalSchema,
    /// Whether the `dependencies` table exists
    pub has_dependencies: bool,
}

/// Read-only schema introspection.
pub struct SchemaAdapter;

impl SchemaAdapter {
    /// Probe the store's optional datasets.
    ///
    /// Absent datasets are reported in the plan, never as errors; only a
    /// failure of the introspection queries themselves is returned.
    pub async fn probe(store: &mut RunStore) -> Result<SchemaPlan> {
        let intervals = Self::probe_intervals(store).await?;
        let has_dependencies = store.table_exists("dependencies").await?;

        if !has_dependencies {
            debug!("Store {} has no dependencies table", store.path().display());
        }

        Ok(SchemaPlan {
            intervals,
            has_dependencies,
        })
    }

    async fn probe_intervals(store: &mut RunStore) -> Result<IntervalSchema> {
        for table in SequenceTable::CANDIDATES {
            if !store.table_exists(table.as_str()).await? {
                continue;
            }

            let columns = store.table_columns(table.as_str()).await?;
            let has = |name: &str| columns.iter().any(|c| c == name);

            let missing = SequenceTable::REQUIRED_COLUMNS
                .iter()
                .find(|&&c| !has(c));
            if let Some(missing) = missing {
                warn!(
                    "Interval table {} has no {} column; ignoring it",
                    table.as_str(),
                    missing
                );
                continue;
            }

            let state_column = if has(StateColumn::Status.as_str()) {
                StateColumn::Status
            } else if has(StateColumn::Event.as_str()) {
                StateColumn::Event
            } else {
                warn!(
                    "Interval table {} has neither a status nor an event column; ignoring it",
                    table.as_str()
                );
                continue;
            };

            let resolved = IntervalTable {
                table,
                state_column,
                has_worker_column: has("worker_id"),
            };
            debug!(
                "Using interval table {}.{}",
                table.as_str(),
                state_column.as_str()
            );
            return Ok(IntervalSchema::Present(resolved));
        }

        debug!("Store {} has no interval table", store.path().display());
        Ok(IntervalSchema::Absent)
    }
}
