//! Aggregate queries over a run's store.
//!
//! Each method issues one statement and returns raw sums and counts;
//! turning them into rates is left to the caller. Every query over
//! `tasks` skips soft-deleted rows.

use runlens_core::{
    CompletedTask, DependencyEdge, Millis, StateInterval, TaskId, TaskRecord, WorkerId,
    WorkerStats, BLOCKED_STATES, WORKING_STATE,
};
use sqlx::Row;

use crate::error::{Result, StoreError};
use crate::schema::IntervalTable;
use crate::store::RunStore;

/// Status counts and point totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// All tasks
    pub total: i64,
    /// Completed tasks
    pub completed: i64,
    /// Failed tasks
    pub failed: i64,
    /// Cancelled tasks
    pub cancelled: i64,
    /// Pending tasks
    pub pending: i64,
    /// Working tasks
    pub working: i64,
    /// Points over all tasks
    pub total_points: i64,
    /// Points over completed tasks
    pub completed_points: i64,
}

/// Timestamp bounds and duration aggregates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskTiming {
    /// Earliest creation time
    pub first_created: Option<Millis>,
    /// Latest completion time
    pub last_completed: Option<Millis>,
    /// Mean of recorded durations
    pub avg_actual_ms: Option<f64>,
    /// Shortest positive recorded duration
    pub min_positive_ms: Option<Millis>,
    /// Longest recorded duration
    pub max_actual_ms: Option<Millis>,
}

/// Cost total with the counts it is divided by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTotals {
    /// Sum of task costs
    pub total_cost: f64,
    /// All tasks
    pub task_count: i64,
    /// Completed tasks
    pub completed: i64,
    /// Points over completed tasks
    pub completed_points: i64,
}

/// Time spent in working and blocked intervals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalTime {
    /// Sum over working intervals
    pub working_ms: Millis,
    /// Sum over pending/assigned intervals
    pub blocked_ms: Millis,
}

impl RunStore {
    /// Count tasks by status and sum their points.
    pub async fn task_counts(&mut self) -> Result<TaskCounts> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) AS failed,
                COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                COALESCE(SUM(CASE WHEN status = 'working' THEN 1 ELSE 0 END), 0) AS working,
                COALESCE(SUM(points), 0) AS total_points,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN points ELSE 0 END), 0)
                    AS completed_points
            FROM tasks
            WHERE deleted_at IS NULL",
        )
        .fetch_one(self.conn())
        .await
        .map_err(StoreError::query("task counts"))?;

        let get = |name: &str| row.try_get::<i64, _>(name);
        (|| -> sqlx::Result<TaskCounts> {
            Ok(TaskCounts {
                total: get("total")?,
                completed: get("completed")?,
                failed: get("failed")?,
                cancelled: get("cancelled")?,
                pending: get("pending")?,
                working: get("working")?,
                total_points: get("total_points")?,
                completed_points: get("completed_points")?,
            })
        })()
        .map_err(StoreError::query("task counts"))
    }

    /// Timestamp bounds and recorded-duration aggregates.
    ///
    /// The minimum only considers positive durations so unrecorded
    /// tasks do not produce a false zero floor.
    pub async fn task_timing(&mut self) -> Result<TaskTiming> {
        let row = sqlx::query(
            "SELECT
                MIN(created_at) AS first_created,
                MAX(completed_at) AS last_completed,
                AVG(time_actual_ms) AS avg_time,
                MIN(CASE WHEN time_actual_ms > 0 THEN time_actual_ms END) AS min_time,
                MAX(time_actual_ms) AS max_time
            FROM tasks
            WHERE deleted_at IS NULL",
        )
        .fetch_one(self.conn())
        .await
        .map_err(StoreError::query("task timing"))?;

        (|| -> sqlx::Result<TaskTiming> {
            Ok(TaskTiming {
                first_created: row.try_get("first_created")?,
                last_completed: row.try_get("last_completed")?,
                avg_actual_ms: row.try_get("avg_time")?,
                min_positive_ms: row.try_get("min_time")?,
                max_actual_ms: row.try_get("max_time")?,
            })
        })()
        .map_err(StoreError::query("task timing"))
    }

    /// All positive recorded durations, ascending.
    pub async fn positive_durations(&mut self) -> Result<Vec<Millis>> {
        let rows = sqlx::query(
            "SELECT time_actual_ms FROM tasks
            WHERE deleted_at IS NULL AND time_actual_ms > 0
            ORDER BY time_actual_ms",
        )
        .fetch_all(self.conn())
        .await
        .map_err(StoreError::query("task durations"))?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>(0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::query("task durations"))
    }

    /// Mean time from creation to first claim, over tasks with both set.
    pub async fn avg_queue_wait(&mut self) -> Result<Option<f64>> {
        sqlx::query(
            "SELECT AVG(started_at - created_at)
            FROM tasks
            WHERE deleted_at IS NULL AND started_at IS NOT NULL AND created_at IS NOT NULL",
        )
        .fetch_one(self.conn())
        .await
        .and_then(|row| row.try_get::<Option<f64>, _>(0))
        .map_err(StoreError::query("queue wait"))
    }

    /// Sums of the eight `metric_N` channels.
    pub async fn token_channels(&mut self) -> Result<[i64; 8]> {
        let row = sqlx::query(
            "SELECT
                COALESCE(SUM(metric_0), 0), COALESCE(SUM(metric_1), 0),
                COALESCE(SUM(metric_2), 0), COALESCE(SUM(metric_3), 0),
                COALESCE(SUM(metric_4), 0), COALESCE(SUM(metric_5), 0),
                COALESCE(SUM(metric_6), 0), COALESCE(SUM(metric_7), 0)
            FROM tasks
            WHERE deleted_at IS NULL",
        )
        .fetch_one(self.conn())
        .await
        .map_err(StoreError::query("token channels"))?;

        let mut channels = [0i64; 8];
        for (i, channel) in channels.iter_mut().enumerate() {
            *channel = row
                .try_get(i)
                .map_err(StoreError::query("token channels"))?;
        }
        Ok(channels)
    }

    /// Total cost with the counts it is averaged over.
    pub async fn cost_totals(&mut self) -> Result<CostTotals> {
        let row = sqlx::query(
            "SELECT
                TOTAL(cost_usd) AS total_cost,
                COUNT(*) AS total_tasks,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN points ELSE 0 END), 0) AS pts
            FROM tasks
            WHERE deleted_at IS NULL",
        )
        .fetch_one(self.conn())
        .await
        .map_err(StoreError::query("cost totals"))?;

        (|| -> sqlx::Result<CostTotals> {
            Ok(CostTotals {
                total_cost: row.try_get("total_cost")?,
                task_count: row.try_get("total_tasks")?,
                completed: row.try_get("completed")?,
                completed_points: row.try_get("pts")?,
            })
        })()
        .map_err(StoreError::query("cost totals"))
    }

    /// Time spent working and blocked, closing open intervals at `now`.
    ///
    /// `now` is only used to bound ongoing intervals for this sum.
    pub async fn interval_time(
        &mut self,
        table: IntervalTable,
        now: Millis,
    ) -> Result<IntervalTime> {
        let sql = format!(
            "SELECT
                COALESCE(SUM(CASE WHEN {col} = ?
                    THEN COALESCE(end_timestamp, ?) - timestamp END), 0) AS working,
                COALESCE(SUM(CASE WHEN {col} IN (?, ?)
                    THEN COALESCE(end_timestamp, ?) - timestamp END), 0) AS blocked
            FROM {table}",
            col = table.state_column.as_str(),
            table = table.table.as_str(),
        );

        let row = sqlx::query(&sql)
            .bind(WORKING_STATE)
            .bind(now)
            .bind(BLOCKED_STATES[0])
            .bind(BLOCKED_STATES[1])
            .bind(now)
            .fetch_one(self.conn())
            .await
            .map_err(StoreError::query("interval time"))?;

        (|| -> sqlx::Result<IntervalTime> {
            Ok(IntervalTime {
                working_ms: row.try_get("working")?,
                blocked_ms: row.try_get("blocked")?,
            })
        })()
        .map_err(StoreError::query("interval time"))
    }

    /// Number of working intervals per task, for tasks with at least one.
    pub async fn working_interval_counts(&mut self, table: IntervalTable) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT task_id, COUNT(*) AS working_periods
            FROM {table}
            WHERE {col} = ?
            GROUP BY task_id",
            col = table.state_column.as_str(),
            table = table.table.as_str(),
        );

        let rows = sqlx::query(&sql)
            .bind(WORKING_STATE)
            .fetch_all(self.conn())
            .await
            .map_err(StoreError::query("working intervals"))?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("working_periods"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::query("working intervals"))
    }

    /// Per-worker totals over tasks with a recorded worker.
    ///
    /// Rows come back in the store's grouping order; cost is not rounded.
    pub async fn worker_totals(&mut self) -> Result<Vec<WorkerStats>> {
        let rows = sqlx::query(
            "SELECT
                worker_id,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) AS failed,
                TOTAL(cost_usd) AS cost,
                COALESCE(SUM(time_actual_ms), 0) AS time_ms,
                COALESCE(SUM(metric_0), 0) AS tok_in,
                COALESCE(SUM(metric_1), 0) AS tok_out
            FROM tasks
            WHERE deleted_at IS NULL AND worker_id IS NOT NULL
            GROUP BY worker_id",
        )
        .fetch_all(self.conn())
        .await
        .map_err(StoreError::query("worker totals"))?;

        rows.iter()
            .map(|row| {
                Ok(WorkerStats {
                    worker_id: WorkerId::new(row.try_get::<String, _>("worker_id")?),
                    tasks_completed: row.try_get("completed")?,
                    tasks_failed: row.try_get("failed")?,
                    total_cost_usd: row.try_get("cost")?,
                    total_time_ms: row.try_get("time_ms")?,
                    tokens_in: row.try_get("tok_in")?,
                    tokens_out: row.try_get("tok_out")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::query("worker totals"))
    }

    /// Task count per raw status value.
    pub async fn status_counts(&mut self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS cnt
            FROM tasks
            WHERE deleted_at IS NULL
            GROUP BY status
            ORDER BY status",
        )
        .fetch_all(self.conn())
        .await
        .map_err(StoreError::query("status counts"))?;

        rows.iter()
            .map(|row| -> sqlx::Result<(String, i64)> {
                Ok((row.try_get("status")?, row.try_get("cnt")?))
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::query("status counts"))
    }

    /// Every task in creation order.
    pub async fn task_records(&mut self) -> Result<Vec<TaskRecord>> {
        let rows = sqlx::query(
            "SELECT
                id, title, status, worker_id, points, time_estimate_ms, time_actual_ms,
                created_at, started_at, completed_at, cost_usd,
                metric_0, metric_1, metric_2, metric_3,
                metric_4, metric_5, metric_6, metric_7
            FROM tasks
            WHERE deleted_at IS NULL
            ORDER BY created_at, id",
        )
        .fetch_all(self.conn())
        .await
        .map_err(StoreError::query("task records"))?;

        rows.iter()
            .map(|row| {
                let mut metrics = [0i64; 8];
                for (i, slot) in metrics.iter_mut().enumerate() {
                    *slot = row
                        .try_get::<Option<i64>, _>(format!("metric_{i}").as_str())?
                        .unwrap_or(0);
                }
                Ok(TaskRecord {
                    id: TaskId::new(row.try_get::<String, _>("id")?),
                    title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
                    status: row.try_get("status")?,
                    worker_id: row.try_get::<Option<String>, _>("worker_id")?.map(WorkerId::new),
                    points: row.try_get("points")?,
                    time_estimate_ms: row.try_get("time_estimate_ms")?,
                    time_actual_ms: row.try_get("time_actual_ms")?,
                    created_at: row.try_get("created_at")?,
                    started_at: row.try_get("started_at")?,
                    completed_at: row.try_get("completed_at")?,
                    cost_usd: row.try_get::<Option<f64>, _>("cost_usd")?.unwrap_or(0.0),
                    metrics,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::query("task records"))
    }

    /// Completed tasks in completion order.
    pub async fn completion_timeline(&mut self) -> Result<Vec<CompletedTask>> {
        let rows = sqlx::query(
            "SELECT id, title, worker_id, completed_at, time_actual_ms, cost_usd
            FROM tasks
            WHERE status = 'completed' AND completed_at IS NOT NULL AND deleted_at IS NULL
            ORDER BY completed_at",
        )
        .fetch_all(self.conn())
        .await
        .map_err(StoreError::query("completion timeline"))?;

        rows.iter()
            .map(|row| {
                Ok(CompletedTask {
                    task_id: TaskId::new(row.try_get::<String, _>("id")?),
                    title: row.try_get("title")?,
                    worker_id: row.try_get::<Option<String>, _>("worker_id")?.map(WorkerId::new),
                    completed_at: row.try_get("completed_at")?,
                    time_actual_ms: row.try_get("time_actual_ms")?,
                    cost_usd: row.try_get::<Option<f64>, _>("cost_usd")?.unwrap_or(0.0),
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::query("completion timeline"))
    }

    /// All state intervals in start order.
    pub async fn state_intervals(&mut self, table: IntervalTable) -> Result<Vec<StateInterval>> {
        let worker = if table.has_worker_column {
            "worker_id"
        } else {
            "NULL"
        };
        let sql = format!(
            "SELECT task_id, {col} AS state, {worker} AS worker_id, timestamp, end_timestamp
            FROM {table}
            ORDER BY timestamp",
            col = table.state_column.as_str(),
            table = table.table.as_str(),
        );

        let rows = sqlx::query(&sql)
            .fetch_all(self.conn())
            .await
            .map_err(StoreError::query("state intervals"))?;

        rows.iter()
            .map(|row| {
                Ok(StateInterval {
                    task_id: TaskId::new(row.try_get::<String, _>("task_id")?),
                    state: row.try_get("state")?,
                    worker_id: row.try_get::<Option<String>, _>("worker_id")?.map(WorkerId::new),
                    start_ms: row.try_get("timestamp")?,
                    end_ms: row.try_get("end_timestamp")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::query("state intervals"))
    }

    /// All dependency edges.
    ///
    /// Only valid when the schema plan reports the `dependencies` table.
    pub async fn dependency_edges(&mut self) -> Result<Vec<DependencyEdge>> {
        let rows = sqlx::query(
            "SELECT from_task_id, to_task_id, dep_type
            FROM dependencies
            ORDER BY from_task_id, to_task_id",
        )
        .fetch_all(self.conn())
        .await
        .map_err(StoreError::query("dependency edges"))?;

        rows.iter()
            .map(|row| {
                Ok(DependencyEdge {
                    from_task_id: TaskId::new(row.try_get::<String, _>("from_task_id")?),
                    to_task_id: TaskId::new(row.try_get::<String, _>("to_task_id")?),
                    dep_type: row.try_get("dep_type")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::query("dependency edges"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Fixture, TaskRow};
    use crate::schema::SchemaAdapter;

    async fn open(fixture: Fixture) -> RunStore {
        let path = fixture.finish().await.unwrap();
        RunStore::open(&path).await.unwrap()
    }

    #[tokio::test]
    async fn test_task_counts_skip_deleted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db")).await.unwrap();
        fixture.task(TaskRow::new("a", "completed").points(3)).await.unwrap();
        fixture.task(TaskRow::new("b", "failed").points(2)).await.unwrap();
        fixture.task(TaskRow::new("c", "pending")).await.unwrap();
        fixture.task(TaskRow::new("d", "review").points(1)).await.unwrap();
        fixture
            .task(TaskRow::new("e", "completed").points(8).deleted(5))
            .await
            .unwrap();

        let mut store = open(fixture).await;
        let counts = store.task_counts().await.unwrap();
        store.close().await;

        assert_eq!(
            counts,
            TaskCounts {
                total: 4,
                completed: 1,
                failed: 1,
                cancelled: 0,
                pending: 1,
                working: 0,
                total_points: 6,
                completed_points: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_aggregates_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::create(&dir.path().join("run.db")).await.unwrap();

        let mut store = open(fixture).await;
        assert_eq!(store.task_counts().await.unwrap(), TaskCounts::default());
        assert_eq!(store.task_timing().await.unwrap(), TaskTiming::default());
        assert_eq!(store.avg_queue_wait().await.unwrap(), None);
        assert_eq!(store.token_channels().await.unwrap(), [0; 8]);
        assert_eq!(store.cost_totals().await.unwrap(), CostTotals::default());
        assert!(store.positive_durations().await.unwrap().is_empty());
        assert!(store.worker_totals().await.unwrap().is_empty());
        store.close().await;
    }

    #[tokio::test]
    async fn test_task_timing_ignores_zero_durations_for_min() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db")).await.unwrap();
        fixture
            .task(TaskRow::new("a", "completed").actual(0).times(1_000, Some(1_500), Some(4_000)))
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("b", "completed").actual(300).times(2_000, Some(2_100), Some(9_000)))
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("c", "pending").actual(900).times(500, None, None))
            .await
            .unwrap();

        let mut store = open(fixture).await;
        let timing = store.task_timing().await.unwrap();
        let durations = store.positive_durations().await.unwrap();
        let wait = store.avg_queue_wait().await.unwrap();
        store.close().await;

        assert_eq!(timing.first_created, Some(500));
        assert_eq!(timing.last_completed, Some(9_000));
        assert_eq!(timing.min_positive_ms, Some(300));
        assert_eq!(timing.max_actual_ms, Some(900));
        assert_eq!(timing.avg_actual_ms, Some(400.0));
        assert_eq!(durations, vec![300, 900]);
        assert_eq!(wait, Some(300.0));
    }

    #[tokio::test]
    async fn test_interval_queries_for_legacy_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db"))
            .await
            .unwrap()
            .with_sequence("task_state_sequence", "event")
            .await
            .unwrap();
        fixture.interval("a", Some("pending"), 0, Some(100)).await.unwrap();
        fixture.interval("a", Some("working"), 100, Some(400)).await.unwrap();
        fixture.interval("a", Some("assigned"), 400, Some(450)).await.unwrap();
        fixture.interval("a", Some("working"), 450, Some(500)).await.unwrap();
        fixture.interval("b", Some("working"), 200, None).await.unwrap();
        fixture.interval("b", None, 210, Some(220)).await.unwrap();

        let mut store = open(fixture).await;
        let plan = SchemaAdapter::probe(&mut store).await.unwrap();
        let table = plan.intervals.table().unwrap();

        let time = store.interval_time(table, 1_000).await.unwrap();
        let mut counts = store.working_interval_counts(table).await.unwrap();
        let intervals = store.state_intervals(table).await.unwrap();
        store.close().await;

        assert_eq!(time.working_ms, 300 + 50 + 800);
        assert_eq!(time.blocked_ms, 100 + 50);
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2]);
        assert_eq!(intervals.len(), 6);
        assert_eq!(intervals[0].state.as_deref(), Some("pending"));
        assert!(intervals.iter().any(|i| i.state.is_none()));
    }

    #[tokio::test]
    async fn test_worker_totals() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db")).await.unwrap();
        fixture
            .task(
                TaskRow::new("a", "completed")
                    .worker("w1")
                    .cost(1.5)
                    .actual(100)
                    .metrics([10, 5, 0, 0, 0, 0, 0, 0]),
            )
            .await
            .unwrap();
        fixture
            .task(
                TaskRow::new("b", "failed")
                    .worker("w1")
                    .cost(0.5)
                    .actual(50)
                    .metrics([1, 1, 0, 0, 0, 0, 0, 0]),
            )
            .await
            .unwrap();
        fixture.task(TaskRow::new("c", "pending").cost(9.0)).await.unwrap();

        let mut store = open(fixture).await;
        let workers = store.worker_totals().await.unwrap();
        store.close().await;

        assert_eq!(workers.len(), 1);
        let w = &workers[0];
        assert_eq!(w.worker_id, WorkerId::new("w1"));
        assert_eq!(w.tasks_completed, 1);
        assert_eq!(w.tasks_failed, 1);
        assert_eq!(w.total_cost_usd, 2.0);
        assert_eq!(w.total_time_ms, 150);
        assert_eq!(w.tokens_in, 11);
        assert_eq!(w.tokens_out, 6);
    }

    #[tokio::test]
    async fn test_timeline_and_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db"))
            .await
            .unwrap()
            .with_dependencies()
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("late", "completed").times(0, Some(1), Some(900)))
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("early", "completed").worker("w").times(0, Some(1), Some(100)))
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("open", "working").times(0, Some(1), None))
            .await
            .unwrap();
        fixture.dependency("early", "late", "blocks").await.unwrap();

        let mut store = open(fixture).await;
        let timeline = store.completion_timeline().await.unwrap();
        let edges = store.dependency_edges().await.unwrap();
        let statuses = store.status_counts().await.unwrap();
        store.close().await;

        let ids: Vec<_> = timeline.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(timeline[0].worker_id, Some(WorkerId::new("w")));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].dep_type, "blocks");
        assert_eq!(
            statuses,
            vec![("completed".to_string(), 2), ("working".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_task_records_in_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db")).await.unwrap();
        fixture
            .task(
                TaskRow::new("second", "review")
                    .worker("w1")
                    .points(2)
                    .cost(0.25)
                    .times(200, Some(250), None)
                    .metrics([1, 2, 3, 4, 5, 6, 7, 8]),
            )
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("first", "completed").times(100, Some(110), Some(190)))
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("gone", "failed").times(50, None, None).deleted(60))
            .await
            .unwrap();

        let mut store = open(fixture).await;
        let records = store.task_records().await.unwrap();
        store.close().await;

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(records[0].completed_at, Some(190));
        assert_eq!(records[1].status, "review");
        assert_eq!(records[1].worker_id, Some(WorkerId::new("w1")));
        assert_eq!(records[1].points, Some(2));
        assert_eq!(records[1].cost_usd, 0.25);
        assert_eq!(records[1].metrics, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_missing_tasks_table_is_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        let fixture = Fixture::create(&path).await.unwrap();
        let path = fixture.finish().await.unwrap();
        {
            use sqlx::{ConnectOptions, Connection};
            let mut conn = sqlx::sqlite::SqliteConnectOptions::new()
                .filename(&path)
                .connect()
                .await
                .unwrap();
            sqlx::query("DROP TABLE tasks").execute(&mut conn).await.unwrap();
            conn.close().await.unwrap();
        }

        let mut store = RunStore::open(&path).await.unwrap();
        let err = store.task_counts().await.unwrap_err();
        store.close().await;
        assert!(matches!(err, StoreError::Query { context: "task counts", .. }));
    }
}
