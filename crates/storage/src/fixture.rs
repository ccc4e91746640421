//! Builders for throwaway run stores used in tests.
//!
//! The schema mirrors what the task platform writes; only the columns
//! this crate reads are included.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};

const TASKS_SCHEMA: &str = r#"
CREATE TABLE tasks (
    id               TEXT PRIMARY KEY,
    title            TEXT NOT NULL DEFAULT '',
    status           TEXT NOT NULL,
    worker_id        TEXT,
    points           INTEGER,
    time_estimate_ms INTEGER,
    time_actual_ms   INTEGER,
    created_at       INTEGER NOT NULL,
    started_at       INTEGER,
    completed_at     INTEGER,
    cost_usd         REAL NOT NULL DEFAULT 0.0,
    metric_0 INTEGER NOT NULL DEFAULT 0,
    metric_1 INTEGER NOT NULL DEFAULT 0,
    metric_2 INTEGER NOT NULL DEFAULT 0,
    metric_3 INTEGER NOT NULL DEFAULT 0,
    metric_4 INTEGER NOT NULL DEFAULT 0,
    metric_5 INTEGER NOT NULL DEFAULT 0,
    metric_6 INTEGER NOT NULL DEFAULT 0,
    metric_7 INTEGER NOT NULL DEFAULT 0,
    deleted_at       INTEGER
)
"#;

/// One row of the `tasks` table.
#[derive(Debug, Clone)]
pub struct TaskRow {
    /// Task id
    pub id: String,
    /// Title
    pub title: String,
    /// Raw status value
    pub status: String,
    /// Claiming worker
    pub worker_id: Option<String>,
    /// Point estimate
    pub points: Option<i64>,
    /// Recorded duration
    pub time_actual_ms: Option<i64>,
    /// Creation time
    pub created_at: i64,
    /// First claim time
    pub started_at: Option<i64>,
    /// Completion time
    pub completed_at: Option<i64>,
    /// Cost
    pub cost_usd: f64,
    /// `metric_0..metric_7`
    pub metrics: [i64; 8],
    /// Soft-delete marker
    pub deleted_at: Option<i64>,
}

impl TaskRow {
    /// A task with the given id and status and everything else unset.
    pub fn new(id: &str, status: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Task {}", id),
            status: status.to_string(),
            worker_id: None,
            points: None,
            time_actual_ms: None,
            created_at: 0,
            started_at: None,
            completed_at: None,
            cost_usd: 0.0,
            metrics: [0; 8],
            deleted_at: None,
        }
    }

    /// Set the claiming worker.
    pub fn worker(mut self, worker_id: &str) -> Self {
        self.worker_id = Some(worker_id.to_string());
        self
    }

    /// Set the point estimate.
    pub fn points(mut self, points: i64) -> Self {
        self.points = Some(points);
        self
    }

    /// Set the recorded duration.
    pub fn actual(mut self, ms: i64) -> Self {
        self.time_actual_ms = Some(ms);
        self
    }

    /// Set creation, start and completion times.
    pub fn times(
        mut self,
        created_at: i64,
        started_at: Option<i64>,
        completed_at: Option<i64>,
    ) -> Self {
        self.created_at = created_at;
        self.started_at = started_at;
        self.completed_at = completed_at;
        self
    }

    /// Set the cost.
    pub fn cost(mut self, cost_usd: f64) -> Self {
        self.cost_usd = cost_usd;
        self
    }

    /// Set the token channels.
    pub fn metrics(mut self, metrics: [i64; 8]) -> Self {
        self.metrics = metrics;
        self
    }

    /// Mark the row soft-deleted.
    pub fn deleted(mut self, at: i64) -> Self {
        self.deleted_at = Some(at);
        self
    }
}

/// A writable store being populated for a test.
pub struct Fixture {
    conn: SqliteConnection,
    path: PathBuf,
    sequence: Option<(&'static str, &'static str)>,
}

impl Fixture {
    /// Create a new store at `path` with an empty `tasks` table.
    pub async fn create(path: &Path) -> sqlx::Result<Self> {
        let mut conn = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .connect()
            .await?;

        sqlx::query(TASKS_SCHEMA).execute(&mut conn).await?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            sequence: None,
        })
    }

    /// Add a state-interval table named `table` whose state label lives
    /// in `state_column`.
    pub async fn with_sequence(
        mut self,
        table: &'static str,
        state_column: &'static str,
    ) -> sqlx::Result<Self> {
        sqlx::query(&format!(
            "CREATE TABLE {table} (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id       TEXT NOT NULL,
                worker_id     TEXT,
                {state_column} TEXT,
                phase         TEXT,
                reason        TEXT,
                timestamp     INTEGER NOT NULL,
                end_timestamp INTEGER
            )"
        ))
        .execute(&mut self.conn)
        .await?;

        self.sequence = Some((table, state_column));
        Ok(self)
    }

    /// Add the `dependencies` table.
    pub async fn with_dependencies(mut self) -> sqlx::Result<Self> {
        sqlx::query(
            "CREATE TABLE dependencies (
                from_task_id TEXT NOT NULL,
                to_task_id   TEXT NOT NULL,
                dep_type     TEXT NOT NULL DEFAULT 'blocks'
            )",
        )
        .execute(&mut self.conn)
        .await?;
        Ok(self)
    }

    /// Run an arbitrary statement, for stores with unusual shapes.
    pub async fn execute(&mut self, sql: &str) -> sqlx::Result<()> {
        sqlx::query(sql).execute(&mut self.conn).await?;
        Ok(())
    }

    /// Insert a task row.
    pub async fn task(&mut self, row: TaskRow) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO tasks (id, title, status, worker_id, points, time_actual_ms,
                created_at, started_at, completed_at, cost_usd,
                metric_0, metric_1, metric_2, metric_3, metric_4, metric_5, metric_6, metric_7,
                deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(row.id)
        .bind(row.title)
        .bind(row.status)
        .bind(row.worker_id)
        .bind(row.points)
        .bind(row.time_actual_ms)
        .bind(row.created_at)
        .bind(row.started_at)
        .bind(row.completed_at)
        .bind(row.cost_usd)
        .bind(row.metrics[0])
        .bind(row.metrics[1])
        .bind(row.metrics[2])
        .bind(row.metrics[3])
        .bind(row.metrics[4])
        .bind(row.metrics[5])
        .bind(row.metrics[6])
        .bind(row.metrics[7])
        .bind(row.deleted_at)
        .execute(&mut self.conn)
        .await?;
        Ok(())
    }

    /// Insert a state interval into the table added by
    /// [`with_sequence`](Fixture::with_sequence).
    pub async fn interval(
        &mut self,
        task_id: &str,
        state: Option<&str>,
        start: i64,
        end: Option<i64>,
    ) -> sqlx::Result<()> {
        let Some((table, state_column)) = self.sequence else {
            return Err(sqlx::Error::Protocol("fixture has no sequence table".into()));
        };

        sqlx::query(&format!(
            "INSERT INTO {table} (task_id, {state_column}, timestamp, end_timestamp)
             VALUES (?, ?, ?, ?)"
        ))
        .bind(task_id)
        .bind(state)
        .bind(start)
        .bind(end)
        .execute(&mut self.conn)
        .await?;
        Ok(())
    }

    /// Insert a dependency edge.
    pub async fn dependency(&mut self, from: &str, to: &str, dep_type: &str) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO dependencies (from_task_id, to_task_id, dep_type) VALUES (?, ?, ?)",
        )
            .bind(from)
            .bind(to)
            .bind(dep_type)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }

    /// Close the writer and return the store path.
    pub async fn finish(self) -> sqlx::Result<PathBuf> {
        self.conn.close().await?;
        Ok(self.path)
    }
}
