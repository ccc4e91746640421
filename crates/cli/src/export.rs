//! Raw dataset export.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use runlens_core::derive::round_to;
use runlens_core::{
    CompletedTask, DependencyEdge, Millis, StateInterval, TaskRecord, TaskStatus, WorkerStats,
};
use runlens_storage::{RunStore, SchemaAdapter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where exported files go.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("runlens-export"),
        }
    }
}

/// An interval row with its length.
#[derive(Serialize)]
struct Transition<'a> {
    #[serde(flatten)]
    interval: &'a StateInterval,
    /// `None` while the interval is open
    duration_ms: Option<Millis>,
}

/// Headline numbers of an exported run.
#[derive(Debug, Serialize)]
struct ExportSummary {
    exported_at: String,
    db_path: String,
    total_tasks: usize,
    status_counts: BTreeMap<String, i64>,
    completed_tasks: usize,
    total_actual_ms: Millis,
    /// Earliest start to latest completion
    wall_clock_ms: Millis,
    total_cost_usd: f64,
    avg_task_time_ms: Millis,
}

impl ExportSummary {
    fn from_records(db: &Path, records: &[TaskRecord]) -> Self {
        let mut status_counts = BTreeMap::new();
        for record in records {
            *status_counts.entry(record.status.clone()).or_insert(0) += 1;
        }

        let completed: Vec<&TaskRecord> = records
            .iter()
            .filter(|r| TaskStatus::parse(&r.status) == TaskStatus::Completed)
            .collect();
        let total_actual_ms: Millis = completed.iter().filter_map(|r| r.time_actual_ms).sum();
        let total_cost: f64 = records.iter().map(|r| r.cost_usd).sum();

        let first_start = records.iter().filter_map(|r| r.started_at).filter(|&t| t > 0).min();
        let last_end = records.iter().filter_map(|r| r.completed_at).filter(|&t| t > 0).max();
        let wall_clock_ms = match (first_start, last_end) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        };

        let avg_task_time_ms = if completed.is_empty() {
            0
        } else {
            (total_actual_ms as f64 / completed.len() as f64).round() as Millis
        };

        Self {
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            db_path: db.display().to_string(),
            total_tasks: records.len(),
            status_counts,
            completed_tasks: completed.len(),
            total_actual_ms,
            wall_clock_ms,
            total_cost_usd: round_to(total_cost, 6),
            avg_task_time_ms,
        }
    }
}

struct Datasets {
    tasks: Vec<TaskRecord>,
    workers: Vec<WorkerStats>,
    timeline: Vec<CompletedTask>,
    dependencies: Option<Vec<DependencyEdge>>,
    intervals: Option<Vec<StateInterval>>,
}

async fn read_datasets(store: &mut RunStore) -> runlens_storage::Result<Datasets> {
    let plan = SchemaAdapter::probe(store).await?;

    let dependencies = if plan.has_dependencies {
        Some(store.dependency_edges().await?)
    } else {
        None
    };
    let intervals = match plan.intervals.table() {
        Some(table) => Some(store.state_intervals(table).await?),
        None => None,
    };

    let mut workers = store.worker_totals().await?;
    workers.sort_by(|a, b| {
        b.tasks_completed
            .cmp(&a.tasks_completed)
            .then_with(|| a.worker_id.cmp(&b.worker_id))
    });

    Ok(Datasets {
        tasks: store.task_records().await?,
        workers,
        timeline: store.completion_timeline().await?,
        dependencies,
        intervals,
    })
}

fn write_file(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    write_file(dir, name, &serde_json::to_string_pretty(value)?)
}

/// Quote a CSV field when it holds a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn timeline_csv(timeline: &[CompletedTask]) -> String {
    let mut out = String::from("timestamp_ms,task_id,title,worker_id,time_actual_ms,cost_usd\n");
    for task in timeline {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            task.completed_at,
            csv_field(task.task_id.as_str()),
            csv_field(&task.title),
            task.worker_id
                .as_ref()
                .map(|w| csv_field(w.as_str()))
                .unwrap_or_default(),
            task.time_actual_ms.map(|ms| ms.to_string()).unwrap_or_default(),
            task.cost_usd,
        );
    }
    out
}

/// Export the run's tasks, summary, per-worker totals, transitions,
/// completion timeline and dependency edges. Returns the files written.
pub async fn export_run(db: &Path, config: &ExportConfig) -> Result<Vec<PathBuf>> {
    let mut store = RunStore::open(db).await?;
    let datasets = read_datasets(&mut store).await;
    store.close().await;
    let datasets = datasets?;

    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = vec![
        write_json(dir, "tasks.json", &datasets.tasks)?,
        write_json(dir, "summary.json", &ExportSummary::from_records(db, &datasets.tasks))?,
        write_json(dir, "agents.json", &datasets.workers)?,
    ];

    match &datasets.intervals {
        Some(intervals) => {
            let transitions: Vec<Transition<'_>> = intervals
                .iter()
                .map(|interval| Transition {
                    interval,
                    duration_ms: (!interval.is_open()).then(|| interval.recorded_duration_ms()),
                })
                .collect();
            written.push(write_json(dir, "transitions.json", &transitions)?);
        }
        None => info!("No interval table; skipping transitions.json"),
    }

    written.push(write_file(dir, "timeline.csv", &timeline_csv(&datasets.timeline))?);

    match &datasets.dependencies {
        Some(edges) => written.push(write_json(dir, "dependencies.json", edges)?),
        None => info!("No dependencies table; skipping dependencies.json"),
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlens_storage::fixture::{Fixture, TaskRow};

    fn read_json(path: PathBuf) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_export_all_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::create(&dir.path().join("run.db"))
            .await
            .unwrap()
            .with_sequence("task_sequence", "status")
            .await
            .unwrap()
            .with_dependencies()
            .await
            .unwrap();
        fixture
            .task(
                TaskRow::new("a", "completed")
                    .worker("w1")
                    .actual(490)
                    .cost(1.5)
                    .times(0, Some(10), Some(500)),
            )
            .await
            .unwrap();
        fixture
            .task(TaskRow::new("b", "working").worker("w2").times(1, Some(600), None))
            .await
            .unwrap();
        fixture.interval("a", Some("working"), 10, Some(500)).await.unwrap();
        fixture.interval("b", Some("working"), 600, None).await.unwrap();
        fixture.dependency("a", "b", "blocks").await.unwrap();
        let db = fixture.finish().await.unwrap();

        let config = ExportConfig {
            output_dir: dir.path().join("out"),
        };
        let written = export_run(&db, &config).await.unwrap();
        assert_eq!(written.len(), 6);

        let transitions = read_json(config.output_dir.join("transitions.json"));
        assert_eq!(transitions[0]["task_id"], "a");
        assert_eq!(transitions[0]["duration_ms"], 490);
        assert!(transitions[1]["duration_ms"].is_null());

        let tasks = read_json(config.output_dir.join("tasks.json"));
        assert_eq!(tasks.as_array().unwrap().len(), 2);
        assert_eq!(tasks[1]["status"], "working");

        let agents = read_json(config.output_dir.join("agents.json"));
        assert_eq!(agents[0]["worker_id"], "w1");
        assert_eq!(agents[0]["tasks_completed"], 1);

        let summary = read_json(config.output_dir.join("summary.json"));
        assert_eq!(summary["total_tasks"], 2);
        assert_eq!(summary["completed_tasks"], 1);
        assert_eq!(summary["status_counts"]["working"], 1);
        assert_eq!(summary["wall_clock_ms"], 490);
        assert_eq!(summary["avg_task_time_ms"], 490);
        assert_eq!(summary["total_cost_usd"], 1.5);

        let csv = std::fs::read_to_string(config.output_dir.join("timeline.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "timestamp_ms,task_id,title,worker_id,time_actual_ms,cost_usd",
                "500,a,Task a,w1,490,1.5",
            ]
        );
    }

    #[tokio::test]
    async fn test_export_skips_absent_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let db = Fixture::create(&dir.path().join("run.db"))
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        let config = ExportConfig {
            output_dir: dir.path().join("out"),
        };
        let written = export_run(&db, &config).await.unwrap();

        let names: Vec<_> = written
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["tasks.json", "summary.json", "agents.json", "timeline.csv"]);
        assert!(!config.output_dir.join("dependencies.json").exists());

        let summary = read_json(config.output_dir.join("summary.json"));
        assert_eq!(summary["total_tasks"], 0);
        assert_eq!(summary["avg_task_time_ms"], 0);
    }

    #[test]
    fn test_csv_field_quotes_separators() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
