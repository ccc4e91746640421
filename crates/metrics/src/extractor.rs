//! Metrics extractor - reads one run store into a snapshot.

use chrono::Utc;
use runlens_core::{Millis, MetricsSnapshot, QualityMetrics};
use runlens_storage::{RunStore, SchemaAdapter};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::groups::{
    cost_from, distribution_from, quality_from, throughput_from, time_from, tokens_from,
    workers_from,
};

/// Configuration for the metrics extractor.
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    /// Time used to close intervals that are still open.
    ///
    /// `None` samples the clock once at the start of each extraction.
    pub now_ms: Option<Millis>,
}

/// Extracts a [`MetricsSnapshot`] from a run store.
#[derive(Debug, Clone, Default)]
pub struct MetricsExtractor {
    config: ExtractorConfig,
}

impl MetricsExtractor {
    /// Create an extractor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract the snapshot of the run stored at `path`.
    ///
    /// The store is opened read-only and closed before returning, whether
    /// or not extraction succeeded.
    pub async fn extract(&self, path: &Path, label: &str) -> Result<MetricsSnapshot> {
        info!("Extracting metrics for {} from {}", label, path.display());

        let now = self
            .config
            .now_ms
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        let mut store = RunStore::open(path).await?;
        let collected = collect(&mut store, now).await;
        store.close().await;

        let mut snapshot = collected?;
        snapshot.label = label.to_string();
        snapshot.source = path.display().to_string();

        info!(
            "Extracted {}: {} tasks, {} completed, {} workers",
            label, snapshot.tasks.total_tasks, snapshot.tasks.completed, snapshot.worker_count
        );
        Ok(snapshot)
    }
}

async fn collect(store: &mut RunStore, now: Millis) -> Result<MetricsSnapshot> {
    let plan = SchemaAdapter::probe(store).await?;

    let tasks = distribution_from(&store.task_counts().await?);

    let timing = store.task_timing().await?;
    let durations = store.positive_durations().await?;
    let queue_wait = store.avg_queue_wait().await?;

    let (intervals, quality) = match plan.intervals.table() {
        Some(table) => {
            let intervals = store.interval_time(table, now).await?;
            let periods = store.working_interval_counts(table).await?;
            debug!("{} tasks with working intervals", periods.len());
            (Some(intervals), quality_from(&periods))
        }
        None => {
            debug!("No interval table; working, blocked and rework metrics stay at zero");
            (None, QualityMetrics::default())
        }
    };
    let time = time_from(&timing, &durations, intervals, queue_wait);

    let tokens = tokens_from(store.token_channels().await?);
    let cost = cost_from(&store.cost_totals().await?);

    let workers = workers_from(store.worker_totals().await?);
    let throughput = throughput_from(&tasks, &time, workers.len());

    Ok(MetricsSnapshot {
        label: String::new(),
        source: String::new(),
        worker_count: workers.len(),
        time,
        tokens,
        cost,
        tasks,
        quality,
        throughput,
        workers,
    })
}
