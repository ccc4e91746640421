//! Metrics snapshot - the computed summary of one run.
//!
//! Every group defaults to all zeros. A group whose source dataset is
//! missing from the store keeps those defaults, so its keys are always
//! present for reports and comparisons.

use serde::{Deserialize, Serialize};
use crate::id::WorkerId;
use crate::Millis;

/// The fully computed metrics of one run.
///
/// Built once per extraction and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Label shown for the run in reports
    pub label: String,

    /// Path of the store the run was read from
    #[serde(rename = "db_path")]
    pub source: String,

    /// Number of distinct workers observed
    #[serde(rename = "agent_count")]
    pub worker_count: usize,

    /// Timing
    pub time: TimeMetrics,

    /// Token accounting
    pub tokens: TokenMetrics,

    /// Cost accounting
    pub cost: CostMetrics,

    /// Task outcome distribution
    pub tasks: TaskDistribution,

    /// Rework and first-pass quality
    pub quality: QualityMetrics,

    /// Throughput
    pub throughput: ThroughputMetrics,

    /// Per-worker breakdown, most expensive first
    #[serde(rename = "agents")]
    pub workers: Vec<WorkerStats>,
}

/// Timing metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeMetrics {
    /// Latest completion minus earliest creation
    pub total_duration_ms: Millis,
    /// Mean recorded task duration
    pub avg_task_time_ms: f64,
    /// Median of positive task durations
    pub median_task_time_ms: f64,
    /// Shortest positive task duration
    pub min_task_time_ms: Millis,
    /// Longest task duration
    pub max_task_time_ms: Millis,
    /// Time spent in working intervals
    pub total_working_ms: Millis,
    /// Time spent in pending/assigned intervals
    pub total_blocked_ms: Millis,
    /// Blocked share of tracked time
    pub blocking_ratio_pct: f64,
    /// Mean time from creation to first claim
    pub avg_queue_wait_ms: f64,
}

/// Token metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    /// Channel 0
    pub tokens_in: i64,
    /// Channel 1
    pub tokens_out: i64,
    /// Channel 2
    pub tokens_cached: i64,
    /// Channel 3
    pub tokens_thinking: i64,
    /// Channel 4
    pub tokens_image: i64,
    /// Channel 5
    pub tokens_audio: i64,
    /// Channel 6 (reserved)
    pub metric_6: i64,
    /// Channel 7 (reserved)
    pub metric_7: i64,
    /// Input + output + thinking
    pub total_billable: i64,
    /// Cached share of all prompt tokens
    pub cache_hit_rate_pct: f64,
    /// Output tokens per input token
    pub output_ratio: f64,
    /// Thinking tokens per output token
    pub thinking_overhead: f64,
}

impl TokenMetrics {
    /// Build the channel sums from the raw `metric_0..metric_7` totals.
    ///
    /// Derived fields are left at zero.
    pub fn from_channels(channels: [i64; 8]) -> Self {
        let [
            tokens_in,
            tokens_out,
            tokens_cached,
            tokens_thinking,
            tokens_image,
            tokens_audio,
            metric_6,
            metric_7,
        ] = channels;
        Self {
            tokens_in,
            tokens_out,
            tokens_cached,
            tokens_thinking,
            tokens_image,
            tokens_audio,
            metric_6,
            metric_7,
            ..Default::default()
        }
    }
}

/// Cost metrics, in USD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostMetrics {
    /// Sum over all tasks
    pub total_cost_usd: f64,
    /// Mean over all tasks
    pub avg_cost_per_task: f64,
    /// Total cost per completed task
    pub cost_per_completed_task: f64,
    /// Total cost per completed point
    pub cost_per_point: f64,
}

/// Task outcome distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDistribution {
    /// All non-deleted tasks
    pub total_tasks: i64,
    /// Completed tasks
    pub completed: i64,
    /// Failed tasks
    pub failed: i64,
    /// Cancelled tasks
    pub cancelled: i64,
    /// Pending tasks
    pub pending: i64,
    /// Tasks still being worked
    pub working: i64,
    /// Completed share of claimed tasks
    pub completion_rate_pct: f64,
    /// Failed share of claimed tasks
    pub failure_rate_pct: f64,
    /// Points over all tasks
    pub total_points: i64,
    /// Points over completed tasks
    pub completed_points: i64,
}

impl TaskDistribution {
    /// Tasks that were actually worked: completed + failed + working.
    pub fn claimed_total(&self) -> i64 {
        self.completed + self.failed + self.working
    }
}

/// Rework metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Tasks with more than one working interval
    pub rework_count: i64,
    /// Reworked share of tasks that were worked
    pub rework_rate_pct: f64,
    /// Mean working intervals per reworked task
    pub avg_rework_cycles: f64,
    /// Share of worked tasks done in one pass
    pub first_pass_success_pct: f64,
}

/// Throughput metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    /// Completed tasks per hour of run duration
    pub tasks_per_hour: f64,
    /// Completed points per hour of run duration
    pub points_per_hour: f64,
    /// Completed tasks per worker per hour
    pub avg_tasks_per_agent_hour: f64,
}

/// Per-worker breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Worker identity
    pub worker_id: WorkerId,
    /// Completed tasks
    pub tasks_completed: i64,
    /// Failed tasks
    pub tasks_failed: i64,
    /// Cost of all the worker's tasks
    pub total_cost_usd: f64,
    /// Recorded duration of all the worker's tasks
    pub total_time_ms: Millis,
    /// Input tokens
    pub tokens_in: i64,
    /// Output tokens
    pub tokens_out: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_keeps_every_group() {
        let json = serde_json::to_value(MetricsSnapshot::default()).unwrap();

        for key in ["time", "tokens", "cost", "tasks", "quality", "throughput", "agents"] {
            assert!(json.get(key).is_some(), "missing group {}", key);
        }
        assert_eq!(json["quality"]["rework_rate_pct"], 0.0);
        assert_eq!(json["db_path"], "");
        assert_eq!(json["agent_count"], 0);
    }

    #[test]
    fn test_token_channels_map_in_order() {
        let tokens = TokenMetrics::from_channels([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(tokens.tokens_in, 1);
        assert_eq!(tokens.tokens_out, 2);
        assert_eq!(tokens.tokens_cached, 3);
        assert_eq!(tokens.tokens_thinking, 4);
        assert_eq!(tokens.tokens_image, 5);
        assert_eq!(tokens.tokens_audio, 6);
        assert_eq!(tokens.metric_6, 7);
        assert_eq!(tokens.metric_7, 8);
        assert_eq!(tokens.total_billable, 0);
    }

    #[test]
    fn test_claimed_total() {
        let dist = TaskDistribution {
            completed: 7,
            failed: 2,
            working: 1,
            pending: 4,
            cancelled: 3,
            ..Default::default()
        };
        assert_eq!(dist.claimed_total(), 10);
    }
}
