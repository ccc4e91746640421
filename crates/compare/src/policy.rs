//! Tracked metrics and their target direction.

use runlens_core::MetricsSnapshot;

/// How a metric's values are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Milliseconds
    Duration,
    /// US dollars
    Currency,
    /// A plain count
    Count,
    /// A percentage
    Percent,
    /// A per-hour rate
    Rate,
}

/// A metric compared between two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedMetric {
    /// Wall-clock duration of the run
    TotalDuration,
    /// Total cost
    TotalCost,
    /// Completed task count
    TasksCompleted,
    /// Completion rate over claimed tasks
    CompletionRate,
    /// Completed tasks per hour
    TasksPerHour,
    /// Share of worked tasks that were reworked
    ReworkRate,
    /// Input + output + thinking tokens
    TotalBillableTokens,
    /// Blocked share of tracked time
    BlockingRatio,
}

impl TrackedMetric {
    /// Every tracked metric, in report order.
    pub const ALL: [TrackedMetric; 8] = [
        TrackedMetric::TotalDuration,
        TrackedMetric::TotalCost,
        TrackedMetric::TasksCompleted,
        TrackedMetric::CompletionRate,
        TrackedMetric::TasksPerHour,
        TrackedMetric::ReworkRate,
        TrackedMetric::TotalBillableTokens,
        TrackedMetric::BlockingRatio,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            TrackedMetric::TotalDuration => "Total Duration",
            TrackedMetric::TotalCost => "Total Cost",
            TrackedMetric::TasksCompleted => "Tasks Completed",
            TrackedMetric::CompletionRate => "Completion Rate",
            TrackedMetric::TasksPerHour => "Tasks/Hour",
            TrackedMetric::ReworkRate => "Rework Rate",
            TrackedMetric::TotalBillableTokens => "Total Billable Tokens",
            TrackedMetric::BlockingRatio => "Blocking Ratio",
        }
    }

    /// Whether a decrease counts as an improvement.
    pub fn lower_is_better(&self) -> bool {
        match self {
            TrackedMetric::TotalDuration
            | TrackedMetric::TotalCost
            | TrackedMetric::ReworkRate
            | TrackedMetric::TotalBillableTokens
            | TrackedMetric::BlockingRatio => true,
            TrackedMetric::TasksCompleted
            | TrackedMetric::CompletionRate
            | TrackedMetric::TasksPerHour => false,
        }
    }

    /// Display unit.
    pub fn unit(&self) -> MetricUnit {
        match self {
            TrackedMetric::TotalDuration => MetricUnit::Duration,
            TrackedMetric::TotalCost => MetricUnit::Currency,
            TrackedMetric::TasksCompleted | TrackedMetric::TotalBillableTokens => MetricUnit::Count,
            TrackedMetric::CompletionRate
            | TrackedMetric::ReworkRate
            | TrackedMetric::BlockingRatio => MetricUnit::Percent,
            TrackedMetric::TasksPerHour => MetricUnit::Rate,
        }
    }

    /// Read this metric from a snapshot.
    pub fn value_of(&self, snapshot: &MetricsSnapshot) -> f64 {
        match self {
            TrackedMetric::TotalDuration => snapshot.time.total_duration_ms as f64,
            TrackedMetric::TotalCost => snapshot.cost.total_cost_usd,
            TrackedMetric::TasksCompleted => snapshot.tasks.completed as f64,
            TrackedMetric::CompletionRate => snapshot.tasks.completion_rate_pct,
            TrackedMetric::TasksPerHour => snapshot.throughput.tasks_per_hour,
            TrackedMetric::ReworkRate => snapshot.quality.rework_rate_pct,
            TrackedMetric::TotalBillableTokens => snapshot.tokens.total_billable as f64,
            TrackedMetric::BlockingRatio => snapshot.time.blocking_ratio_pct,
        }
    }
}
