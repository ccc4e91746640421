//! Pure builders from raw store aggregates to snapshot groups.
//!
//! Nothing here touches the store; every ratio goes through
//! [`safe_div`] so zero denominators yield zero instead of failing.

use runlens_core::derive::{
    median, percent, round_to, safe_div, AVG_PLACES, COST_PLACES, MS_PER_HOUR, PCT_PLACES,
    RATE_PLACES, RATIO_PLACES,
};
use runlens_core::{
    CostMetrics, Millis, QualityMetrics, TaskDistribution, ThroughputMetrics, TimeMetrics,
    TokenMetrics, WorkerStats,
};
use runlens_storage::{CostTotals, IntervalTime, TaskCounts, TaskTiming};

/// Outcome distribution and completion/failure rates over claimed tasks.
pub fn distribution_from(counts: &TaskCounts) -> TaskDistribution {
    let mut dist = TaskDistribution {
        total_tasks: counts.total,
        completed: counts.completed,
        failed: counts.failed,
        cancelled: counts.cancelled,
        pending: counts.pending,
        working: counts.working,
        total_points: counts.total_points,
        completed_points: counts.completed_points,
        ..Default::default()
    };

    let claimed = dist.claimed_total() as f64;
    dist.completion_rate_pct = round_to(percent(dist.completed as f64, claimed), PCT_PLACES);
    dist.failure_rate_pct = round_to(percent(dist.failed as f64, claimed), PCT_PLACES);
    dist
}

/// Timing group.
///
/// `durations` are the positive recorded durations; `intervals` is `None`
/// when the store has no interval table, leaving working, blocked and the
/// blocking ratio at zero.
pub fn time_from(
    timing: &TaskTiming,
    durations: &[Millis],
    intervals: Option<IntervalTime>,
    queue_wait_ms: Option<f64>,
) -> TimeMetrics {
    let total_duration_ms = match (timing.first_created, timing.last_completed) {
        (Some(first), Some(last)) => last - first,
        _ => 0,
    };

    let mut time = TimeMetrics {
        total_duration_ms,
        avg_task_time_ms: round_to(timing.avg_actual_ms.unwrap_or(0.0), AVG_PLACES),
        median_task_time_ms: median(durations),
        min_task_time_ms: timing.min_positive_ms.unwrap_or(0),
        max_task_time_ms: timing.max_actual_ms.unwrap_or(0),
        avg_queue_wait_ms: round_to(queue_wait_ms.unwrap_or(0.0), AVG_PLACES),
        ..Default::default()
    };

    if let Some(IntervalTime { working_ms, blocked_ms }) = intervals {
        time.total_working_ms = working_ms;
        time.total_blocked_ms = blocked_ms;
        time.blocking_ratio_pct = round_to(
            percent(blocked_ms as f64, (working_ms + blocked_ms) as f64),
            PCT_PLACES,
        );
    }

    time
}

/// Token group from the eight channel sums.
pub fn tokens_from(channels: [i64; 8]) -> TokenMetrics {
    let mut tokens = TokenMetrics::from_channels(channels);
    let input = tokens.tokens_in as f64;
    let output = tokens.tokens_out as f64;
    let cached = tokens.tokens_cached as f64;
    let thinking = tokens.tokens_thinking as f64;

    tokens.total_billable = tokens.tokens_in + tokens.tokens_out + tokens.tokens_thinking;
    tokens.cache_hit_rate_pct = round_to(percent(cached, input + cached), PCT_PLACES);
    tokens.output_ratio = round_to(safe_div(output, input, 0.0), RATIO_PLACES);
    tokens.thinking_overhead = round_to(safe_div(thinking, output, 0.0), RATIO_PLACES);
    tokens
}

/// Cost group.
pub fn cost_from(totals: &CostTotals) -> CostMetrics {
    let total = totals.total_cost;
    let per = |count: i64| round_to(safe_div(total, count as f64, 0.0), COST_PLACES);

    CostMetrics {
        total_cost_usd: round_to(total, COST_PLACES),
        avg_cost_per_task: per(totals.task_count),
        cost_per_completed_task: per(totals.completed),
        cost_per_point: per(totals.completed_points),
    }
}

/// Rework group from the number of working intervals of each task that
/// had at least one.
///
/// Rework and first-pass shares come from the same integer counts, so
/// they sum to 100 within rounding whenever any task was worked.
pub fn quality_from(working_periods: &[i64]) -> QualityMetrics {
    let with_work = working_periods.len() as i64;
    let cycles: Vec<i64> = working_periods.iter().copied().filter(|&n| n > 1).collect();
    let reworked = cycles.len() as i64;

    QualityMetrics {
        rework_count: reworked,
        rework_rate_pct: round_to(percent(reworked as f64, with_work as f64), PCT_PLACES),
        avg_rework_cycles: round_to(
            safe_div(cycles.iter().sum::<i64>() as f64, reworked as f64, 0.0),
            AVG_PLACES,
        ),
        first_pass_success_pct: round_to(
            percent((with_work - reworked) as f64, with_work as f64),
            PCT_PLACES,
        ),
    }
}

/// Throughput over the run's wall-clock duration.
///
/// The per-worker rate stays zero unless at least one worker was seen
/// and the run has a positive duration.
pub fn throughput_from(
    dist: &TaskDistribution,
    time: &TimeMetrics,
    worker_count: usize,
) -> ThroughputMetrics {
    let hours = safe_div(time.total_duration_ms as f64, MS_PER_HOUR, 0.0);
    let completed = dist.completed as f64;

    let mut throughput = ThroughputMetrics {
        tasks_per_hour: round_to(safe_div(completed, hours, 0.0), RATE_PLACES),
        points_per_hour: round_to(
            safe_div(dist.completed_points as f64, hours, 0.0),
            RATE_PLACES,
        ),
        ..Default::default()
    };

    if worker_count > 0 && hours > 0.0 {
        throughput.avg_tasks_per_agent_hour = round_to(
            safe_div(completed, hours * worker_count as f64, 0.0),
            RATE_PLACES,
        );
    }

    throughput
}

/// Order workers by descending cost and round their costs.
///
/// The sort is stable: workers with equal cost keep the store's order.
pub fn workers_from(mut workers: Vec<WorkerStats>) -> Vec<WorkerStats> {
    workers.sort_by(|a, b| b.total_cost_usd.total_cmp(&a.total_cost_usd));
    for worker in &mut workers {
        worker.total_cost_usd = round_to(worker.total_cost_usd, COST_PLACES);
    }
    workers
}
