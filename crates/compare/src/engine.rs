//! Comparison engine - deltas between a baseline and a candidate run.

use runlens_core::derive::safe_div;
use runlens_core::MetricsSnapshot;
use tracing::debug;

use crate::policy::TrackedMetric;

/// Which way a metric moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Candidate is lower
    Lower,
    /// Candidate is higher or equal
    Higher,
}

/// Whether a move is good or bad for the metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Moved in the target direction
    Improvement,
    /// Moved against the target direction
    Regression,
}

/// Change of one tracked metric from baseline to candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    /// The metric
    pub metric: TrackedMetric,
    /// Baseline value
    pub baseline: f64,
    /// Candidate value
    pub candidate: f64,
    /// `candidate - baseline`
    pub diff: f64,
    /// `diff` relative to the baseline magnitude, 0 when the baseline is 0
    pub pct: f64,
    /// Sign of `diff`
    pub direction: Direction,
    /// `None` when nothing changed
    pub marker: Option<Marker>,
}

/// All tracked deltas between two runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Label of run A
    pub baseline_label: String,
    /// Label of run B
    pub candidate_label: String,
    /// One delta per tracked metric, in report order
    pub deltas: Vec<Delta>,
}

/// Compare candidate `b` against baseline `a`.
pub fn compare(a: &MetricsSnapshot, b: &MetricsSnapshot) -> Comparison {
    let deltas = TrackedMetric::ALL
        .iter()
        .map(|&metric| delta(metric, metric.value_of(a), metric.value_of(b)))
        .collect();

    Comparison {
        baseline_label: a.label.clone(),
        candidate_label: b.label.clone(),
        deltas,
    }
}

/// Compare a list of runs; only a pair has a comparison.
pub fn compare_runs(runs: &[MetricsSnapshot]) -> Option<Comparison> {
    match runs {
        [a, b] => Some(compare(a, b)),
        _ => {
            debug!("{} runs; skipping delta analysis", runs.len());
            None
        }
    }
}

fn delta(metric: TrackedMetric, baseline: f64, candidate: f64) -> Delta {
    let diff = candidate - baseline;
    let pct = safe_div(diff * 100.0, baseline.abs(), 0.0);

    let direction = if diff < 0.0 {
        Direction::Lower
    } else {
        Direction::Higher
    };

    let marker = if diff == 0.0 {
        None
    } else if (diff < 0.0) == metric.lower_is_better() {
        Some(Marker::Improvement)
    } else {
        Some(Marker::Regression)
    };

    Delta {
        metric,
        baseline,
        candidate,
        diff,
        pct,
        direction,
        marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(label: &str, cost: f64, completed: i64) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot {
            label: label.to_string(),
            ..Default::default()
        };
        snapshot.cost.total_cost_usd = cost;
        snapshot.tasks.completed = completed;
        snapshot.time.total_duration_ms = 3_600_000;
        snapshot
    }

    fn delta_for(comparison: &Comparison, metric: TrackedMetric) -> &Delta {
        comparison.deltas.iter().find(|d| d.metric == metric).unwrap()
    }

    #[test]
    fn test_identical_runs_have_no_change() {
        let a = run("a", 3.5, 4);
        let comparison = compare(&a, &a.clone());

        assert_eq!(comparison.deltas.len(), TrackedMetric::ALL.len());
        for delta in &comparison.deltas {
            assert_eq!(delta.diff, 0.0);
            assert_eq!(delta.pct, 0.0);
            assert_eq!(delta.marker, None);
        }
    }

    #[test]
    fn test_cheaper_candidate_is_improvement() {
        let comparison = compare(&run("A", 10.0, 5), &run("B", 8.0, 5));

        let cost = delta_for(&comparison, TrackedMetric::TotalCost);
        assert_eq!(cost.diff, -2.0);
        assert_eq!(cost.pct, -20.0);
        assert_eq!(cost.direction, Direction::Lower);
        assert_eq!(cost.marker, Some(Marker::Improvement));

        assert_eq!(comparison.baseline_label, "A");
        assert_eq!(comparison.candidate_label, "B");
    }

    #[test]
    fn test_polarity_drives_marker() {
        let comparison = compare(&run("A", 1.0, 5), &run("B", 2.0, 3));

        let completed = delta_for(&comparison, TrackedMetric::TasksCompleted);
        assert_eq!(completed.direction, Direction::Lower);
        assert_eq!(completed.marker, Some(Marker::Regression));

        let cost = delta_for(&comparison, TrackedMetric::TotalCost);
        assert_eq!(cost.direction, Direction::Higher);
        assert_eq!(cost.marker, Some(Marker::Regression));
        assert_eq!(cost.pct, 100.0);
    }

    #[test]
    fn test_zero_baseline_has_zero_pct() {
        let comparison = compare(&run("A", 0.0, 0), &run("B", 4.0, 2));

        let cost = delta_for(&comparison, TrackedMetric::TotalCost);
        assert_eq!(cost.diff, 4.0);
        assert_eq!(cost.pct, 0.0);
        assert_eq!(cost.marker, Some(Marker::Regression));
    }

    #[test]
    fn test_compare_runs_needs_exactly_two() {
        let a = run("a", 1.0, 1);
        let b = run("b", 2.0, 2);

        assert!(compare_runs(&[]).is_none());
        assert!(compare_runs(&[a.clone()]).is_none());
        assert!(compare_runs(&[a.clone(), b.clone(), a.clone()]).is_none());
        assert!(compare_runs(&[a, b]).is_some());
    }
}
