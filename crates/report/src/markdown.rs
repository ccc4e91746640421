//! Markdown report.

use runlens_compare::{Comparison, Delta, Marker, MetricUnit};
use runlens_core::MetricsSnapshot;

use crate::format::{fmt_count, fmt_ms, fmt_number, fmt_pct, fmt_rate, fmt_ratio, fmt_usd};
use crate::{Renderer, Report, ReportError};

/// Renders side-by-side metric tables, per-worker breakdowns and, for a
/// pair of runs, a delta table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, report: &Report<'_>) -> Result<String, ReportError> {
        let runs = report.runs;
        let mut headers = vec!["Metric".to_string()];
        headers.extend(runs.iter().map(|r| r.label.clone()));

        let mut sections = vec!["# Experiment Comparison Report\n".to_string()];

        sections.push("## Summary\n".to_string());
        sections.push(table("Overview", &headers, &summary_rows(runs)));

        for (heading, title, rows) in [
            ("Time Metrics", "Time", time_rows(runs)),
            ("Token Metrics", "Tokens", token_rows(runs)),
            ("Cost Metrics", "Cost", cost_rows(runs)),
            ("Task Distribution", "Distribution", distribution_rows(runs)),
            ("Quality Metrics", "Quality", quality_rows(runs)),
            ("Throughput", "Throughput", throughput_rows(runs)),
        ] {
            sections.push(format!("## {}\n", heading));
            sections.push(table(title, &headers, &rows));
        }

        sections.push("## Per-Agent Breakdown\n".to_string());
        for run in runs {
            sections.push(worker_section(run));
        }

        if let Some(comparison) = report.comparison {
            sections.push("## Delta Analysis (B vs A)\n".to_string());
            sections.push(delta_section(comparison));
            sections.push(
                "_(+) = improvement, (-) = regression relative to target direction_\n".to_string(),
            );
        }

        sections.push("\n---\n_Generated by `runlens`_\n".to_string());
        Ok(sections.join("\n"))
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

/// A titled table: metric names left-aligned, values right-aligned.
fn table(title: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = vec![format!("### {}", title), String::new()];

    lines.push(format!("| {} |", headers.join(" | ")));
    let aligns: Vec<&str> = std::iter::once(":---")
        .chain(std::iter::repeat("---:").take(headers.len().saturating_sub(1)))
        .collect();
    lines.push(format!("| {} |", aligns.join(" | ")));

    for row in rows {
        lines.push(format!("| {} |", row.join(" | ")));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// One row: the metric name then its value in each run.
fn row(
    name: &str,
    runs: &[MetricsSnapshot],
    value: impl Fn(&MetricsSnapshot) -> String,
) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(runs.iter().map(value))
        .collect()
}

fn summary_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Database", runs, |r| r.source.clone()),
        row("Agents", runs, |r| r.worker_count.to_string()),
        row("Total Tasks", runs, |r| fmt_count(r.tasks.total_tasks)),
        row("Completed", runs, |r| fmt_count(r.tasks.completed)),
        row("Failed", runs, |r| fmt_count(r.tasks.failed)),
        row("Total Cost", runs, |r| fmt_usd(r.cost.total_cost_usd)),
        row("Total Duration", runs, |r| fmt_ms(r.time.total_duration_ms as f64)),
    ]
}

fn time_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Total Duration", runs, |r| fmt_ms(r.time.total_duration_ms as f64)),
        row("Avg Task Time", runs, |r| fmt_ms(r.time.avg_task_time_ms)),
        row("Median Task Time", runs, |r| fmt_ms(r.time.median_task_time_ms)),
        row("Min Task Time", runs, |r| fmt_ms(r.time.min_task_time_ms as f64)),
        row("Max Task Time", runs, |r| fmt_ms(r.time.max_task_time_ms as f64)),
        row("Total Working Time", runs, |r| fmt_ms(r.time.total_working_ms as f64)),
        row("Total Blocked Time", runs, |r| fmt_ms(r.time.total_blocked_ms as f64)),
        row("Blocking Ratio", runs, |r| fmt_pct(r.time.blocking_ratio_pct)),
        row("Avg Queue Wait", runs, |r| fmt_ms(r.time.avg_queue_wait_ms)),
    ]
}

fn token_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Input Tokens", runs, |r| fmt_count(r.tokens.tokens_in)),
        row("Output Tokens", runs, |r| fmt_count(r.tokens.tokens_out)),
        row("Cached Tokens", runs, |r| fmt_count(r.tokens.tokens_cached)),
        row("Thinking Tokens", runs, |r| fmt_count(r.tokens.tokens_thinking)),
        row("Image Tokens", runs, |r| fmt_count(r.tokens.tokens_image)),
        row("Audio Tokens", runs, |r| fmt_count(r.tokens.tokens_audio)),
        row("Total Billable", runs, |r| fmt_count(r.tokens.total_billable)),
        row("Cache Hit Rate", runs, |r| fmt_pct(r.tokens.cache_hit_rate_pct)),
        row("Output Ratio", runs, |r| fmt_ratio(r.tokens.output_ratio)),
        row("Thinking Overhead", runs, |r| fmt_ratio(r.tokens.thinking_overhead)),
    ]
}

fn cost_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Total Cost", runs, |r| fmt_usd(r.cost.total_cost_usd)),
        row("Avg Cost / Task", runs, |r| fmt_usd(r.cost.avg_cost_per_task)),
        row("Cost / Completed Task", runs, |r| fmt_usd(r.cost.cost_per_completed_task)),
        row("Cost / Point", runs, |r| fmt_usd(r.cost.cost_per_point)),
    ]
}

fn distribution_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Total Tasks", runs, |r| fmt_count(r.tasks.total_tasks)),
        row("Completed", runs, |r| fmt_count(r.tasks.completed)),
        row("Failed", runs, |r| fmt_count(r.tasks.failed)),
        row("Cancelled", runs, |r| fmt_count(r.tasks.cancelled)),
        row("Pending", runs, |r| fmt_count(r.tasks.pending)),
        row("Working", runs, |r| fmt_count(r.tasks.working)),
        row("Completion Rate", runs, |r| fmt_pct(r.tasks.completion_rate_pct)),
        row("Failure Rate", runs, |r| fmt_pct(r.tasks.failure_rate_pct)),
        row("Total Points", runs, |r| fmt_count(r.tasks.total_points)),
        row("Completed Points", runs, |r| fmt_count(r.tasks.completed_points)),
    ]
}

fn quality_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Reworked Tasks", runs, |r| fmt_count(r.quality.rework_count)),
        row("Rework Rate", runs, |r| fmt_pct(r.quality.rework_rate_pct)),
        row("Avg Rework Cycles", runs, |r| format!("{:.1}", r.quality.avg_rework_cycles)),
        row("First-Pass Success", runs, |r| fmt_pct(r.quality.first_pass_success_pct)),
    ]
}

fn throughput_rows(runs: &[MetricsSnapshot]) -> Vec<Vec<String>> {
    vec![
        row("Tasks / Hour", runs, |r| fmt_rate(r.throughput.tasks_per_hour)),
        row("Points / Hour", runs, |r| fmt_rate(r.throughput.points_per_hour)),
        row("Tasks / Agent-Hour", runs, |r| fmt_rate(r.throughput.avg_tasks_per_agent_hour)),
    ]
}

fn worker_section(run: &MetricsSnapshot) -> String {
    if run.workers.is_empty() {
        return format!("### {}\n\nNo agent data.\n", run.label);
    }

    let headers: Vec<String> = [
        "Agent",
        "Completed",
        "Failed",
        "Cost (USD)",
        "Time",
        "Tokens In",
        "Tokens Out",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    let rows: Vec<Vec<String>> = run
        .workers
        .iter()
        .map(|w| {
            vec![
                w.worker_id.to_string(),
                w.tasks_completed.to_string(),
                w.tasks_failed.to_string(),
                fmt_usd(w.total_cost_usd),
                fmt_ms(w.total_time_ms as f64),
                fmt_count(w.tokens_in),
                fmt_count(w.tokens_out),
            ]
        })
        .collect();

    table(&format!("Agents - {}", run.label), &headers, &rows)
}

fn delta_section(comparison: &Comparison) -> String {
    let headers = vec![
        "Metric".to_string(),
        format!(
            "Delta ({} vs {})",
            comparison.candidate_label, comparison.baseline_label
        ),
    ];

    let rows: Vec<Vec<String>> = comparison
        .deltas
        .iter()
        .map(|d| vec![d.metric.name().to_string(), fmt_delta(d)])
        .collect();

    table("Deltas", &headers, &rows)
}

/// Signed magnitude in the metric's unit, relative change and marker.
fn fmt_delta(delta: &Delta) -> String {
    let sign = if delta.diff < 0.0 {
        "-"
    } else if delta.diff > 0.0 {
        "+"
    } else {
        ""
    };

    let magnitude = delta.diff.abs();
    let value = match delta.metric.unit() {
        MetricUnit::Duration => fmt_ms(magnitude),
        MetricUnit::Currency => fmt_usd(magnitude),
        MetricUnit::Count => fmt_number(magnitude),
        MetricUnit::Percent => fmt_pct(magnitude),
        MetricUnit::Rate => fmt_rate(magnitude),
    };

    let marker = match delta.marker {
        Some(Marker::Improvement) => " (+)",
        Some(Marker::Regression) => " (-)",
        None => "",
    };

    format!("{}{} ({:+.1}%){}", sign, value, delta.pct, marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlens_compare::compare_runs;
    use runlens_core::{WorkerId, WorkerStats};

    fn run(label: &str, cost: f64) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot {
            label: label.to_string(),
            source: format!("{}.db", label),
            ..Default::default()
        };
        snapshot.cost.total_cost_usd = cost;
        snapshot.time.total_duration_ms = 3_600_000;
        snapshot.tasks.total_tasks = 1_200;
        snapshot
    }

    #[test]
    fn test_report_for_pair() {
        let mut a = run("A", 10.0);
        a.worker_count = 1;
        a.workers.push(WorkerStats {
            worker_id: WorkerId::new("worker-1"),
            tasks_completed: 3,
            tasks_failed: 1,
            total_cost_usd: 10.0,
            total_time_ms: 90_000,
            tokens_in: 12_000,
            tokens_out: 800,
        });
        let runs = vec![a, run("B", 8.0)];
        let comparison = compare_runs(&runs);

        let text = MarkdownRenderer
            .render(&Report {
                runs: &runs,
                comparison: comparison.as_ref(),
            })
            .unwrap();

        assert!(text.starts_with("# Experiment Comparison Report\n"));
        assert!(text.contains("### Overview\n\n| Metric | A | B |\n| :--- | ---: | ---: |\n"));
        assert!(text.contains("| Database | A.db | B.db |"));
        assert!(text.contains("| Total Tasks | 1,200 | 1,200 |"));
        assert!(text.contains("| Total Duration | 1h 0m | 1h 0m |"));
        assert!(text.contains("| worker-1 | 3 | 1 | $10.0000 | 1m 30s | 12,000 | 800 |"));
        assert!(text.contains("### B\n\nNo agent data.\n"));
        assert!(text.contains("| Metric | Delta (B vs A) |"));
        assert!(text.contains("| Total Cost | -$2.0000 (-20.0%) (+) |"));
        assert!(text.contains("| Tasks Completed | 0 (+0.0%) |"));
        assert!(text.contains(
            "_(+) = improvement, (-) = regression relative to target direction_"
        ));
    }

    #[test]
    fn test_report_without_comparison() {
        let runs = vec![run("only", 1.0)];
        let text = MarkdownRenderer
            .render(&Report {
                runs: &runs,
                comparison: None,
            })
            .unwrap();

        assert!(text.contains("## Throughput"));
        assert!(!text.contains("Delta Analysis"));
    }

    #[test]
    fn test_fmt_delta_units() {
        let a = run("A", 1.0);
        let mut b = run("B", 1.0);
        b.time.total_duration_ms = 1_800_000;
        b.tokens.total_billable = 2_500;
        b.throughput.tasks_per_hour = 1.5;

        let comparison = runlens_compare::compare(&a, &b);
        let rendered: Vec<String> = comparison.deltas.iter().map(fmt_delta).collect();

        assert_eq!(rendered[0], "-30m 0s (-50.0%) (+)");
        assert_eq!(rendered[4], "+1.50 (+0.0%) (+)");
        assert_eq!(rendered[6], "+2,500 (+0.0%) (-)");
    }
}
