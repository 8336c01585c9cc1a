//! Deterministic local analysis, used whenever the remote analyzer is
//! unreachable or returns something unparseable. Given identical metrics
//! it produces identical output, so offline runs still complete.

use crate::analysis::{AnalysisResult, ChartSpec, RecommendedAction};
use crate::metrics::PerformanceMetrics;

/// Compute an [`AnalysisResult`] directly from the metrics scalars.
///
/// The score weights completion rate at 0.4 and on-time rate and estimate
/// accuracy at 0.3 each, rounded to a whole number.
pub fn fallback_analysis(metrics: &PerformanceMetrics) -> AnalysisResult {
    let a = &metrics.aggregates;
    let score = (f64::from(a.completion_rate) * 0.4
        + f64::from(a.on_time_rate) * 0.3
        + f64::from(a.estimate_accuracy) * 0.3)
        .round() as u8;

    let precision = if a.estimate_accuracy > 80 {
        "good"
    } else {
        "needs improvement"
    };

    AnalysisResult {
        narrative: format!(
            "{} analysis shows {}% task completion with {}% on-time delivery. \
             Estimate accuracy at {}% indicates {} planning precision.",
            metrics.period, a.completion_rate, a.on_time_rate, a.estimate_accuracy, precision
        ),
        bullets: vec![
            format!("Completed {} of {} tasks", a.tasks_completed, a.tasks_created),
            format!(
                "{} tasks overdue with {} avg delay days",
                a.overdue_count, a.avg_overdue_days
            ),
            format!("Average cycle time: {} days", a.avg_cycle_days),
            format!("Work in progress: {} tasks average", a.wip_avg),
        ],
        score,
        actions: vec![
            RecommendedAction {
                title: "Improve task estimation accuracy".into(),
                impact: "High".into(),
                effort: "Medium".into(),
                metric: format!(
                    "Target 90% estimate accuracy (current: {}%)",
                    a.estimate_accuracy
                ),
            },
            RecommendedAction {
                title: "Reduce overdue tasks".into(),
                impact: "Medium".into(),
                effort: "Low".into(),
                metric: format!("Reduce overdue count to <2 (current: {})", a.overdue_count),
            },
        ],
        charts: ChartSpec {
            kind: "completion_trend".into(),
            data: serde_json::to_value(&metrics.trends.progress_trend).unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Aggregates, DateRange, TrendPoint, Trends};
    use crate::period::Period;
    use chrono::NaiveDate;

    fn metrics_with(aggregates: Aggregates) -> PerformanceMetrics {
        PerformanceMetrics {
            period: Period::Weekly,
            date_range: DateRange {
                start: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            },
            aggregates,
            trends: Trends {
                progress_trend: vec![TrendPoint {
                    date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
                    progress: 40,
                }],
                ..Default::default()
            },
            highlights: vec![],
        }
    }

    #[test]
    fn test_score_weighting() {
        let m = metrics_with(Aggregates {
            completion_rate: 70,
            on_time_rate: 50,
            estimate_accuracy: 80,
            ..Default::default()
        });
        // 0.4*70 + 0.3*50 + 0.3*80 = 28 + 15 + 24 = 67
        assert_eq!(fallback_analysis(&m).score, 67);
    }

    #[test]
    fn test_narrative_precision_threshold() {
        let at_80 = metrics_with(Aggregates {
            estimate_accuracy: 80,
            ..Default::default()
        });
        assert!(fallback_analysis(&at_80)
            .narrative
            .contains("indicates needs improvement planning precision"));

        let above = metrics_with(Aggregates {
            estimate_accuracy: 81,
            ..Default::default()
        });
        assert!(fallback_analysis(&above)
            .narrative
            .contains("indicates good planning precision"));
    }

    #[test]
    fn test_narrative_and_bullets_shapes() {
        let m = metrics_with(Aggregates {
            tasks_created: 10,
            tasks_completed: 7,
            completion_rate: 70,
            on_time_rate: 86,
            overdue_count: 2,
            avg_overdue_days: 3,
            avg_cycle_days: 4,
            wip_avg: 5,
            estimate_accuracy: 85,
        });
        let result = fallback_analysis(&m);
        assert_eq!(
            result.narrative,
            "weekly analysis shows 70% task completion with 86% on-time delivery. \
             Estimate accuracy at 85% indicates good planning precision."
        );
        assert_eq!(
            result.bullets,
            vec![
                "Completed 7 of 10 tasks",
                "2 tasks overdue with 3 avg delay days",
                "Average cycle time: 4 days",
                "Work in progress: 5 tasks average",
            ]
        );
        assert_eq!(result.actions[0].title, "Improve task estimation accuracy");
        assert_eq!(
            result.actions[1].metric,
            "Reduce overdue count to <2 (current: 2)"
        );
    }

    #[test]
    fn test_chart_wraps_progress_trend() {
        let m = metrics_with(Aggregates::default());
        let result = fallback_analysis(&m);
        assert_eq!(result.charts.kind, "completion_trend");
        assert_eq!(
            result.charts.data,
            serde_json::json!([{ "date": "2025-03-09", "progress": 40 }])
        );
    }

    #[test]
    fn test_identical_metrics_identical_output() {
        let m = metrics_with(Aggregates {
            completion_rate: 55,
            on_time_rate: 60,
            estimate_accuracy: 70,
            overdue_count: 4,
            ..Default::default()
        });
        let first = serde_json::to_string(&fallback_analysis(&m)).unwrap();
        let second = serde_json::to_string(&fallback_analysis(&m)).unwrap();
        assert_eq!(first, second);
    }
}
