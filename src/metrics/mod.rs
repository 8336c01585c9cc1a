pub mod types;

pub use types::*;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::date_util::{day_end, day_start, days_between};
use crate::period::Period;
use crate::store::{Project, Task, TaskStatus};

/// Round `part / whole` to a whole percentage; 0 when `whole` is 0.
fn percent_of(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u8
}

/// Mean progress percentage across items, rounded; 0 when empty.
pub fn mean_progress(percentages: &[u8]) -> u8 {
    if percentages.is_empty() {
        return 0;
    }
    let total: u32 = percentages.iter().map(|&p| u32::from(p)).sum();
    (total as f64 / percentages.len() as f64).round() as u8
}

/// Aggregate raw records into [`PerformanceMetrics`].
///
/// `projects` and `tasks` are the records created inside the window;
/// `all_tasks` is every task for the user regardless of window (overdue,
/// WIP, and blocked counts are snapshots of the whole task set). `now` is
/// the reference instant; given identical inputs, the output is identical.
pub fn compute(
    period: Period,
    range: (NaiveDate, NaiveDate),
    projects: &[Project],
    tasks: &[Task],
    all_tasks: &[Task],
    now: DateTime<Utc>,
) -> PerformanceMetrics {
    let (start, end) = range;
    let completed: Vec<&Task> = tasks.iter().filter(|t| t.status == TaskStatus::Done).collect();

    let tasks_created = tasks.len() as u64;
    let tasks_completed = completed.len() as u64;
    let completion_rate = percent_of(tasks_completed, tasks_created);

    // On-time delivery: of completed tasks with a due date, how many were
    // last updated on or before midnight UTC of that date. Vacuously 100.
    let with_due: Vec<&&Task> = completed.iter().filter(|t| t.due_date.is_some()).collect();
    let on_time = with_due
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| t.updated_at <= day_start(due)))
        .count() as u64;
    let on_time_rate = if with_due.is_empty() {
        100
    } else {
        percent_of(on_time, with_due.len() as u64)
    };

    // Overdue is judged across the whole task set. Every overdue task has
    // a due date, so the days list doubles as the count.
    let overdue_days: Vec<f64> = all_tasks
        .iter()
        .filter(|t| t.is_overdue(now))
        .filter_map(|t| t.due_date)
        .map(|due| days_between(day_start(due), now).max(0.0))
        .collect();
    let overdue_count = overdue_days.len() as u64;
    let avg_overdue_days = if overdue_days.is_empty() {
        0
    } else {
        (overdue_days.iter().sum::<f64>() / overdue_days.len() as f64).round() as u32
    };

    // Cycle time: start date to last update; tasks without a start date
    // contribute the 7-day default, as does an empty window.
    let avg_cycle_days = if completed.is_empty() {
        7
    } else {
        let total: f64 = completed
            .iter()
            .map(|t| match t.start_date {
                Some(started) => days_between(day_start(started), t.updated_at),
                None => 7.0,
            })
            .sum();
        (total / completed.len() as f64).round() as i64
    };

    let wip_avg = all_tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .count() as u64;

    // Estimate accuracy over completed tasks with nonzero estimate and
    // actual hours; 85 when none qualify.
    let accuracies: Vec<f64> = completed
        .iter()
        .filter_map(|t| match (t.estimate_hours, t.actual_hours) {
            (Some(estimate), Some(actual)) if estimate > 0.0 && actual > 0.0 => {
                Some((1.0 - (actual - estimate).abs() / estimate.max(1.0)).max(0.0))
            }
            _ => None,
        })
        .collect();
    let estimate_accuracy = if accuracies.is_empty() {
        85
    } else {
        (accuracies.iter().sum::<f64>() / accuracies.len() as f64 * 100.0).round() as u8
    };

    let mut throughput_by_priority = std::collections::BTreeMap::new();
    for task in &completed {
        *throughput_by_priority
            .entry(task.priority.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mut focus_by_tag = std::collections::BTreeMap::new();
    for project in projects {
        for tag in &project.tags {
            *focus_by_tag.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    let blocked: Vec<&Task> = all_tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Blocked)
        .collect();
    let blocked_time = blocked.len() as u64 * 8;
    let dependency_lag = if blocked.is_empty() {
        0
    } else {
        let total: f64 = blocked
            .iter()
            .map(|t| days_between(t.updated_at, now).max(0.0))
            .sum();
        (total / blocked.len() as f64).round() as u32
    };

    let progress_trend = progress_trend(start, end, tasks, tasks_created, now);

    PerformanceMetrics {
        period,
        date_range: DateRange { start, end },
        aggregates: Aggregates {
            tasks_created,
            tasks_completed,
            completion_rate,
            on_time_rate,
            overdue_count,
            avg_overdue_days,
            avg_cycle_days,
            wip_avg,
            estimate_accuracy,
        },
        trends: Trends {
            throughput_by_priority,
            focus_by_tag,
            progress_trend,
            blocked_time,
            dependency_lag,
        },
        highlights: vec![
            format!("{tasks_completed} tasks completed"),
            format!("{on_time_rate}% on-time delivery"),
            format!("{estimate_accuracy}% estimate accuracy"),
        ],
    }
}

/// Cumulative completion percentage for each elapsed day of the window:
/// of the in-window tasks, the share already done by end of that day.
/// Days after `now` are omitted, so a window starting in the future
/// yields an empty series.
fn progress_trend(
    start: NaiveDate,
    end: NaiveDate,
    tasks: &[Task],
    tasks_created: u64,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let last = end.min(now.date_naive());
    let mut points = Vec::new();
    let mut date = start;
    while date <= last {
        let done = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done && t.updated_at <= day_end(date))
            .count() as u64;
        points.push(TrendPoint {
            date,
            progress: percent_of(done, tasks_created),
        });
        date += Duration::days(1);
    }
    points
}
