use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::period::Period;

/// One point of the per-day completion series.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub progress: u8,
}

/// Scalar aggregates over one window. Rates and percentages are integers
/// in [0, 100]; counts are non-negative.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregates {
    pub tasks_created: u64,
    pub tasks_completed: u64,
    pub completion_rate: u8,
    pub on_time_rate: u8,
    pub overdue_count: u64,
    pub avg_overdue_days: u32,
    pub avg_cycle_days: i64,
    /// Snapshot count of in-progress tasks, not a window average.
    pub wip_avg: u64,
    pub estimate_accuracy: u8,
}

/// Distributions and time series. The maps are ordered so serialized
/// output (and anything derived from it) is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trends {
    pub throughput_by_priority: BTreeMap<String, u64>,
    pub focus_by_tag: BTreeMap<String, u64>,
    pub progress_trend: Vec<TrendPoint>,
    /// Hours tied up in blocked tasks (8 per task).
    pub blocked_time: u64,
    /// Mean days blocked tasks have sat since their last update.
    pub dependency_lag: u32,
}

/// Inclusive date window.
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Normalized performance metrics for one user and window. Derived fresh
/// on every analysis request, never persisted as a primary entity.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub period: Period,
    pub date_range: DateRange,
    pub aggregates: Aggregates,
    pub trends: Trends,
    pub highlights: Vec<String>,
}
