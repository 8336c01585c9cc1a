//! Run lifecycle: record a `running` row up front, gather metrics, analyze,
//! then finalize the row as `completed` or `failed`. The row is inserted
//! before any fetching so an aborted run still leaves a trace.

use chrono::{DateTime, NaiveDate, Utc};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::date_util::{day_end, day_start};
use crate::error::Result;
use crate::metrics::{self, PerformanceMetrics};
use crate::period::Period;
use crate::store::{
    AnalyticsRun, NewAnalyticsRun, Project, RecordStore, RunStatus, RunUpdate, Task,
};

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Everything a finished run produced, so callers can render reports
/// without refetching.
#[derive(Debug)]
pub struct RunOutcome {
    pub run: AnalyticsRun,
    pub metrics: PerformanceMetrics,
    pub analysis: AnalysisResult,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

/// Execute one full analytics run for `user_id` over the period window
/// containing `now`.
///
/// Inserting the run row is the only step that fails without a trace;
/// any later error first flips the row to `failed`, then propagates.
pub async fn run(
    store: &dyn RecordStore,
    analyzer: &dyn Analyzer,
    user_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> Result<RunOutcome> {
    let (start, end) = period.date_range(now.date_naive());
    let run = store
        .insert_run(NewAnalyticsRun {
            user_id: user_id.to_string(),
            period,
            start_date: start,
            end_date: end,
            status: RunStatus::Running,
            model: analyzer.model().to_string(),
        })
        .await?;
    log::info!("Run {} started: {period} {start} to {end}", run.id);

    match execute(store, analyzer, user_id, period, (start, end), now, &run.id).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            if let Err(finalize) = store.update_run(&run.id, RunUpdate::failed()).await {
                log::warn!("Could not mark run {} as failed: {finalize}", run.id);
            }
            Err(e)
        }
    }
}

async fn execute(
    store: &dyn RecordStore,
    analyzer: &dyn Analyzer,
    user_id: &str,
    period: Period,
    range: (NaiveDate, NaiveDate),
    now: DateTime<Utc>,
    run_id: &str,
) -> Result<RunOutcome> {
    let (start, end) = range;
    let from = day_start(start);
    let to = day_end(end);

    let projects = store.projects_in_range(user_id, from, to).await?;
    let tasks = store.tasks_in_range(user_id, from, to).await?;
    let all_tasks = store.tasks(user_id).await?;
    log::debug!(
        "Run {run_id}: {} projects, {} tasks in window, {} tasks total",
        projects.len(),
        tasks.len(),
        all_tasks.len()
    );

    let metrics = metrics::compute(period, range, &projects, &tasks, &all_tasks, now);
    let analysis = analyzer.analyze(&metrics).await?;

    let run = store
        .update_run(run_id, RunUpdate::completed(&analysis))
        .await?;
    log::info!("Run {} completed with score {}", run.id, analysis.score);

    Ok(RunOutcome {
        run,
        metrics,
        analysis,
        projects,
        tasks,
    })
}

/// The most recent runs for a user, newest first.
pub async fn history(
    store: &dyn RecordStore,
    user_id: &str,
    limit: Option<u32>,
) -> Result<Vec<AnalyticsRun>> {
    store
        .recent_runs(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await
}
