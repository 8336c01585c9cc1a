use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::AnalysisResult;
use crate::date_util::day_start;
use crate::period::Period;

/// Treat an explicit JSON `null` the same as a missing field. The store
/// returns `null` for array columns that were never populated.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

/// A project row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    pub priority: Priority,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub progress_percent: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task row. Belongs to exactly one project; `blocking_tasks` may hold
/// dangling ids (tolerated, not validated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub checklist: serde_json::Value,
    pub status: TaskStatus,
    pub priority: Priority,
    pub estimate_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub progress_percent: u8,
    #[serde(default, deserialize_with = "null_default")]
    pub blocking_tasks: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue when its due date (midnight UTC) has passed and
    /// the task isn't done. Tasks due today count once the day has started.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => day_start(due) < now && self.status != TaskStatus::Done,
            None => false,
        }
    }
}

/// One recorded invocation of the metrics → analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRun {
    pub id: String,
    pub user_id: String,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RunStatus,
    pub model: String,
    pub summary: Option<AnalysisResult>,
    pub score: Option<u8>,
    pub excel_url: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new run. The store generates `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAnalyticsRun {
    pub user_id: String,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RunStatus,
    pub model: String,
}

/// Partial update for a run row. Unset fields are left untouched; the
/// struct doubles as the PATCH body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl RunUpdate {
    /// Terminal update for a successful run: completed, with summary and score.
    pub fn completed(analysis: &AnalysisResult) -> Self {
        RunUpdate {
            status: Some(RunStatus::Completed),
            summary: Some(analysis.clone()),
            score: Some(analysis.score),
            ..Default::default()
        }
    }

    /// Terminal update for a failed run: no summary, no score.
    pub fn failed() -> Self {
        RunUpdate {
            status: Some(RunStatus::Failed),
            ..Default::default()
        }
    }

    /// Record where the exported report files were written.
    pub fn exports(excel_url: &str, pdf_url: &str) -> Self {
        RunUpdate {
            excel_url: Some(excel_url.to_string()),
            pdf_url: Some(pdf_url.to_string()),
            ..Default::default()
        }
    }
}
