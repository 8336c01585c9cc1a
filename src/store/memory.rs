//! In-memory implementation of [`RecordStore`], used by tests and by the
//! run pipeline when exercised without a remote store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::types::{AnalyticsRun, NewAnalyticsRun, Project, RunUpdate, Task};
use crate::store::RecordStore;

#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<Vec<Project>>,
    tasks: Mutex<Vec<Task>>,
    runs: Mutex<Vec<AnalyticsRun>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_project(&self, project: Project) {
        self.projects.lock().await.push(project);
    }

    pub async fn add_task(&self, task: Task) {
        self.tasks.lock().await.push(task);
    }

    pub async fn add_run(&self, run: AnalyticsRun) {
        self.runs.lock().await.push(run);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn projects_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Project>> {
        Ok(self
            .projects
            .lock()
            .await
            .iter()
            .filter(|p| p.user_id == user_id && p.created_at >= from && p.created_at <= to)
            .cloned()
            .collect())
    }

    async fn tasks_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .await
            .iter()
            .filter(|t| t.user_id == user_id && t.created_at >= from && t.created_at <= to)
            .cloned()
            .collect())
    }

    async fn projects(&self, user_id: &str) -> Result<Vec<Project>> {
        let mut rows: Vec<Project> = self
            .projects
            .lock()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_task_progress(&self, task_id: &str, percent: u8) -> Result<Task> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::NotFound(format!("tasks row {task_id}")))?;
        task.progress_percent = percent;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn insert_run(&self, run: NewAnalyticsRun) -> Result<AnalyticsRun> {
        let row = AnalyticsRun {
            id: Uuid::new_v4().to_string(),
            user_id: run.user_id,
            period: run.period,
            start_date: run.start_date,
            end_date: run.end_date,
            status: run.status,
            model: run.model,
            summary: None,
            score: None,
            excel_url: None,
            pdf_url: None,
            created_at: Utc::now(),
        };
        self.runs.lock().await.push(row.clone());
        Ok(row)
    }

    async fn update_run(&self, run_id: &str, update: RunUpdate) -> Result<AnalyticsRun> {
        let mut runs = self.runs.lock().await;
        let run = runs
            .iter_mut()
            .find(|r| r.id == run_id)
            .ok_or_else(|| Error::NotFound(format!("analytics_runs row {run_id}")))?;
        if let Some(status) = update.status {
            run.status = status;
        }
        if let Some(summary) = update.summary {
            run.summary = Some(summary);
        }
        if let Some(score) = update.score {
            run.score = Some(score);
        }
        if let Some(excel_url) = update.excel_url {
            run.excel_url = Some(excel_url);
        }
        if let Some(pdf_url) = update.pdf_url {
            run.pdf_url = Some(pdf_url);
        }
        Ok(run.clone())
    }

    async fn recent_runs(&self, user_id: &str, limit: u32) -> Result<Vec<AnalyticsRun>> {
        let mut rows: Vec<AnalyticsRun> = self
            .runs
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Period;
    use crate::store::types::{Priority, RunStatus, TaskStatus};
    use chrono::{Duration, TimeZone};

    fn task_at(id: &str, created_at: DateTime<Utc>) -> Task {
        Task {
            id: id.into(),
            user_id: "u1".into(),
            project_id: "p1".into(),
            title: format!("Task {id}"),
            checklist: serde_json::Value::Null,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            estimate_hours: None,
            actual_hours: None,
            start_date: None,
            due_date: None,
            progress_percent: 0,
            blocking_tasks: vec![],
            assignees: vec![],
            created_at,
            updated_at: created_at,
        }
    }

    fn new_run() -> NewAnalyticsRun {
        NewAnalyticsRun {
            user_id: "u1".into(),
            period: Period::Weekly,
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            status: RunStatus::Running,
            model: "gemini-1.5-pro".into(),
        }
    }

    #[tokio::test]
    async fn test_tasks_in_range_inclusive_bounds() {
        let store = MemoryStore::new();
        let from = Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 3, 15, 23, 59, 59).unwrap();

        store.add_task(task_at("on-start", from)).await;
        store.add_task(task_at("on-end", to)).await;
        store.add_task(task_at("before", from - Duration::seconds(1))).await;
        store.add_task(task_at("after", to + Duration::seconds(1))).await;

        let rows = store.tasks_in_range("u1", from, to).await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["on-start", "on-end"]);
    }

    #[tokio::test]
    async fn test_tasks_filtered_by_user() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.add_task(task_at("mine", now)).await;
        let mut other = task_at("other", now);
        other.user_id = "u2".into();
        store.add_task(other).await;

        let rows = store.tasks("u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "mine");
    }

    #[tokio::test]
    async fn test_run_insert_and_update() {
        let store = MemoryStore::new();
        let run = store.insert_run(new_run()).await.unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.summary.is_none());
        assert!(!run.id.is_empty());

        let updated = store.update_run(&run.id, RunUpdate::failed()).await.unwrap();
        assert_eq!(updated.status, RunStatus::Failed);
        assert!(updated.summary.is_none());
        // Untouched fields survive.
        assert_eq!(updated.model, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_run("nope", RunUpdate::failed())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = store.update_task_progress("nope", 50).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_runs_newest_first_capped() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        for i in 0..5 {
            let mut row = store.insert_run(new_run()).await.unwrap();
            row.created_at = base + Duration::days(i);
            // Rewrite with a deterministic timestamp.
            store.runs.lock().await.retain(|r| r.id != row.id);
            store.add_run(row).await;
        }

        let rows = store.recent_runs("u1", 3).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].created_at > rows[1].created_at);
        assert!(rows[1].created_at > rows[2].created_at);
        assert_eq!(rows[0].created_at, base + Duration::days(4));
    }

    #[tokio::test]
    async fn test_update_task_progress() {
        let store = MemoryStore::new();
        store.add_task(task_at("t1", Utc::now())).await;
        let updated = store.update_task_progress("t1", 60).await.unwrap();
        assert_eq!(updated.progress_percent, 60);

        let rows = store.tasks("u1").await.unwrap();
        assert_eq!(rows[0].progress_percent, 60);
    }
}
