pub mod http;
pub mod memory;
pub mod types;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use types::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Row gateway to the record store. Fetches and mutates raw rows in the
/// `projects`, `tasks`, and `analytics_runs` tables; performs no
/// interpretation of the data. Implemented over HTTP by [`HttpStore`] and
/// in memory by [`MemoryStore`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Projects owned by `user_id` and created within `[from, to]`.
    async fn projects_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Project>>;

    /// Tasks owned by `user_id` and created within `[from, to]`.
    async fn tasks_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>>;

    /// Every project owned by `user_id`.
    async fn projects(&self, user_id: &str) -> Result<Vec<Project>>;

    /// Every task owned by `user_id`, regardless of window.
    async fn tasks(&self, user_id: &str) -> Result<Vec<Task>>;

    /// Set a task's progress percentage, returning the updated row.
    async fn update_task_progress(&self, task_id: &str, percent: u8) -> Result<Task>;

    /// Insert a run row, returning it with store-generated id and timestamp.
    async fn insert_run(&self, run: NewAnalyticsRun) -> Result<AnalyticsRun>;

    /// Apply a partial update to a run row, returning the updated row.
    async fn update_run(&self, run_id: &str, update: RunUpdate) -> Result<AnalyticsRun>;

    /// The most recent runs for a user, newest first, capped at `limit`.
    async fn recent_runs(&self, user_id: &str, limit: u32) -> Result<Vec<AnalyticsRun>>;
}
