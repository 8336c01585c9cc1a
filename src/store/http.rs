//! HTTP implementation of [`RecordStore`] speaking the remote store's REST
//! row protocol: one endpoint per table, `eq.`/`gte.`/`lte.` query filters,
//! `apikey` + bearer auth, and `Prefer: return=representation` on writes.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::types::{AnalyticsRun, NewAnalyticsRun, Project, RunUpdate, Task};
use crate::store::RecordStore;

pub struct HttpStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_key.clone(),
        }
    }

    /// Build `{base}/rest/v1/{table}`, tolerating a trailing slash on the
    /// configured base URL.
    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("store URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        Ok(url)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table)?;
        log::debug!("GET {url} {query:?}");
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;
        Self::check(table, resp).await?.json().await.map_err(Into::into)
    }

    async fn insert_row<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.table_url(table)?;
        log::debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = Self::check(table, resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Store(format!("insert into {table} returned no row")))
    }

    async fn patch_row<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.table_url(table)?;
        log::debug!("PATCH {url} id={id}");
        let resp = self
            .client
            .patch(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = Self::check(table, resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("{table} row {id}")))
    }

    async fn check(table: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(Error::Store(format!("{table}: {status}: {text}")))
    }
}

fn iso_millis(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn projects_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Project>> {
        self.get_rows(
            "projects",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("created_at", format!("gte.{}", iso_millis(from))),
                ("created_at", format!("lte.{}", iso_millis(to))),
            ],
        )
        .await
    }

    async fn tasks_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        self.get_rows(
            "tasks",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("created_at", format!("gte.{}", iso_millis(from))),
                ("created_at", format!("lte.{}", iso_millis(to))),
            ],
        )
        .await
    }

    async fn projects(&self, user_id: &str) -> Result<Vec<Project>> {
        self.get_rows(
            "projects",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.get_rows("tasks", &[("user_id", format!("eq.{user_id}"))])
            .await
    }

    async fn update_task_progress(&self, task_id: &str, percent: u8) -> Result<Task> {
        self.patch_row(
            "tasks",
            task_id,
            &serde_json::json!({ "progress_percent": percent }),
        )
        .await
    }

    async fn insert_run(&self, run: NewAnalyticsRun) -> Result<AnalyticsRun> {
        self.insert_row("analytics_runs", &run).await
    }

    async fn update_run(&self, run_id: &str, update: RunUpdate) -> Result<AnalyticsRun> {
        self.patch_row("analytics_runs", run_id, &update).await
    }

    async fn recent_runs(&self, user_id: &str, limit: u32) -> Result<Vec<AnalyticsRun>> {
        self.get_rows(
            "analytics_runs",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}
