pub mod analysis;
pub mod config;
pub mod date_util;
pub mod error;
pub mod metrics;
pub mod period;
pub mod progress;
pub mod report;
pub mod runs;
pub mod store;

pub use analysis::{AnalysisResult, Analyzer, GeminiAnalyzer, RecommendedAction};
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::PerformanceMetrics;
pub use period::Period;
pub use progress::{ProgressState, ProgressTracker};
pub use runs::RunOutcome;
pub use store::{
    AnalyticsRun, HttpStore, MemoryStore, Priority, Project, ProjectStatus, RecordStore,
    RunStatus, Task, TaskStatus,
};

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::date_util::{day_end, day_start};
use crate::store::RunUpdate;

/// Main entry point: owns the record store and the analyzer, and drives
/// runs, listings, and report export against them.
pub struct Arete {
    store: Box<dyn RecordStore>,
    analyzer: Box<dyn Analyzer>,
}

impl Arete {
    pub fn new(store: Box<dyn RecordStore>, analyzer: Box<dyn Analyzer>) -> Self {
        Self { store, analyzer }
    }

    /// Wire up the HTTP store and the Gemini analyzer from one config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(HttpStore::new(config)),
            Box::new(GeminiAnalyzer::new(config)),
        )
    }

    /// Access the record store (for direct queries in the CLI).
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Execute one full analytics run over the period window containing
    /// `now` and record it.
    pub async fn analyze(
        &self,
        user_id: &str,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome> {
        runs::run(self.store.as_ref(), self.analyzer.as_ref(), user_id, period, now).await
    }

    /// Recent runs, newest first. `limit` defaults to 10.
    pub async fn history(&self, user_id: &str, limit: Option<u32>) -> Result<Vec<AnalyticsRun>> {
        runs::history(self.store.as_ref(), user_id, limit).await
    }

    /// Compute metrics for the period window containing `now` without
    /// recording a run or invoking the analyzer.
    pub async fn performance_metrics(
        &self,
        user_id: &str,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<PerformanceMetrics> {
        let range = period.date_range(now.date_naive());
        let (from, to) = (day_start(range.0), day_end(range.1));
        let projects = self.store.projects_in_range(user_id, from, to).await?;
        let tasks = self.store.tasks_in_range(user_id, from, to).await?;
        let all_tasks = self.store.tasks(user_id).await?;
        Ok(metrics::compute(
            period, range, &projects, &tasks, &all_tasks, now,
        ))
    }

    /// Run the full pipeline, write both report files into `out_dir`, and
    /// record their locations on the run row.
    pub async fn analyze_and_export(
        &self,
        user_id: &str,
        period: Period,
        out_dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome> {
        let mut outcome = self.analyze(user_id, period, now).await?;
        let (excel, pdf) = report::write_reports(out_dir, &outcome, now.date_naive())?;
        outcome.run = self
            .store
            .update_run(
                &outcome.run.id,
                RunUpdate::exports(&excel.display().to_string(), &pdf.display().to_string()),
            )
            .await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ChartSpec;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedAnalyzer;

    #[async_trait]
    impl Analyzer for FixedAnalyzer {
        async fn analyze(&self, _metrics: &PerformanceMetrics) -> Result<AnalysisResult> {
            Ok(AnalysisResult {
                narrative: "Fine.".into(),
                bullets: vec![],
                score: 55,
                actions: vec![],
                charts: ChartSpec {
                    kind: "completion_trend".into(),
                    data: serde_json::Value::Array(vec![]),
                },
            })
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_analyze_and_export_records_file_paths() {
        let arete = Arete::new(Box::new(MemoryStore::new()), Box::new(FixedAnalyzer));
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let outcome = arete
            .analyze_and_export("u1", Period::Weekly, dir.path(), now)
            .await
            .unwrap();

        assert_eq!(outcome.run.status, RunStatus::Completed);
        let excel_url = outcome.run.excel_url.unwrap();
        let pdf_url = outcome.run.pdf_url.unwrap();
        assert!(excel_url.ends_with("weekly-2025-03-09.xlsx"));
        assert!(pdf_url.ends_with("weekly-2025-03-09.pdf"));
        assert!(std::path::Path::new(&excel_url).exists());
        assert!(std::path::Path::new(&pdf_url).exists());
    }

    #[tokio::test]
    async fn test_performance_metrics_does_not_record_a_run() {
        let arete = Arete::new(Box::new(MemoryStore::new()), Box::new(FixedAnalyzer));
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap();

        let metrics = arete
            .performance_metrics("u1", Period::Monthly, now)
            .await
            .unwrap();
        assert_eq!(metrics.period, Period::Monthly);
        assert_eq!(metrics.aggregates.tasks_created, 0);

        assert!(arete.history("u1", None).await.unwrap().is_empty());
    }
}
