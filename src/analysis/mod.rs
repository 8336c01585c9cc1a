pub mod fallback;
pub mod gemini;
pub mod prompt;
pub mod retry;

pub use fallback::fallback_analysis;
pub use gemini::GeminiAnalyzer;
pub use retry::retry_with_backoff;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::date_util::strip_code_fences;
use crate::error::{Error, Result};
use crate::metrics::PerformanceMetrics;

static RE_JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// A prioritized recommendation tied to a target metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub title: String,
    pub impact: String,
    pub effort: String,
    pub metric: String,
}

/// Chart descriptor: a type tag plus opaque data for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

/// Structured narrative analysis of one metrics window. Produced once per
/// run and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub narrative: String,
    pub bullets: Vec<String>,
    pub score: u8,
    pub actions: Vec<RecommendedAction>,
    pub charts: ChartSpec,
}

/// Turns metrics into a narrative analysis. Implementations are expected
/// to absorb remote failures (the Gemini implementation falls back to a
/// local computation), so an `Err` from `analyze` is exceptional.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, metrics: &PerformanceMetrics) -> Result<AnalysisResult>;

    /// Model identifier recorded on run rows.
    fn model(&self) -> &str;
}

/// Extract and parse the first brace-delimited JSON object from free text.
///
/// The remote model is asked for bare JSON but tends to wrap it in prose
/// or code fences; this takes the outermost `{...}` span, greedily.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult> {
    let text = strip_code_fences(text.trim());
    let json = RE_JSON_OBJECT
        .find(text)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Analysis(format!("no JSON object in response: {text}")))?;
    let mut result: AnalysisResult = serde_json::from_str(json)
        .map_err(|e| Error::Analysis(format!("Failed to parse analysis response: {e}")))?;
    result.score = result.score.min(100);
    Ok(result)
}
