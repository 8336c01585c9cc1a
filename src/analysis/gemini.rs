//! Remote analyzer speaking the Gemini `generateContent` REST protocol.
//! Sampling is pinned to low temperature and diversity so repeated runs
//! over the same metrics stay close to deterministic.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::analysis::{
    fallback_analysis, parse_analysis, prompt, retry_with_backoff, AnalysisResult, Analyzer,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics::PerformanceMetrics;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            temperature: 0.1,
            top_k: 1,
            top_p: 0.8,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiAnalyzer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.gemini_endpoint.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    fn generate_url(&self) -> Result<Url> {
        let method = format!("{}:generateContent", self.model);
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend(["v1beta", "models", method.as_str()]);
        Ok(url)
    }

    /// One remote call: instruction part, metrics part, pinned sampling
    /// config. Returns the raw response text.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![
                Content {
                    role: "user",
                    parts: vec![Part {
                        text: system_prompt.to_string(),
                    }],
                },
                Content {
                    role: "user",
                    parts: vec![Part {
                        text: user_prompt.to_string(),
                    }],
                },
            ],
            generation_config: GenerationConfig::default(),
        };

        let url = self.generate_url()?;
        log::debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Analysis(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Analysis(format!("{status}: {text}")));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| Error::Analysis(format!("unreadable response: {e}")))?;
        let text: String = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(Error::Analysis("empty response".into()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    /// Analyze metrics remotely, retrying transient failures; if the call
    /// never succeeds or the response doesn't parse, compute the local
    /// fallback instead. Only the fallback path is reachable offline.
    async fn analyze(&self, metrics: &PerformanceMetrics) -> Result<AnalysisResult> {
        let user_prompt = prompt::user_prompt(metrics);
        let outcome = retry_with_backoff(
            || self.generate(prompt::SYSTEM_PROMPT, &user_prompt),
            MAX_ATTEMPTS,
            BASE_DELAY,
        )
        .await
        .and_then(|text| parse_analysis(&text));

        match outcome {
            Ok(result) => Ok(result),
            Err(e) => {
                log::warn!("Remote analysis failed, using local fallback: {e}");
                Ok(fallback_analysis(metrics))
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> GeminiAnalyzer {
        let config = Config::new("https://db.example.com", "anon", "gm-key").unwrap();
        GeminiAnalyzer::new(&config)
    }

    #[test]
    fn test_generate_url() {
        let url = analyzer().generate_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: "hello".into(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["temperature"], 0.1);
        assert_eq!(value["generationConfig"]["topK"], 1);
        assert_eq!(value["generationConfig"]["topP"], 0.8);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "part one " }, { "text": "part two" }] } }
            ]
        }"#;
        let body: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = body.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "part one part two");
    }
}
