use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Validated startup configuration. Built once (usually via [`Config::from_env`])
/// and passed into the collaborators that need it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the record store service (the REST root, not a table URL).
    pub store_url: Url,
    /// API key for the record store, sent as both `apikey` and bearer token.
    pub store_key: String,
    /// API key for the text-generation service.
    pub gemini_api_key: String,
    /// Model identifier recorded on each analytics run.
    pub gemini_model: String,
    /// Base URL of the text-generation service.
    pub gemini_endpoint: Url,
}

impl Config {
    pub fn new(store_url: &str, store_key: &str, gemini_api_key: &str) -> Result<Self> {
        if store_key.is_empty() {
            return Err(Error::Config("store key must not be empty".into()));
        }
        Ok(Self {
            store_url: parse_url("store URL", store_url)?,
            store_key: store_key.to_string(),
            gemini_api_key: gemini_api_key.to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_endpoint: parse_url("Gemini endpoint", DEFAULT_GEMINI_ENDPOINT)?,
        })
    }

    /// Read configuration from the environment.
    ///
    /// Required: `ARETE_STORE_URL`, `ARETE_STORE_KEY`, `ARETE_GEMINI_API_KEY`.
    /// Optional: `ARETE_GEMINI_MODEL`, `ARETE_GEMINI_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let store_url = require_env("ARETE_STORE_URL")?;
        let store_key = require_env("ARETE_STORE_KEY")?;
        let gemini_api_key = require_env("ARETE_GEMINI_API_KEY")?;

        let mut config = Self::new(&store_url, &store_key, &gemini_api_key)?;
        if let Ok(model) = std::env::var("ARETE_GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Ok(endpoint) = std::env::var("ARETE_GEMINI_ENDPOINT") {
            config.gemini_endpoint = parse_url("Gemini endpoint", &endpoint)?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.gemini_model = model.to_string();
        self
    }
}

fn require_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Config(format!("{key} is not set"))),
    }
}

fn parse_url(what: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config(format!("invalid {what} '{raw}': {e}")))
}
