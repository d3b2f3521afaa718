// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_GENAI_API_KEY: &str = "GENAI_API_KEY";
pub const ENV_GENAI_MODEL: &str = "GENAI_MODEL";
pub const ENV_GENAI_ENDPOINT: &str = "GENAI_ENDPOINT";

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_max_tokens() -> u32 {
    300
}

/// Generative-model commentary settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentaryConfig {
    /// "ENV" means: read from GENAI_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// OpenAI-compatible chat completions URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl CommentaryConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self {
            api_key: env::var(ENV_GENAI_API_KEY).ok(),
            ..Self::default()
        };
        if let Ok(m) = env::var(ENV_GENAI_MODEL) {
            cfg.model = m;
        }
        if let Ok(e) = env::var(ENV_GENAI_ENDPOINT) {
            cfg.endpoint = e;
        }
        cfg.sanitize();
        cfg
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Resolve the "ENV" sentinel and drop blank values.
    pub(crate) fn sanitize(&mut self) {
        self.api_key = super::resolve_secret(self.api_key.take(), ENV_GENAI_API_KEY);
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        if self.endpoint.trim().is_empty() {
            self.endpoint = default_endpoint();
        }
        if self.max_tokens == 0 {
            self.max_tokens = default_max_tokens();
        }
    }
}
