//! Translation passthrough to an optionally configured external endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::TranslateConfig;

pub const DEFAULT_TARGET: &str = "en";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslationOutcome {
    /// No endpoint configured: the text comes back untouched.
    NotConfigured {
        translated: String,
        provider: &'static str,
        note: &'static str,
    },
    /// Whatever JSON the endpoint answered with.
    Provider(Value),
}

pub struct TranslateClient {
    endpoint: Option<String>,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TranslateClient {
    pub fn new(cfg: &TranslateConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "translate http client builder failed, using defaults");
                reqwest::Client::new()
            });
        Self {
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn translate(&self, text: &str, target: &str) -> Result<TranslationOutcome> {
        let Some(url) = &self.endpoint else {
            debug!("translation disabled (no TRANSLATE_ENDPOINT)");
            return Ok(TranslationOutcome::NotConfigured {
                translated: text.to_string(),
                provider: "none",
                note: "Translate endpoint not configured.",
            });
        };

        let body = json!({ "q": text, "target": target, "key": self.api_key });
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("translate post")?;
        // Non-JSON answers pass through as an empty object.
        let value = resp.json::<Value>().await.unwrap_or_else(|_| json!({}));
        Ok(TranslationOutcome::Provider(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_returns_original_text() {
        let c = TranslateClient::new(&TranslateConfig::default(), Duration::from_secs(1));
        assert!(!c.is_configured());
        let out = c.translate("hola", "en").await.unwrap();
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["translated"], json!("hola"));
        assert_eq!(v["provider"], json!("none"));
        assert_eq!(v["note"], json!("Translate endpoint not configured."));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let cfg = TranslateConfig {
            endpoint: Some("http://127.0.0.1:1/translate".into()),
            api_key: None,
        };
        let c = TranslateClient::new(&cfg, Duration::from_secs(2));
        assert!(c.translate("hola", "en").await.is_err());
    }
}
