//! Generative commentary adapter: provider abstraction for advisory model output.
//!
//! The commentary channel never drives the score. Every failure (missing key,
//! non-2xx, quota, timeout, empty or malformed output) collapses to "no commentary".

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use metrics::counter;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::CommentaryConfig;
use crate::error::{Availability, UnavailableReason};

pub const ENV_TEST_MODE: &str = "GENAI_TEST_MODE";

/// Fixed instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a credibility analyst. Assess how credible the submitted claim or image is. \
Reply with one line `Assessment: <likely real|unclear|likely false>` followed by up to three lines \
starting with `- ` giving concrete reasons. No other text.";

type CommentaryFuture<'a> = Pin<Box<dyn Future<Output = Availability<String>> + Send + 'a>>;

/// Trait object used by the engine (and tests).
pub trait CommentaryClient: Send + Sync {
    /// Commentary on a text prompt.
    fn comment_outcome<'a>(&'a self, prompt: &'a str) -> CommentaryFuture<'a>;
    /// Commentary on an image, with a text prompt alongside.
    fn comment_on_image_outcome<'a>(&'a self, prompt: &'a str, image: &'a [u8]) -> CommentaryFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;

    fn comment<'a>(&'a self, prompt: &'a str) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move { self.comment_outcome(prompt).await.ok() })
    }

    fn comment_on_image<'a>(
        &'a self,
        prompt: &'a str,
        image: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move { self.comment_on_image_outcome(prompt, image).await.ok() })
    }
}

/// Convenient alias used by callers.
pub type DynCommentaryClient = Arc<dyn CommentaryClient>;

/// Factory: build a client according to config and environment.
///
/// * If `GENAI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if no API key is configured, returns a disabled client.
/// * Else builds the OpenAI-compatible provider.
pub fn build_client_from_config(config: &CommentaryConfig, timeout: Duration) -> DynCommentaryClient {
    if std::env::var(ENV_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockProvider::new("Assessment: unclear (mock)"));
    }

    match config.api_key.as_deref() {
        Some(key) => Arc::new(OpenAiProvider::new(config, key, timeout)),
        None => Arc::new(DisabledClient),
    }
}

// ------------------------------------------------------------
// Concrete providers
// ------------------------------------------------------------

/// OpenAI-compatible Chat Completions provider.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &CommentaryConfig, api_key: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("truthlens/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "commentary http client builder failed, using defaults");
                reqwest::Client::new()
            });
        Self {
            http,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            max_tokens: config.max_tokens,
        }
    }

    async fn complete(&self, user_content: serde_json::Value) -> Availability<String> {
        let req = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": user_content },
            ],
            "temperature": 0.2,
            "max_tokens": self.max_tokens,
        });

        let resp = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Availability::Unavailable(UnavailableReason::Timeout),
            Err(e) => return Availability::Unavailable(UnavailableReason::Transport(e.to_string())),
        };

        if !resp.status().is_success() {
            return Availability::Unavailable(UnavailableReason::Status(resp.status().as_u16()));
        }
        let body: Resp = match resp.json().await {
            Ok(b) => b,
            Err(e) if e.is_timeout() => return Availability::Unavailable(UnavailableReason::Timeout),
            Err(e) => return Availability::Unavailable(UnavailableReason::Malformed(e.to_string())),
        };

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            Availability::Unavailable(UnavailableReason::Malformed("empty content".to_string()))
        } else {
            Availability::Available(content)
        }
    }

    fn report(&self, outcome: Availability<String>) -> Availability<String> {
        if let Some(reason) = outcome.reason() {
            warn!(provider = self.provider_name(), %reason, "commentary unavailable");
            counter!("commentary_unavailable_total", "reason" => reason.label()).increment(1);
        }
        outcome
    }
}

impl CommentaryClient for OpenAiProvider {
    fn comment_outcome<'a>(&'a self, prompt: &'a str) -> CommentaryFuture<'a> {
        Box::pin(async move {
            let outcome = self.complete(json!(prompt)).await;
            self.report(outcome)
        })
    }

    fn comment_on_image_outcome<'a>(&'a self, prompt: &'a str, image: &'a [u8]) -> CommentaryFuture<'a> {
        Box::pin(async move {
            let content = json!([
                { "type": "text", "text": prompt },
                { "type": "image_url", "image_url": { "url": image_data_url(image) } },
            ]);
            let outcome = self.complete(content).await;
            self.report(outcome)
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Inline `data:` URL; the MIME type is sniffed from the bytes.
pub fn image_data_url(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Always unavailable; used when no model credential is configured.
pub struct DisabledClient;

impl CommentaryClient for DisabledClient {
    fn comment_outcome<'a>(&'a self, _prompt: &'a str) -> CommentaryFuture<'a> {
        debug!("commentary disabled (no GENAI_API_KEY)");
        Box::pin(async { Availability::Unavailable(UnavailableReason::NotConfigured) })
    }

    fn comment_on_image_outcome<'a>(&'a self, _prompt: &'a str, _image: &'a [u8]) -> CommentaryFuture<'a> {
        Box::pin(async { Availability::Unavailable(UnavailableReason::NotConfigured) })
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Simple mock provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl MockProvider {
    pub fn new(fixed: impl Into<String>) -> Self {
        Self {
            fixed: fixed.into(),
        }
    }
}

impl CommentaryClient for MockProvider {
    fn comment_outcome<'a>(&'a self, _prompt: &'a str) -> CommentaryFuture<'a> {
        let out = self.fixed.clone();
        Box::pin(async move { Availability::Available(out) })
    }

    fn comment_on_image_outcome<'a>(&'a self, _prompt: &'a str, _image: &'a [u8]) -> CommentaryFuture<'a> {
        let out = self.fixed.clone();
        Box::pin(async move { Availability::Available(out) })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
