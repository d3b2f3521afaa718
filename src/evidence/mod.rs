// src/evidence/mod.rs
//! External fact-check evidence: the uniform match record and the source seam.

pub mod google;

use std::sync::Arc;

use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{Availability, UnavailableReason};

pub use google::GoogleFactCheckClient;

/// One externally reported fact-check review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceMatch {
    pub source: String,
    #[serde(alias = "verdict")]
    pub verdict_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EvidenceMatch {
    pub fn new(source: impl Into<String>, verdict_text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            verdict_text: verdict_text.into(),
            url: None,
            date: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// Anything that can look up fact-check reviews for a claim query.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Best-effort lookup; says why nothing came back.
    async fn lookup(&self, query: &str, language: Option<&str>) -> Availability<Vec<EvidenceMatch>>;

    fn name(&self) -> &'static str;

    /// Evidence absence never aborts scoring: every failure reads as "no matches".
    async fn search(&self, query: &str) -> Vec<EvidenceMatch> {
        self.lookup(query, None).await.unwrap_or_empty()
    }
}

pub type DynEvidenceSource = Arc<dyn EvidenceSource>;

/// Used when no fact-check credential is configured.
pub struct DisabledSource;

#[async_trait]
impl EvidenceSource for DisabledSource {
    async fn lookup(&self, _query: &str, _language: Option<&str>) -> Availability<Vec<EvidenceMatch>> {
        Availability::Unavailable(UnavailableReason::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed answer for every query; handy for tests and local runs.
#[derive(Clone, Default)]
pub struct StaticSource {
    pub matches: Vec<EvidenceMatch>,
}

impl StaticSource {
    pub fn new(matches: Vec<EvidenceMatch>) -> Self {
        Self { matches }
    }
}

#[async_trait]
impl EvidenceSource for StaticSource {
    async fn lookup(&self, _query: &str, _language: Option<&str>) -> Availability<Vec<EvidenceMatch>> {
        Availability::Available(self.matches.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "evidence_unavailable_total",
            "Fact-check lookups that degraded to no evidence."
        );
        describe_counter!(
            "evidence_matches_total",
            "Fact-check reviews returned by the evidence source."
        );
    });
}

/// Record the outcome of one lookup.
pub(crate) fn record_outcome(outcome: &Availability<Vec<EvidenceMatch>>) {
    ensure_metrics_described();
    match outcome {
        Availability::Available(m) => {
            counter!("evidence_matches_total").increment(m.len() as u64);
        }
        Availability::Unavailable(r) => {
            counter!("evidence_unavailable_total", "reason" => r.label()).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_source_searches_to_empty() {
        let s = DisabledSource;
        assert!(s.search("anything").await.is_empty());
        assert_eq!(
            s.lookup("anything", Some("en")).await,
            Availability::Unavailable(UnavailableReason::NotConfigured)
        );
    }

    #[test]
    fn accepts_legacy_verdict_key() {
        let m: EvidenceMatch =
            serde_json::from_str(r#"{"source":"AFP","verdict":"False","url":"https://afp.com/x"}"#)
                .unwrap();
        assert_eq!(m.verdict_text, "False");
        assert_eq!(m.url.as_deref(), Some("https://afp.com/x"));
        assert!(m.date.is_none());
    }
}
