// src/evidence/google.rs
//! Google Fact Check Tools `claims:search` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{record_outcome, EvidenceMatch, EvidenceSource};
use crate::config::FactCheckConfig;
use crate::error::{Availability, UnavailableReason};

pub const DEFAULT_PUBLISHER: &str = "fact-check";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    claims: Option<Vec<Claim>>,
}

#[derive(Debug, Deserialize)]
struct Claim {
    #[serde(default, rename = "claimReview")]
    claim_review: Option<Vec<ClaimReview>>,
}

#[derive(Debug, Deserialize)]
struct ClaimReview {
    publisher: Option<Publisher>,
    url: Option<String>,
    title: Option<String>,
    #[serde(rename = "textualRating")]
    textual_rating: Option<String>,
    #[serde(rename = "reviewDate")]
    review_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
}

/// Normalize a `claims:search` response body. Only the first review of each claim counts.
pub fn parse_claims(body: &str) -> Result<Vec<EvidenceMatch>, serde_json::Error> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    let out = resp
        .claims
        .into_iter()
        .flatten()
        .filter_map(|c| c.claim_review.into_iter().flatten().next())
        .map(|cr| {
            let source = cr
                .publisher
                .and_then(|p| p.name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_PUBLISHER.to_string());
            let verdict_text = cr
                .textual_rating
                .filter(|r| !r.is_empty())
                .or(cr.title.filter(|t| !t.is_empty()))
                .unwrap_or_default();
            EvidenceMatch {
                source,
                verdict_text,
                url: cr.url,
                date: cr.review_date,
            }
        })
        .collect();
    Ok(out)
}

pub struct GoogleFactCheckClient {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleFactCheckClient {
    pub fn new(cfg: &FactCheckConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("truthlens/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "fact-check http client builder failed, using defaults");
                reqwest::Client::new()
            });
        Self {
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
            endpoint: cfg.endpoint.clone(),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, key: &str, query: &str, language: Option<&str>) -> Availability<Vec<EvidenceMatch>> {
        let mut params = vec![("query", query), ("key", key)];
        if let Some(lang) = language {
            params.push(("languageCode", lang));
        }

        let resp = match self.client.get(&self.endpoint).query(&params).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Availability::Unavailable(UnavailableReason::Timeout),
            Err(e) => return Availability::Unavailable(UnavailableReason::Transport(e.to_string())),
        };

        let status = resp.status();
        if !status.is_success() {
            return Availability::Unavailable(UnavailableReason::Status(status.as_u16()));
        }

        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) if e.is_timeout() => return Availability::Unavailable(UnavailableReason::Timeout),
            Err(e) => return Availability::Unavailable(UnavailableReason::Transport(e.to_string())),
        };

        match parse_claims(&body) {
            Ok(m) => Availability::Available(m),
            Err(e) => Availability::Unavailable(UnavailableReason::Malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl EvidenceSource for GoogleFactCheckClient {
    async fn lookup(&self, query: &str, language: Option<&str>) -> Availability<Vec<EvidenceMatch>> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("fact-check disabled (no FACTCHECK_API_KEY)");
            return Availability::Unavailable(UnavailableReason::NotConfigured);
        };

        let t0 = Instant::now();
        let outcome = self.fetch(key, query, language).await;
        histogram!("evidence_lookup_ms").record(t0.elapsed().as_secs_f64() * 1000.0);

        if let Some(reason) = outcome.reason() {
            warn!(%reason, "fact-check lookup failed, continuing without evidence");
        }
        record_outcome(&outcome);
        outcome
    }

    fn name(&self) -> &'static str {
        "google-factcheck"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_review_and_defaults() {
        let body = r#"{
          "claims": [
            {"text": "a", "claimReview": [
              {"publisher": {"name": "PolitiFact"}, "url": "https://p/1", "textualRating": "False", "title": "t", "reviewDate": "2024-01-02T00:00:00Z"},
              {"publisher": {"name": "Second"}, "textualRating": "True"}
            ]},
            {"text": "b", "claimReview": [{"title": "Claim is misleading"}]},
            {"text": "c", "claimReview": []},
            {"text": "d"},
            {"text": "n", "claimReview": null},
            {"text": "e", "claimReview": [{"publisher": {}, "textualRating": ""}]}
          ]
        }"#;
        let m = parse_claims(body).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m[0].source, "PolitiFact");
        assert_eq!(m[0].verdict_text, "False");
        assert_eq!(m[0].url.as_deref(), Some("https://p/1"));
        assert_eq!(m[0].date.as_deref(), Some("2024-01-02T00:00:00Z"));
        assert_eq!(m[1].source, DEFAULT_PUBLISHER);
        assert_eq!(m[1].verdict_text, "Claim is misleading");
        assert_eq!(m[2].verdict_text, "");
    }

    #[test]
    fn empty_object_has_no_claims() {
        assert!(parse_claims("{}").unwrap().is_empty());
        assert!(parse_claims(r#"{"claims": null}"#).unwrap().is_empty());
        assert!(parse_claims("not json").is_err());
    }
}
