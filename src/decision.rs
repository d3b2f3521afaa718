//! decision.rs: claim input and the result shapes returned to callers.
//!
//! `ScoreResult` and `MediaResult` are the one stable contract consumed by the
//! web layer and persisted verbatim by the (external) history store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::ai_likelihood::AiLikelihoodEstimate;
use crate::analyze::heuristics::HeuristicFlag;
use crate::error::{EngineError, EngineResult};
use crate::evidence::EvidenceMatch;
use crate::media::MediaFingerprint;

pub const DEFAULT_LANGUAGE: &str = "en";

/// One text/URL claim. At least one of `text`/`url` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimInput {
    text: Option<String>,
    url: Option<String>,
    language: Option<String>,
}

impl ClaimInput {
    /// Trims both channels; empty strings count as absent.
    pub fn new(
        text: Option<String>,
        url: Option<String>,
        language: Option<String>,
    ) -> EngineResult<Self> {
        let text = non_empty(text);
        let url = non_empty(url);
        if text.is_none() && url.is_none() {
            return Err(EngineError::InvalidInput);
        }
        let language = non_empty(language);
        Ok(Self {
            text,
            url,
            language,
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Language as the caller gave it; `None` leaves evidence search unrestricted.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn language_or_default(&self) -> &str {
        self.language().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Query sent to the fact-check search: the text, or the URL when there is none.
    pub fn query(&self) -> &str {
        self.text
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or_default()
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Coarse three-way classification derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    LikelyReal,
    Unclear,
    LikelyFalse,
}

impl Verdict {
    pub const REAL_THRESHOLD: u8 = 70;
    pub const FALSE_THRESHOLD: u8 = 40;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::REAL_THRESHOLD {
            Verdict::LikelyReal
        } else if score <= Self::FALSE_THRESHOLD {
            Verdict::LikelyFalse
        } else {
            Verdict::Unclear
        }
    }

    /// Wire name, also used as a metrics label.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::LikelyReal => "likely_real",
            Verdict::Unclear => "unclear",
            Verdict::LikelyFalse => "likely_false",
        }
    }

    /// Human-readable label for UI consumers.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::LikelyReal => "Likely real",
            Verdict::Unclear => "Unclear",
            Verdict::LikelyFalse => "Likely false",
        }
    }
}

/// Outcome of scoring one text/URL claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub claim_id: String,
    pub score: u8,
    pub verdict: Verdict,
    pub heuristics: Vec<HeuristicFlag>,
    pub sources: Vec<EvidenceMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_check: Option<AiLikelihoodEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    pub explanation: String,
    pub checked_at: String,
}

/// A single observation made while inspecting uploaded media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaFinding {
    Image { note: String },
    Phash { value: String },
    File { note: String },
    Commentary { note: String },
}

/// Outcome of scoring one media upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaResult {
    pub findings: Vec<MediaFinding>,
    pub score: u8,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<MediaFingerprint>,
    pub explanation: String,
    pub checked_at: String,
}

impl MediaResult {
    pub fn is_image(&self) -> bool {
        self.fingerprint.is_some()
    }
}

/// RFC 3339 UTC timestamp with a trailing `Z`, e.g. `2025-08-16T10:00:00.123Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

/// Short anonymized id for a claim. Raw claim text never goes to the logs.
pub fn claim_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
