//! # Claim Scoring Engine
//! Fans a claim out to the signal gatherers and blends what comes back.
//!
//! Heuristics and the AI-likelihood estimate run inline. Evidence search and
//! generative commentary run concurrently, each under its own timeout; a timeout
//! reads exactly like "service unavailable". The engine keeps no state between
//! requests, so one instance is shared by every handler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::analyze::ai_adapter::{build_client_from_config, DynCommentaryClient};
use crate::analyze::ai_likelihood::{self, AiLikelihoodEstimate};
use crate::analyze::heuristics::{self, HeuristicFlag};
use crate::analyze::scoring::{self, Breakdown};
use crate::config::EngineConfig;
use crate::decision::{
    claim_id, now_timestamp, ClaimInput, MediaFinding, MediaResult, ScoreResult, Verdict,
};
use crate::error::{Availability, EngineError, EngineResult, UnavailableReason};
use crate::evidence::{DisabledSource, DynEvidenceSource, EvidenceMatch, GoogleFactCheckClient};
use crate::media;

/// Media has no evidence channel yet, so it always lands mid-scale.
pub const MEDIA_NEUTRAL_SCORE: u8 = 50;

const TEXT_EXPLANATION: &str =
    "Automated verification combining heuristic checks and external databases.";
const IMAGE_PROMPT: &str =
    "Assess whether this image looks manipulated, AI-generated or reused out of context.";

#[derive(Clone)]
pub struct ClaimEngine {
    evidence: DynEvidenceSource,
    commentary: DynCommentaryClient,
    timeout: Duration,
}

impl ClaimEngine {
    pub fn new(evidence: DynEvidenceSource, commentary: DynCommentaryClient, timeout: Duration) -> Self {
        Self {
            evidence,
            commentary,
            timeout,
        }
    }

    /// Wire the real clients; unconfigured services get disabled stand-ins.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        let timeout = cfg.timeout();
        let evidence: DynEvidenceSource = if cfg.factcheck.is_configured() {
            Arc::new(GoogleFactCheckClient::new(&cfg.factcheck, timeout))
        } else {
            Arc::new(DisabledSource)
        };
        let commentary = build_client_from_config(&cfg.commentary, timeout);
        info!(
            evidence = evidence.name(),
            commentary = commentary.provider_name(),
            timeout_secs = timeout.as_secs(),
            "claim engine ready"
        );
        Self::new(evidence, commentary, timeout)
    }

    /// Validate raw fields, then score. The only caller-facing error is `InvalidInput`.
    pub async fn score_claim(
        &self,
        text: Option<String>,
        url: Option<String>,
        language: Option<String>,
    ) -> EngineResult<ScoreResult> {
        let input = ClaimInput::new(text, url, language)?;
        Ok(self.score_text(&input).await)
    }

    pub async fn score_text(&self, input: &ClaimInput) -> ScoreResult {
        let t0 = Instant::now();
        let id = claim_id(input.query());

        let flags = heuristics::detect(input.text(), input.url());
        let ai_check = input.text().map(ai_likelihood::estimate);

        let prompt = commentary_prompt(input);
        let (evidence, commentary) = tokio::join!(
            self.gather_evidence(input.query(), input.language()),
            self.gather_commentary(&prompt),
        );

        let breakdown = scoring::blend_breakdown(
            &evidence,
            flags.len(),
            ai_check.as_ref().map(|a| a.probability),
        );
        let verdict = Verdict::from_score(breakdown.score);
        let explanation = explain(&breakdown, evidence.len(), &flags, ai_check.as_ref());

        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
        counter!("claims_scored_total", "verdict" => verdict.as_str()).increment(1);
        histogram!("claim_scoring_ms").record(elapsed_ms);
        info!(
            claim_id = %id,
            score = breakdown.score,
            verdict = verdict.as_str(),
            heuristics = flags.len(),
            sources = evidence.len(),
            commentary = commentary.is_some(),
            elapsed_ms = elapsed_ms as u64,
            "claim scored"
        );

        ScoreResult {
            claim_id: id,
            score: breakdown.score,
            verdict,
            heuristics: flags,
            sources: evidence,
            ai_check,
            commentary,
            explanation,
            checked_at: now_timestamp(),
        }
    }

    /// Non-image bytes are a finding, not an error. Only a crashed decoder worker
    /// surfaces as `Internal`.
    pub async fn score_media(&self, bytes: Vec<u8>) -> EngineResult<MediaResult> {
        let shared: Arc<[u8]> = bytes.into();
        let worker = Arc::clone(&shared);
        let decoded = tokio::task::spawn_blocking(move || media::fingerprint(&worker))
            .await
            .map_err(|e| EngineError::Internal(format!("fingerprint worker: {e}")))?;

        let mut findings = Vec::new();
        let (fingerprint, explanation) = match decoded {
            Ok(fp) => {
                findings.push(MediaFinding::Image {
                    note: format!("Validated image ({}x{})", fp.width, fp.height),
                });
                findings.push(MediaFinding::Phash {
                    value: fp.hash.clone(),
                });
                if let Some(note) = self.gather_image_commentary(&shared).await {
                    findings.push(MediaFinding::Commentary { note });
                }
                (
                    Some(fp),
                    "Image validated and fingerprinted; score stays neutral without reverse-image evidence."
                        .to_string(),
                )
            }
            Err(e) => {
                counter!("media_decode_failures_total").increment(1);
                findings.push(MediaFinding::File { note: e.to_string() });
                (
                    None,
                    "Upload could not be decoded as an image; score stays neutral.".to_string(),
                )
            }
        };

        let verdict = Verdict::from_score(MEDIA_NEUTRAL_SCORE);
        let image_label = if fingerprint.is_some() { "yes" } else { "no" };
        counter!("media_scored_total", "image" => image_label).increment(1);
        info!(
            bytes = shared.len(),
            image = fingerprint.is_some(),
            hash = fingerprint.as_ref().map(|f| f.hash.as_str()).unwrap_or(""),
            "media scored"
        );

        Ok(MediaResult {
            findings,
            score: MEDIA_NEUTRAL_SCORE,
            verdict,
            fingerprint,
            explanation,
            checked_at: now_timestamp(),
        })
    }

    async fn gather_evidence(&self, query: &str, language: Option<&str>) -> Vec<EvidenceMatch> {
        let outcome = tokio::time::timeout(self.timeout, self.evidence.lookup(query, language))
            .await
            .unwrap_or_else(|_| {
                counter!("evidence_unavailable_total", "reason" => "timeout").increment(1);
                warn!(source = self.evidence.name(), "evidence lookup timed out");
                Availability::Unavailable(UnavailableReason::Timeout)
            });
        outcome.unwrap_or_empty()
    }

    async fn gather_commentary(&self, prompt: &str) -> Option<String> {
        self.bounded_commentary(self.commentary.comment_outcome(prompt)).await
    }

    async fn gather_image_commentary(&self, image: &[u8]) -> Option<String> {
        self.bounded_commentary(self.commentary.comment_on_image_outcome(IMAGE_PROMPT, image))
            .await
    }

    async fn bounded_commentary(
        &self,
        fut: impl std::future::Future<Output = Availability<String>>,
    ) -> Option<String> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .unwrap_or_else(|_| {
                counter!("commentary_unavailable_total", "reason" => "timeout").increment(1);
                warn!(provider = self.commentary.provider_name(), "commentary timed out");
                Availability::Unavailable(UnavailableReason::Timeout)
            })
            .ok()
    }
}

fn commentary_prompt(input: &ClaimInput) -> String {
    let mut out = String::new();
    if let Some(t) = input.text() {
        out.push_str("Claim: ");
        out.push_str(t);
        out.push('\n');
    }
    if let Some(u) = input.url() {
        out.push_str("Source URL: ");
        out.push_str(u);
        out.push('\n');
    }
    out.push_str("Language: ");
    out.push_str(input.language_or_default());
    out
}

/// Human-readable account of how the score came about.
pub fn explain(
    b: &Breakdown,
    evidence_count: usize,
    flags: &[HeuristicFlag],
    ai: Option<&AiLikelihoodEstimate>,
) -> String {
    let mut parts = vec![TEXT_EXPLANATION.to_string()];

    parts.push(match (evidence_count, b.debunked) {
        (0, _) => format!("No fact-check reviews found (base {}).", b.base),
        (n, true) => format!("{n} fact-check review(s); at least one debunks the claim (base {}).", b.base),
        (n, false) => format!("{n} fact-check review(s); none debunk the claim (base {}).", b.base),
    });

    if !flags.is_empty() {
        let names: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
        parts.push(format!(
            "Heuristic flags: {} (-{}).",
            names.join(", "),
            b.heuristic_penalty
        ));
    }
    if let Some(a) = ai {
        parts.push(format!(
            "AI-likelihood {:.2} (-{}).",
            a.probability, b.ai_penalty
        ));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::{CommentaryClient, DisabledClient, MockProvider};
    use crate::evidence::{EvidenceSource, StaticSource};
    use async_trait::async_trait;

    const STALL: Duration = Duration::from_secs(60);

    struct StalledSource;

    #[async_trait]
    impl EvidenceSource for StalledSource {
        async fn lookup(&self, _query: &str, _language: Option<&str>) -> Availability<Vec<EvidenceMatch>> {
            tokio::time::sleep(STALL).await;
            Availability::Available(vec![EvidenceMatch::new("Late", "Correct")])
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    struct StalledCommentary;

    impl CommentaryClient for StalledCommentary {
        fn comment_outcome<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Availability<String>> + Send + 'a>> {
            Box::pin(async {
                tokio::time::sleep(STALL).await;
                Availability::Available("too late".to_string())
            })
        }

        fn comment_on_image_outcome<'a>(
            &'a self,
            prompt: &'a str,
            _image: &'a [u8],
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Availability<String>> + Send + 'a>> {
            self.comment_outcome(prompt)
        }

        fn provider_name(&self) -> &'static str {
            "stalled"
        }
    }

    fn engine(matches: Vec<EvidenceMatch>) -> ClaimEngine {
        ClaimEngine::new(
            Arc::new(StaticSource::new(matches)),
            Arc::new(DisabledClient),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn url_only_claim_has_no_ai_check() {
        let r = engine(vec![])
            .score_claim(None, Some("http://example.xyz".into()), None)
            .await
            .unwrap();
        assert_eq!(r.heuristics, vec![HeuristicFlag::LowReputationDomain]);
        assert!(r.ai_check.is_none());
        assert_eq!(r.score, 55 - 8);
        assert_eq!(r.verdict, Verdict::Unclear);
        assert!(r.explanation.contains("low-reputation-domain (-8)"));
    }

    #[tokio::test]
    async fn empty_claim_is_rejected() {
        let err = engine(vec![]).score_claim(Some(" ".into()), None, None).await;
        assert!(matches!(err, Err(EngineError::InvalidInput)));
    }

    #[tokio::test]
    async fn commentary_is_surfaced_but_not_scored() {
        let e = ClaimEngine::new(
            Arc::new(StaticSource::new(vec![EvidenceMatch::new("AFP", "Hoax")])),
            Arc::new(MockProvider::new("Assessment: likely false")),
            Duration::from_secs(2),
        );
        let r = e
            .score_claim(Some("The moon is made of cheese".into()), None, None)
            .await
            .unwrap();
        assert_eq!(r.commentary.as_deref(), Some("Assessment: likely false"));
        // 20 - trunc(0.1 * 10)
        assert_eq!(r.score, 19);
        assert_eq!(r.verdict, Verdict::LikelyFalse);
    }

    #[test]
    fn prompt_lists_available_channels() {
        let c = ClaimInput::new(Some("x".into()), None, Some("de".into())).unwrap();
        assert_eq!(commentary_prompt(&c), "Claim: x\nLanguage: de");
    }

    #[tokio::test]
    async fn stalled_evidence_degrades_within_timeout() {
        let e = ClaimEngine::new(
            Arc::new(StalledSource),
            Arc::new(DisabledClient),
            Duration::from_secs(1),
        );
        let t0 = Instant::now();
        let r = e
            .score_claim(None, Some("https://www.reuters.com/world/story".into()), None)
            .await
            .unwrap();
        assert!(t0.elapsed() < Duration::from_secs(5), "took {:?}", t0.elapsed());
        assert_eq!(r.score, 55);
        assert!(r.sources.is_empty());
        assert!(r.heuristics.is_empty());
    }

    #[tokio::test]
    async fn stalled_commentary_degrades_within_timeout() {
        let e = ClaimEngine::new(
            Arc::new(StaticSource::new(vec![])),
            Arc::new(StalledCommentary),
            Duration::from_secs(1),
        );
        let t0 = Instant::now();
        let r = e
            .score_claim(None, Some("https://www.reuters.com/world/story".into()), None)
            .await
            .unwrap();
        assert!(t0.elapsed() < Duration::from_secs(5), "took {:?}", t0.elapsed());
        assert_eq!(r.score, 55);
        assert!(r.sources.is_empty());
        assert!(r.commentary.is_none());

        let png = {
            let img = image::RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]));
            let mut buf = std::io::Cursor::new(Vec::new());
            image::DynamicImage::ImageRgb8(img)
                .write_to(&mut buf, image::ImageFormat::Png)
                .unwrap();
            buf.into_inner()
        };
        let m = e.score_media(png).await.unwrap();
        assert!(t0.elapsed() < Duration::from_secs(8));
        assert!(!m.findings.iter().any(|f| matches!(f, MediaFinding::Commentary { .. })));
    }
}
