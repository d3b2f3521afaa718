//! Score blender: evidence, heuristic strikes and AI-likelihood → score in [0,100].
//!
//! 1. base = 55 without evidence; with evidence 20 if any verdict text carries a
//!    debunk keyword, otherwise 85
//! 2. minus 8 per heuristic flag
//! 3. minus trunc(ai_probability * 10) when an AI estimate exists
//! 4. clamp to [0,100]

use once_cell::sync::Lazy;
use regex::Regex;

use crate::decision::Verdict;
use crate::evidence::EvidenceMatch;

pub const BASE_NO_EVIDENCE: i32 = 55;
pub const BASE_DEBUNKED: i32 = 20;
pub const BASE_CORROBORATED: i32 = 85;
pub const HEURISTIC_PENALTY: i32 = 8;

static DEBUNK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(false|hoax|mislead|fabricat|incorrect|debunk)").expect("debunk regex")
});

/// Intermediate values of one blend, kept for the explanation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub base: i32,
    pub debunked: bool,
    pub heuristic_penalty: i32,
    pub ai_penalty: i32,
    pub score: u8,
}

pub fn is_debunk(verdict_text: &str) -> bool {
    DEBUNK_RE.is_match(verdict_text)
}

pub fn blend_breakdown(
    evidence: &[EvidenceMatch],
    heuristic_count: usize,
    ai_probability: Option<f64>,
) -> Breakdown {
    let debunked = evidence.iter().any(|m| is_debunk(&m.verdict_text));
    let base = if evidence.is_empty() {
        BASE_NO_EVIDENCE
    } else if debunked {
        BASE_DEBUNKED
    } else {
        BASE_CORROBORATED
    };

    let strikes = i32::try_from(heuristic_count).unwrap_or(i32::MAX);
    let heuristic_penalty = strikes.saturating_mul(HEURISTIC_PENALTY);

    // Truncation toward zero; probabilities are in [0,1] so this is floor().
    let ai_penalty = ai_probability
        .map(|p| (p.clamp(0.0, 1.0) * 10.0).trunc() as i32)
        .unwrap_or(0);

    let raw = base
        .saturating_sub(heuristic_penalty)
        .saturating_sub(ai_penalty);
    let score = raw.clamp(0, 100) as u8;

    Breakdown {
        base,
        debunked,
        heuristic_penalty,
        ai_penalty,
        score,
    }
}

pub fn blend(evidence: &[EvidenceMatch], heuristic_count: usize, ai_probability: Option<f64>) -> u8 {
    blend_breakdown(evidence, heuristic_count, ai_probability).score
}

pub fn verdict(score: u8) -> Verdict {
    Verdict::from_score(score)
}
