//! Lexical estimate of how likely a text span is machine-generated.
//!
//! Features: average word length, distinct-word ratio and the number of distinct
//! punctuation marks from `.,;:!?`. Texts under 50 characters are not scored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_CHARS: usize = 50;
pub const BASE_PROBABILITY: f64 = 0.1;
pub const MAX_PROBABILITY: f64 = 0.99;
const PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiLikelihoodEstimate {
    pub probability: f64,
    pub rationale: String,
}

/// Measured lexical features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalFeatures {
    pub avg_word_len: f64,
    pub unique_ratio: f64,
    pub punct_variety: usize,
}

impl LexicalFeatures {
    pub fn measure(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let n = words.len().max(1) as f64;
        let letters: usize = words.iter().map(|w| w.chars().count()).sum();
        let distinct: HashSet<&str> = words.iter().copied().collect();
        let punct: HashSet<char> = text.chars().filter(|c| PUNCTUATION.contains(c)).collect();

        Self {
            avg_word_len: letters as f64 / n,
            unique_ratio: distinct.len() as f64 / n,
            punct_variety: punct.len(),
        }
    }
}

pub fn estimate(text: &str) -> AiLikelihoodEstimate {
    if text.chars().count() < MIN_CHARS {
        return AiLikelihoodEstimate {
            probability: BASE_PROBABILITY,
            rationale: "too short for detection".to_string(),
        };
    }

    let f = LexicalFeatures::measure(text);
    let mut p = BASE_PROBABILITY;
    if f.avg_word_len > 6.5 {
        p += 0.25;
    }
    if f.unique_ratio < 0.45 {
        p += 0.35;
    }
    if f.punct_variety < 2 {
        p += 0.2;
    }

    AiLikelihoodEstimate {
        probability: p.min(MAX_PROBABILITY),
        rationale: format!(
            "avg_word_len={:.2}, uniq_ratio={:.2}, punct_var={}",
            f.avg_word_len, f.unique_ratio, f.punct_variety
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_scored() {
        for t in ["", "hi", "extraordinarily sophisticated terminology!!"] {
            let e = estimate(t);
            assert_eq!(e.probability, 0.1);
            assert_eq!(e.rationale, "too short for detection");
        }
    }

    #[test]
    fn varied_human_text_stays_at_base() {
        let t = "I went to the shop, bought some milk; then I walked home. Was it raining? Yes!";
        let e = estimate(t);
        assert_eq!(e.probability, 0.1);
        assert!(e.rationale.starts_with("avg_word_len="));
        assert!(e.rationale.ends_with("punct_var=5"));
    }

    #[test]
    fn repetitive_unpunctuated_text_scores_high() {
        let t = "the cat the cat the cat the cat the cat the cat the cat the cat the cat";
        let f = LexicalFeatures::measure(t);
        assert_eq!(f.punct_variety, 0);
        assert!(f.unique_ratio < 0.45);
        let e = estimate(t);
        // 0.1 + 0.35 + 0.2
        assert!((e.probability - 0.65).abs() < 1e-9);
        assert!(e.rationale.contains("uniq_ratio=0.11"));
    }

    #[test]
    fn all_features_stay_below_cap() {
        let t = "characteristically characteristically characteristically characteristically";
        let e = estimate(t);
        assert!((e.probability - 0.9).abs() < 1e-9);
        assert!(e.probability <= MAX_PROBABILITY);
    }
}
