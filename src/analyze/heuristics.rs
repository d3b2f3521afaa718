//! Heuristic detector: cheap, rule-based unreliability cues over claim text and URL.
//!
//! Rules (case-insensitive, evaluated independently, reported in this order):
//! - `sensational-language`:  a whole word from the sensational word list
//! - `low-reputation-domain`: URL hostname ends in a low-trust TLD
//! - `very-long-claim`:       more than 800 characters of text
//! - `excessive-caps`:        uppercase letters exceed 45% of the text length
//!
//! Pure functions; a malformed URL simply has no hostname.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const LONG_CLAIM_CHARS: usize = 800;
pub const CAPS_RATIO: f64 = 0.45;

static SENSATIONAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(viral|shocking|unbelievable|breaking|must-see|exclusive|miracle|shocker)\b")
        .expect("sensational regex")
});

static LOW_REPUTATION_TLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(xyz|club|cf|ga|gq|icu|top|tk)$").expect("tld regex"));

/// Named pattern matched in a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicFlag {
    SensationalLanguage,
    LowReputationDomain,
    VeryLongClaim,
    ExcessiveCaps,
}

impl HeuristicFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            HeuristicFlag::SensationalLanguage => "sensational-language",
            HeuristicFlag::LowReputationDomain => "low-reputation-domain",
            HeuristicFlag::VeryLongClaim => "very-long-claim",
            HeuristicFlag::ExcessiveCaps => "excessive-caps",
        }
    }
}

impl std::fmt::Display for HeuristicFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run every rule over the available channels.
pub fn detect(text: Option<&str>, url: Option<&str>) -> Vec<HeuristicFlag> {
    let text = text.filter(|t| !t.is_empty());
    let url = url.filter(|u| !u.is_empty());
    let mut flags = Vec::new();

    if text.is_some_and(is_sensational) {
        flags.push(HeuristicFlag::SensationalLanguage);
    }
    if url.is_some_and(|u| is_low_reputation_host(&domain_from_url(u))) {
        flags.push(HeuristicFlag::LowReputationDomain);
    }
    if text.is_some_and(|t| t.chars().count() > LONG_CLAIM_CHARS) {
        flags.push(HeuristicFlag::VeryLongClaim);
    }
    if text.is_some_and(has_excessive_caps) {
        flags.push(HeuristicFlag::ExcessiveCaps);
    }

    flags
}

pub fn is_sensational(text: &str) -> bool {
    SENSATIONAL_RE.is_match(text)
}

pub fn is_low_reputation_host(host: &str) -> bool {
    !host.is_empty() && LOW_REPUTATION_TLD_RE.is_match(host)
}

/// Lower-cased hostname of `url`, or an empty string when it does not parse.
pub fn domain_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default()
}

fn has_excessive_caps(text: &str) -> bool {
    let total = text.chars().count();
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 > total as f64 * CAPS_RATIO
}
