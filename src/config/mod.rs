// src/config/mod.rs
//! Engine configuration: credentials and endpoints for the optional external
//! services, passed explicitly into every client at construction time.
//!
//! Sources, first match wins:
//! 1) file at $TRUTHLENS_CONFIG_PATH (TOML or JSON)
//! 2) config/truthlens.toml
//! 3) plain environment variables
//!
//! Secret fields set to "ENV" in a file are read from the matching env var.

pub mod ai;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use ai::CommentaryConfig;

pub const ENV_CONFIG_PATH: &str = "TRUTHLENS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/truthlens.toml";
pub const ENV_TIMEOUT_SECS: &str = "TRUTHLENS_TIMEOUT_SECS";
pub const ENV_FACTCHECK_API_KEY: &str = "FACTCHECK_API_KEY";
pub const ENV_FACTCHECK_ENDPOINT: &str = "FACTCHECK_ENDPOINT";
pub const ENV_TRANSLATE_ENDPOINT: &str = "TRANSLATE_ENDPOINT";
pub const ENV_TRANSLATE_KEY: &str = "TRANSLATE_KEY";

pub const DEFAULT_TIMEOUT_SECS: u64 = 8;
const MAX_TIMEOUT_SECS: u64 = 10;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_factcheck_endpoint() -> String {
    "https://factchecktools.googleapis.com/v1alpha1/claims:search".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckConfig {
    /// "ENV" means: read from FACTCHECK_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_factcheck_endpoint")]
    pub endpoint: String,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_factcheck_endpoint(),
        }
    }
}

impl FactCheckConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    /// "ENV" means: read from TRANSLATE_KEY
    #[serde(default)]
    pub api_key: Option<String>,
}

impl TranslateConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub factcheck: FactCheckConfig,
    #[serde(default)]
    pub commentary: CommentaryConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    /// Upper bound for each external call, in seconds (clamped to 1..=10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            factcheck: FactCheckConfig::default(),
            commentary: CommentaryConfig::default(),
            translate: TranslateConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self {
            factcheck: FactCheckConfig {
                api_key: env::var(ENV_FACTCHECK_API_KEY).ok(),
                endpoint: env::var(ENV_FACTCHECK_ENDPOINT)
                    .unwrap_or_else(|_| default_factcheck_endpoint()),
            },
            commentary: CommentaryConfig::from_env(),
            translate: TranslateConfig {
                endpoint: env::var(ENV_TRANSLATE_ENDPOINT).ok(),
                api_key: env::var(ENV_TRANSLATE_KEY).ok(),
            },
            timeout_secs: env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        cfg.sanitize();
        cfg
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from_file(&default_p);
        }
        Ok(Self::from_env())
    }

    fn sanitize(&mut self) {
        self.factcheck.api_key =
            resolve_secret(self.factcheck.api_key.take(), ENV_FACTCHECK_API_KEY);
        if self.factcheck.endpoint.trim().is_empty() {
            self.factcheck.endpoint = default_factcheck_endpoint();
        }
        self.commentary.sanitize();
        self.translate.endpoint = self
            .translate
            .endpoint
            .take()
            .filter(|e| !e.trim().is_empty());
        self.translate.api_key = resolve_secret(self.translate.api_key.take(), ENV_TRANSLATE_KEY);
        self.timeout_secs = self.timeout_secs.clamp(1, MAX_TIMEOUT_SECS);
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<EngineConfig> {
    if hint_ext == "json" || s.trim_start().starts_with('{') {
        return serde_json::from_str(s).map_err(Into::into);
    }
    toml::from_str(s).map_err(Into::into)
}

/// Blank means absent; "ENV" (any case) means read `var`.
pub(crate) fn resolve_secret(value: Option<String>, var: &str) -> Option<String> {
    let v = value?.trim().to_string();
    if v.is_empty() {
        return None;
    }
    if v.eq_ignore_ascii_case("env") {
        return env::var(var).ok().filter(|k| !k.trim().is_empty());
    }
    Some(v)
}
