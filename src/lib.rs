// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod media;
pub mod metrics;
pub mod translate;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use crate::api::{router, AppState};
pub use crate::config::EngineConfig;
pub use crate::decision::{ClaimInput, MediaResult, ScoreResult, Verdict};
pub use crate::engine::ClaimEngine;
pub use crate::error::{Availability, EngineError, UnavailableReason};

use tracing::info;

/// Build the full router from the default configuration sources.
///
/// Used by the binary and by tests that want the same wiring without Shuttle.
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = EngineConfig::load_default()?;
    info!(
        factcheck = cfg.factcheck.is_configured(),
        commentary = cfg.commentary.is_configured(),
        translate = cfg.translate.is_configured(),
        "engine config loaded"
    );
    Ok(api::create_router(AppState::from_config(&cfg)))
}
