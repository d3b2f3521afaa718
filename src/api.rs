use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::EngineConfig;
use crate::decision::{now_timestamp, ScoreResult};
use crate::engine::ClaimEngine;
use crate::error::EngineError;
use crate::translate::{TranslateClient, DEFAULT_TARGET};

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ClaimEngine>,
    pub translate: Arc<TranslateClient>,
}

impl AppState {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            engine: Arc::new(ClaimEngine::from_config(cfg)),
            translate: Arc::new(TranslateClient::new(&cfg.translate, cfg.timeout())),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/factcheck/text", post(factcheck_text))
        .route("/api/factcheck/media", post(factcheck_media))
        .route("/api/factcheck/media/raw", post(factcheck_media_raw))
        .route("/api/translate", post(translate))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::very_permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Alias kept for callers that expect `truthlens::router`.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

#[derive(Debug, Default, Deserialize)]
struct TextReq {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaReq {
    #[serde(default)]
    b64: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslateReq {
    #[serde(default)]
    text: String,
    #[serde(default)]
    target: Option<String>,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "time": now_timestamp() }))
}

// Bodies are parsed leniently: anything that is not the expected JSON reads as `{}`.
async fn factcheck_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScoreResult>, EngineError> {
    let req: TextReq = serde_json::from_slice(&body).unwrap_or_default();
    let result = state
        .engine
        .score_claim(req.text, req.url, req.language)
        .await?;
    Ok(Json(result))
}

async fn factcheck_media(State(state): State<AppState>, body: Bytes) -> Response {
    let req: MediaReq = serde_json::from_slice(&body).unwrap_or_default();
    let Some(b64) = req.b64 else {
        return bad_request("No file or b64 provided", None);
    };
    let content = match STANDARD.decode(b64.trim()) {
        Ok(c) => c,
        Err(e) => return bad_request("Invalid file data", Some(e.to_string())),
    };
    score_media(&state, content).await
}

async fn factcheck_media_raw(State(state): State<AppState>, body: Bytes) -> Response {
    if body.is_empty() {
        return bad_request("No file or b64 provided", None);
    }
    score_media(&state, body.to_vec()).await
}

async fn score_media(state: &AppState, content: Vec<u8>) -> Response {
    match state.engine.score_media(content).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn translate(State(state): State<AppState>, body: Bytes) -> Response {
    let req: TranslateReq = serde_json::from_slice(&body).unwrap_or_default();
    let target = req
        .target
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());
    match state.translate.translate(&req.text, &target).await {
        Ok(out) => Json(out).into_response(),
        Err(e) => {
            warn!(error = %e, "translation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Translation failed", "details": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}

fn bad_request(error: &str, details: Option<String>) -> Response {
    let mut body = json!({ "error": error });
    if let Some(d) = details {
        body["details"] = json!(d);
    }
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    EngineError::Internal(details).into_response()
}
