//! Error taxonomy for the scoring engine.
//!
//! Only `InvalidInput` is meant for the caller. Unavailable external services are
//! not errors at all: they are modelled as [`Availability::Unavailable`] and
//! absorbed into a degraded result.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller supplied no usable claim content.
    #[error("Provide text or URL")]
    InvalidInput,

    /// Bytes do not decode as a supported still image.
    #[error("Not an image: {0}")]
    Decode(String),

    /// Anything unexpected while scoring; reported as a generic failure.
    #[error("internal fault: {0}")]
    Internal(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            EngineError::InvalidInput => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: self.to_string(),
                    details: None,
                },
            ),
            EngineError::Decode(d) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: "Not an image".to_string(),
                    details: Some(d.clone()),
                },
            ),
            EngineError::Internal(d) => {
                tracing::error!(details = %d, "internal fault while scoring");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Scoring failed".to_string(),
                        details: Some(d.clone()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Why a best-effort external call produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    NotConfigured,
    Timeout,
    Status(u16),
    Transport(String),
    Malformed(String),
}

impl UnavailableReason {
    /// Short label used as a metrics dimension.
    pub fn label(&self) -> &'static str {
        match self {
            UnavailableReason::NotConfigured => "not_configured",
            UnavailableReason::Timeout => "timeout",
            UnavailableReason::Status(_) => "status",
            UnavailableReason::Transport(_) => "transport",
            UnavailableReason::Malformed(_) => "malformed",
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::NotConfigured => write!(f, "not configured"),
            UnavailableReason::Timeout => write!(f, "timed out"),
            UnavailableReason::Status(code) => write!(f, "non-success status {code}"),
            UnavailableReason::Transport(e) => write!(f, "transport failure: {e}"),
            UnavailableReason::Malformed(e) => write!(f, "malformed response: {e}"),
        }
    }
}

/// Outcome of a best-effort call to an optional external service.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Available(T),
    Unavailable(UnavailableReason),
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Availability::Available(v) => Some(v),
            Availability::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&UnavailableReason> {
        match self {
            Availability::Available(_) => None,
            Availability::Unavailable(r) => Some(r),
        }
    }
}

impl<T: Default> Availability<T> {
    /// Collapse to the value, or `T::default()` when the service was unavailable.
    pub fn unwrap_or_empty(self) -> T {
        self.ok().unwrap_or_default()
    }
}
