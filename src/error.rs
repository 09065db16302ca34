//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, info, warn};

use crate::generate::GenerationError;

/// Errors surfaced to HTTP clients by the wallhub handlers.
#[derive(Debug)]
pub enum WallhubError {
    /// Missing or malformed client input, the message is shown to the client
    BadRequest(String),
    /// A credential the feature needs wasn't configured at startup
    NotConfigured(String),
    /// An upstream service failed. `detail` is only logged, the client gets `public`.
    Upstream {
        /// Generic message returned to the client
        public: &'static str,
        /// What actually went wrong, for the server log
        detail: String,
    },
    /// When an internal server error occurs
    InternalServerError(String),
}

impl WallhubError {
    /// Builds an [`WallhubError::Upstream`] from any displayable failure.
    pub fn upstream(public: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::Upstream {
            public,
            detail: detail.to_string(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { .. } | Self::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Logs the error and returns the message that is safe to show a client.
    fn log_and_public_message(&self) -> String {
        match self {
            Self::BadRequest(message) => {
                info!("Bad request: {}", message);
                message.clone()
            }
            Self::NotConfigured(message) => {
                warn!("Feature not configured: {}", message);
                message.clone()
            }
            Self::Upstream { public, detail } => {
                error!("{}: {}", public, detail);
                public.to_string()
            }
            Self::InternalServerError(message) => {
                error!("Internal server error: {}", message);
                "Server error".to_string()
            }
        }
    }
}

impl std::fmt::Display for WallhubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "Bad request: {message}"),
            Self::NotConfigured(message) => write!(f, "Not configured: {message}"),
            Self::Upstream { public, detail } => write!(f, "{public}: {detail}"),
            Self::InternalServerError(message) => write!(f, "Internal server error: {message}"),
        }
    }
}

impl std::error::Error for WallhubError {}

impl From<axum::http::Error> for WallhubError {
    fn from(err: axum::http::Error) -> Self {
        WallhubError::InternalServerError(err.to_string())
    }
}

impl From<GenerationError> for WallhubError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::EmptyPrompt => Self::BadRequest("Prompt is required".to_string()),
            GenerationError::NotConfigured => Self::NotConfigured(
                "AI generation not configured (BYTES_KEY missing)".to_string(),
            ),
            // an unreachable or timed-out model is a failed generation, not a server fault
            GenerationError::Failed(detail) => Self::upstream("AI generation failed", detail),
            GenerationError::Request(err) => Self::upstream("AI generation failed", err),
        }
    }
}

/// Plain-text error body, used by the image relay routes.
impl IntoResponse for WallhubError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.log_and_public_message();
        (status, message).into_response()
    }
}

/// Wraps a [`WallhubError`] so it renders as `{"error": "..."}` for the JSON API routes.
#[derive(Debug)]
pub struct JsonError(WallhubError);

impl From<WallhubError> for JsonError {
    fn from(err: WallhubError) -> Self {
        JsonError(err)
    }
}

impl From<GenerationError> for JsonError {
    fn from(err: GenerationError) -> Self {
        JsonError(err.into())
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.log_and_public_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
