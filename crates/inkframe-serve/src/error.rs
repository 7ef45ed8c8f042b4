//! Error types for the HTTP service.
//!
//! Errors are rendered as small JSON bodies. Messages are generic and never
//! echo the caller's album URL.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inkframe_core::ResolveError;
use serde::Serialize;

/// Service error type.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The resolution pipeline failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The request named a device profile that does not exist.
    #[error("unknown device: {0}")]
    UnknownDevice(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: &'static str,
}

impl ServeError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Resolve(err) => match err {
                ResolveError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                ResolveError::AlbumNotFound | ResolveError::EmptyAlbum => StatusCode::NOT_FOUND,
                ResolveError::AlbumAccessDenied => StatusCode::FORBIDDEN,
                ResolveError::Transport(_) => StatusCode::BAD_GATEWAY,
                ResolveError::SecurityValidation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::UnknownDevice(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Resolve(err) => ErrorBody {
                error: err.kind(),
                message: err.user_message(),
            },
            Self::UnknownDevice(_) => ErrorBody {
                error: "unknown_device",
                message: "The requested device profile is not supported.",
            },
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        match &self {
            Self::Resolve(err @ ResolveError::SecurityValidation(_)) => {
                tracing::error!(error = %err, "security validation failure");
            }
            Self::Resolve(err @ ResolveError::Transport(_)) => {
                tracing::warn!(error = %err, "upstream album listing failed");
            }
            _ => {}
        }

        (self.status(), Json(self.body())).into_response()
    }
}
