use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use infranodus_core::{NodusError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Error returned by REST handlers as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Nodus(#[from] NodusError),
    #[error("unknown stream: {0}")]
    UnknownStream(String),
    #[error("stream was cancelled: {0}")]
    Cancelled(String),
    #[error("{0}")]
    Stream(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Nodus(err.into())
    }
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Nodus(NodusError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Nodus(
                NodusError::RemoteApi { .. } | NodusError::UpstreamDomain(_) | NodusError::Decode(_),
            ) => StatusCode::BAD_GATEWAY,
            Self::Nodus(NodusError::StreamConflict(_)) | Self::Cancelled(_) => {
                StatusCode::CONFLICT
            }
            Self::Nodus(NodusError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Stream(_) => StatusCode::BAD_GATEWAY,
            Self::UnknownStream(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, %status, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
