//! HTTP error responder.
//!
//! Failures are answered with a status code and a plain-text reason; there
//! is no JSON error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookapi_core::RepoError;
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::task::JoinError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Path id or JSON body could not be decoded.
    MalformedRequest(String),
    /// Body was sent without a JSON content type.
    UnsupportedMediaType(String),
    /// Persistence failed or the blocking worker died.
    StorageUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRequest(reason) | Self::UnsupportedMediaType(reason) => {
                write!(f, "{reason}")
            }
            Self::StorageUnavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_response module=http status=error http_status={} error={}",
                status.as_u16(),
                self
            );
        } else {
            warn!(
                "event=http_response module=http status=rejected http_status={} error={}",
                status.as_u16(),
                self
            );
        }
        (status, self.to_string()).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<JoinError> for ApiError {
    fn from(value: JoinError) -> Self {
        Self::StorageUnavailable(format!("blocking task failed: {value}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        if matches!(value, JsonRejection::MissingJsonContentType(_)) {
            Self::UnsupportedMediaType(value.body_text())
        } else {
            Self::MalformedRequest(value.body_text())
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::MalformedRequest(value.body_text())
    }
}
