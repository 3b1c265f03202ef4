//! HTTP rendering of domain errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use checkin_core::Error;

/// Body of every error response. The kiosk page displays `message`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(Error::Unauthorized(message.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(Error::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) | Error::NotRegistered(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Expired(_) => StatusCode::GONE,
            Error::InvalidVersion { .. } | Error::InvalidFormat(_) | Error::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Notification(_) => StatusCode::BAD_GATEWAY,
            Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                kind: self.0.kind(),
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
