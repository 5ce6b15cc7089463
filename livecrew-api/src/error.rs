//! HTTP error mapping for livecrew-api

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use livecrew_common::Error;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned by every API handler
#[derive(Error, Debug)]
pub enum ApiError {
    /// Failure reported by the data layer
    #[error(transparent)]
    Domain(#[from] Error),

    /// Request body was not valid JSON for the endpoint
    #[error("Invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),

    /// Path parameter was not a valid id
    #[error("Invalid path: {}", .0.body_text())]
    Path(#[from] PathRejection),
}

/// Handler result alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Domain(Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Domain(Error::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(_) | ApiError::Path(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::NotFound("segment 1".into()), StatusCode::NOT_FOUND),
            (Error::InvalidInput("name".into()), StatusCode::BAD_REQUEST),
            (Error::Conflict("dup".into()), StatusCode::CONFLICT),
            (Error::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
