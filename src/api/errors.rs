use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::IdentityError;
use crate::domain::repositories::RepositoryError;
use crate::services::MediaError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Creates a 503 Service Unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));

        let mut response = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidEmail(_) | IdentityError::WeakPassword(_) => {
                Self::bad_request(error.to_string())
            }
            IdentityError::DuplicateEmail | IdentityError::DuplicateRole(_) => {
                Self::conflict(error.to_string())
            }
            IdentityError::InvalidCredentials => Self::unauthorized(error.to_string()),
            IdentityError::UserNotFound(_) | IdentityError::RoleNotFound(_) => {
                Self::not_found(error.to_string())
            }
            IdentityError::Hashing(_) | IdentityError::Repository(_) => {
                tracing::error!(error = %error, "identity operation failed");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(what) => Self::not_found(format!("Not found: {}", what)),
            RepositoryError::Duplicate(what) => Self::conflict(format!("Already exists: {}", what)),
            other => {
                tracing::error!(error = %other, "repository operation failed");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::NotConfigured => Self::service_unavailable(error.to_string()),
            MediaError::InvalidImage(_) => Self::bad_request(error.to_string()),
            MediaError::Storage(_) => {
                tracing::error!(error = %error, "image storage failed");
                Self::new(StatusCode::BAD_GATEWAY, "Image storage failed")
            }
        }
    }
}
