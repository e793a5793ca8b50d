//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field validation messages, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<std::collections::BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fields: None,
        }
    }
}

/// Application error type for HTTP handlers.
///
/// Handlers usually intercept the recoverable service errors themselves
/// (flash + redirect, or a redisplayed form); what falls through here is
/// turned into a generic response.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Error bubbled up from the service layer
    Service(ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Service(err) => return service_error_response(err),
        };

        (status, Json(error)).into_response()
    }
}

fn service_error_response(err: ServiceError) -> Response {
    match err {
        ServiceError::InvalidRange(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("INVALID_RANGE", e.to_string())),
        )
            .into_response(),
        ServiceError::NotAvailable => (
            StatusCode::CONFLICT,
            Json(ApiError::new("NOT_AVAILABLE", "no availability")),
        )
            .into_response(),
        ServiceError::Validation(errors) => {
            let mut body = ApiError::new("VALIDATION", "form validation failed");
            body.fields = Some(errors.into_inner());
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
        // a handler that did not intercept this just sends the visitor back
        // to the start of the flow
        ServiceError::SessionStateMissing(_) => {
            Redirect::to("/search-availability").into_response()
        }
        ServiceError::Persistence(e) => repository_error_response(e),
    }
}

fn repository_error_response(err: RepositoryError) -> Response {
    if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("NOT_FOUND", err.to_string())),
        )
            .into_response()
    } else {
        tracing::error!("repository failure: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("REPOSITORY_ERROR", err.to_string())),
        )
            .into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Service(ServiceError::Persistence(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
