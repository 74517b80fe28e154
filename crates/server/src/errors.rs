use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// Problem-style error body used by the admin endpoints.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.title,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = service_error_status(&e);
        let title = match status {
            StatusCode::BAD_REQUEST => "Validation Error",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            _ => "Internal Server Error",
        };
        JsonApiError::new(status, title, Some(e.to_string()))
    }
}

/// HTTP status for a service-layer failure.
pub fn service_error_status(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Db(_) | ServiceError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a service failure into the plain tuple style used by most handlers.
pub fn to_tuple(e: ServiceError) -> (StatusCode, String) {
    let status = service_error_status(&e);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "internal service error");
    }
    (status, e.to_string())
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl IntoResponse for StartupError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let msg = self.to_string();
        error!(error = %msg, "startup error");
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
