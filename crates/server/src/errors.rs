use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use client::ClientError;
use service::errors::ServiceError;
use tracing::error;

/// JSON problem response: `{"error": <title>, "detail": <detail>}`.
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

    pub fn upstream(err: ClientError) -> Self {
        error!(err = %err, "web api request failed");
        Self::new(StatusCode::BAD_GATEWAY, "Upstream Error", Some(err.to_string()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Validation(_) | ServiceError::Model(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(err.to_string()))
            }
            ServiceError::AlreadyExists(_) | ServiceError::AlreadyAdded(_) => {
                Self::new(StatusCode::CONFLICT, "Duplicate Entry", Some(err.to_string()))
            }
            ServiceError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", Some(err.to_string()))
            }
            ServiceError::PageOutOfRange { .. } => {
                error!(err = %err, "page index escaped clamping");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Pagination Error", Some(err.to_string()))
            }
        }
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
