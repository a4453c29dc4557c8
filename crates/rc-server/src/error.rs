//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`rc_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on core and stream errors.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use rc_stream::{ContentRange, StreamError};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub rc_core::Error);

impl AppError {
    pub fn new(inner: rc_core::Error) -> Self {
        Self(inner)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<rc_core::Error> for AppError {
    fn from(e: rc_core::Error) -> Self {
        Self::new(e)
    }
}

impl From<StreamError> for AppError {
    fn from(e: StreamError) -> Self {
        Self::new(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.0,
                "Server error in API handler"
            );
        }

        let code = match &self.0 {
            rc_core::Error::NotFound { .. } => "not_found",
            rc_core::Error::Validation(_) => "validation_error",
            rc_core::Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            rc_core::Error::Conflict(_) => "conflict",
            rc_core::Error::Database { .. } => "database_error",
            rc_core::Error::Io { .. } => "io_error",
            rc_core::Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.0.to_string(),
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();

        if let rc_core::Error::RangeNotSatisfiable { total, .. } = &self.0 {
            if let Ok(value) = HeaderValue::from_str(&ContentRange::unsatisfied(*total)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }

        response
    }
}
