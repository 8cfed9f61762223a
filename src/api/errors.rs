use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::{FieldErrors, ServiceError};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Validation(FieldErrors),
    TooManyRequests(&'static str),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(errors) => ApiError::Validation(errors),
            ServiceError::Forbidden => ApiError::Forbidden("Not allowed to access this resource"),
            ServiceError::NotFound(message) => ApiError::NotFound(message),
            ServiceError::Conflict(message) => ApiError::Conflict(message),
            ServiceError::Database(err) => ApiError::internal(err, "Database operation failed"),
        }
    }
}

fn respond(status: StatusCode, detail: String, errors: Option<FieldErrors>) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), detail, errors })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response = respond(StatusCode::UNAUTHORIZED, message.to_string(), None);
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                respond(StatusCode::FORBIDDEN, message.to_string(), None)
            }
            ApiError::BadRequest(message) => respond(StatusCode::BAD_REQUEST, message, None),
            ApiError::NotFound(message) => respond(StatusCode::NOT_FOUND, message, None),
            ApiError::Conflict(message) => respond(StatusCode::CONFLICT, message, None),
            ApiError::Validation(errors) => {
                let detail =
                    errors.first_message().unwrap_or("The given data was invalid.").to_string();
                respond(StatusCode::UNPROCESSABLE_ENTITY, detail, Some(errors))
            }
            ApiError::TooManyRequests(message) => {
                respond(StatusCode::TOO_MANY_REQUESTS, message.to_string(), None)
            }
            ApiError::Internal(message) => {
                respond(StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
        }
    }
}
