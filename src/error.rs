// HTTP API Error Types
use axum::{
    extract::rejection::BytesRejection,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError(FieldErrors),
    InvalidJson(String),
    InvalidHost(String),

    // 401 Unauthorized
    Unauthorized { message: String, code: &'static str },

    // 404 Not Found
    NotFound(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 415 Unsupported Media Type
    UnsupportedMediaType(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidHost(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError(_) => "Invalid input.",
            ApiError::InvalidJson(msg) => msg,
            ApiError::InvalidHost(msg) => msg,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::UnsupportedMediaType(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "invalid",
            ApiError::InvalidJson(_) => "parse_error",
            ApiError::InvalidHost(_) => "invalid_host",
            ApiError::Unauthorized { code, .. } => code,
            ApiError::NotFound(_) => "not_found",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::InternalServerError(_) => "error",
        }
    }

    /// Convert to JSON response body. Validation errors render as a bare
    /// field map; everything else as `{detail, code}`.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError(field_errors) => json!(field_errors),
            _ => json!({
                "detail": self.message(),
                "code": self.error_code()
            }),
        }
    }
}

impl ApiError {
    pub fn validation_error(field_errors: FieldErrors) -> Self {
        ApiError::ValidationError(field_errors)
    }

    /// Validation error on a single field.
    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.into(), vec![message.into()]);
        ApiError::ValidationError(field_errors)
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn invalid_host(host: &str) -> Self {
        ApiError::InvalidHost(format!(
            "Invalid HTTP_HOST header: '{}'. You may need to add it to APP_ALLOWED_HOSTS.",
            host
        ))
    }

    pub fn unauthorized(message: impl Into<String>, code: &'static str) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            code,
        }
    }

    pub fn not_authenticated() -> Self {
        Self::unauthorized("Authentication credentials were not provided.", "not_authenticated")
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }

    pub fn invalid_page() -> Self {
        ApiError::NotFound("Invalid page.".to_string())
    }

    pub fn unsupported_media_type(media_type: &str) -> Self {
        ApiError::UnsupportedMediaType(format!("Unsupported media type \"{}\" in request.", media_type))
    }

    /// Opaque 500; the cause must already have been logged.
    pub fn server_fault() -> Self {
        ApiError::InternalServerError("A server error occurred.".to_string())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::server_fault()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated => ApiError::not_authenticated(),
            AuthError::BadAuthorizationHeader => ApiError::unauthorized(
                "Authorization header must contain two space-delimited values",
                "bad_authorization_header",
            ),
            AuthError::InvalidToken(reason) => {
                tracing::debug!("Rejected token: {}", reason);
                ApiError::unauthorized("Given token not valid for any token type", "token_not_valid")
            }
            AuthError::InvalidRefreshToken(reason) => {
                tracing::debug!("Rejected refresh token: {}", reason);
                ApiError::unauthorized("Token is invalid or expired", "token_not_valid")
            }
            AuthError::InvalidCredentials => ApiError::unauthorized(
                "No active account found with the given credentials",
                "no_active_account",
            ),
            AuthError::UserNotFound => ApiError::unauthorized("User not found", "user_not_found"),
            AuthError::UserInactive => ApiError::unauthorized("User is inactive", "user_inactive"),
            AuthError::Database(e) => e.into(),
            AuthError::Internal(msg) => {
                tracing::error!("Authentication internal error: {}", msg);
                ApiError::server_fault()
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidPage(_) => ApiError::invalid_page(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Request body is too large.".to_string())
        } else {
            ApiError::invalid_json(format!("JSON parse error - {}", rejection.body_text()))
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let mut response = (status, Json(self.to_json())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"api\""),
            );
        }
        response
    }
}
