// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::enrichment::EnrichmentError;

/// Every failure the request pipeline can raise. The `IntoResponse` impl below
/// is the single place where a failure becomes a status code and JSON body.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - validation gate, malformed input
    BadRequest(String),

    // 401 Unauthorized - missing, invalid or insufficient credential
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 413 - request body over the configured cap
    PayloadTooLarge(String),

    // 500 - the image lookup failed
    Enrichment(String),

    // 500 - required server configuration is missing
    InternalConfig(String),

    // 500 - persistence errors passed through as-is
    Unclassified(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Enrichment(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::Enrichment(msg) => msg,
            ApiError::InternalConfig(msg) => msg,
            ApiError::Unclassified(msg) => msg,
        }
    }

    /// Convert to JSON response body. `stack` is dropped in production.
    pub fn to_json(&self, include_stack: bool) -> Value {
        let mut body = json!({ "message": self.message() });
        if include_stack {
            body["stack"] = json!(format!("{:?}", self));
        }
        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn enrichment(message: impl Into<String>) -> Self {
        ApiError::Enrichment(message.into())
    }

    pub fn internal_config(message: impl Into<String>) -> Self {
        ApiError::InternalConfig(message.into())
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        ApiError::Unclassified(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Schema and uniqueness violations keep their message, like any
            // other persistence error that reaches the client unnormalized
            StoreError::Invalid(msg) => ApiError::unclassified(msg),
            StoreError::Duplicate(field) => {
                ApiError::unclassified(format!("Duplicate value for unique field '{}'", field))
            }
            StoreError::Decode(msg) => {
                tracing::error!("Stored document failed to decode: {}", msg);
                ApiError::unclassified("Stored document is malformed")
            }
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::unclassified("Database error occurred")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSecret => ApiError::internal_config("JWT secret not set"),
            AuthError::Hashing(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                ApiError::unclassified("Password hashing failed")
            }
            AuthError::InvalidToken(msg) => {
                // Verification detail stays in the log
                tracing::warn!("Token rejected: {}", msg);
                ApiError::unauthorized("Not authorized")
            }
            AuthError::TokenGeneration(msg) => {
                tracing::error!("Token generation failed: {}", msg);
                ApiError::unclassified("Token generation failed")
            }
        }
    }
}

impl From<EnrichmentError> for ApiError {
    fn from(err: EnrichmentError) -> Self {
        tracing::warn!("Image lookup failed: {}", err);
        ApiError::enrichment("Error fetching image from Wikipedia")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

/// Debug detail riding on an error response. The body carries only the
/// message; [`crate::middleware::report_errors`] adds `stack` outside
/// production.
#[derive(Debug, Clone)]
pub struct ErrorStack {
    pub message: String,
    pub stack: String,
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code(), Json(self.to_json(false))).into_response();
        response.extensions_mut().insert(ErrorStack {
            message: self.message().to_string(),
            stack: format!("{:?}", self),
        });
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
