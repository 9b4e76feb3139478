use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    // Database errors
    Database(sqlx::Error),
    DatabaseError(String), // String-based database error

    // Authentication errors
    Unauthorized(String),
    InvalidToken,
    TokenExpired,

    // Tenant isolation errors
    TenantMismatch { expected: String, actual: String },
    InvalidTenantSchema(String),

    // Validation errors
    ValidationError(String),

    // Business logic errors
    NotFound(String),
    Conflict(String),
    InvariantViolation(String),
    ConcurrentModification(String),

    // External collaborator errors
    ExternalService(String),

    // Internal errors
    InternalError(String),
    ConfigError(String),
    ServiceUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidToken => write!(f, "Invalid token"),
            AppError::TokenExpired => write!(f, "Token expired"),
            AppError::TenantMismatch { expected, actual } => {
                write!(f, "Tenant mismatch: context {} vs command {}", expected, actual)
            },
            AppError::InvalidTenantSchema(name) => {
                write!(f, "Invalid tenant schema name: {}", name)
            },
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            AppError::ConcurrentModification(msg) => {
                write!(f, "Concurrent modification: {}", msg)
            },
            AppError::ExternalService(msg) => write!(f, "External service error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    "DATABASE_ERROR",
                )
            },
            AppError::DatabaseError(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    "DATABASE_ERROR",
                )
            },
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, msg.clone(), "UNAUTHORIZED")
            },
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string(), "INVALID_TOKEN"),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, self.to_string(), "TOKEN_EXPIRED"),
            AppError::TenantMismatch { .. } => {
                tracing::error!("{}", self);
                (StatusCode::FORBIDDEN, "Tenant mismatch".to_string(), "TENANT_MISMATCH")
            },
            AppError::InvalidTenantSchema(ref name) => {
                tracing::error!("Invalid tenant schema name: {}", name);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Tenant schema error".to_string(),
                    "TENANT_SCHEMA_ERROR",
                )
            },
            AppError::ValidationError(ref msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), "VALIDATION_ERROR")
            },
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), "NOT_FOUND"),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), "CONFLICT"),
            AppError::InvariantViolation(ref msg) => {
                (StatusCode::CONFLICT, msg.clone(), "INVARIANT_VIOLATION")
            },
            AppError::ConcurrentModification(ref msg) => {
                (StatusCode::CONFLICT, msg.clone(), "CONCURRENT_MODIFICATION")
            },
            AppError::ExternalService(ref msg) => {
                tracing::warn!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "External service error".to_string(), "EXTERNAL_ERROR")
            },
            AppError::InternalError(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                    "INTERNAL_ERROR",
                )
            },
            AppError::ConfigError(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    "CONFIG_ERROR",
                )
            },
            AppError::ServiceUnavailable(ref msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone(), "SERVICE_UNAVAILABLE")
            },
        };

        let body = Json(json!({
            "error": error_message,
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

// From implementations for common error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("Serialization failed: {}", err))
    }
}
