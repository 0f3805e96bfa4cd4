//! Error types for Rentrack server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    DbFailure = 3,
    NoSuchData = 5,
    InvalidState = 7,
    Duplicate = 8,
    BadValue = 18,
    NoActiveRental = 22,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("No active rental: {0}")]
    NoActiveRental(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl AppError {
    /// Error code reported alongside the message
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::InvalidState(_) => ErrorCode::InvalidState,
            AppError::NoActiveRental(_) => ErrorCode::NoActiveRental,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
        }
    }
}

// SQLSTATE codes that mean "someone else got there first"
const UNIQUE_VIOLATION: &str = "23505";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    let message = match db_err.constraint() {
                        Some("equipment_serial_number_key") => {
                            "Serial number is already registered".to_string()
                        }
                        Some("rentals_one_active_per_equipment") => {
                            "Equipment already has an active rental".to_string()
                        }
                        _ => db_err.message().to_string(),
                    };
                    return AppError::Conflict(message);
                }
                Some(LOCK_NOT_AVAILABLE) | Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    return AppError::Conflict(
                        "Equipment is being modified by another request, retry later".to_string(),
                    );
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NoActiveRental(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
