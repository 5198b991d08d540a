//! Error types for the attendance server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::geo::GeofenceAction;

/// Numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    BadValue = 5,
    Duplicate = 6,
    AlreadyCheckedIn = 10,
    NoActiveSession = 11,
    OutOfRange = 12,
    InvalidOffice = 13,
    InvalidState = 14,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("You are already checked in today")]
    AlreadyCheckedIn,

    #[error("No active attendance found for today")]
    NoActiveSession,

    #[error(
        "You are {}m away from the office. Please move closer (within {radius}m) to {action}.",
        .distance.round()
    )]
    OutOfRange {
        distance: f64,
        radius: i32,
        action: GeofenceAction,
    },

    #[error("Invalid office: {0}")]
    InvalidOffice(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Live distance from the office, set for out-of-range rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<i32>,
    /// Admission radius of the office, set for out-of-range rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<i32>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::AlreadyCheckedIn => (StatusCode::CONFLICT, ErrorCode::AlreadyCheckedIn),
            AppError::NoActiveSession => (StatusCode::CONFLICT, ErrorCode::NoActiveSession),
            AppError::OutOfRange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::OutOfRange)
            }
            AppError::InvalidOffice(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidOffice)
            }
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::InvalidState(_) => (StatusCode::CONFLICT, ErrorCode::InvalidState),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::InvalidOffice(msg) => {
                tracing::warn!("Office configuration error: {}", msg);
                "The selected office is not available for attendance".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidState(msg) => msg.clone(),
            other => other.to_string(),
        };

        let (distance_meters, radius_meters) = match &self {
            AppError::OutOfRange {
                distance, radius, ..
            } => {
                (Some(crate::geo::round_meters(*distance)), Some(*radius))
            }
            _ => (None, None),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            distance_meters,
            radius_meters,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
