use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body shared by every failure response: `{"error": ..., "details": ...}`
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Missing required user data: {0}")]
    MissingField(String),
    #[error("Invalid request data: {0}")]
    InvalidData(String),
    #[error("User not found")]
    NotFound,
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Category string sent to the client in the `error` field.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::MissingField(_) => "Missing required user data",
            AppError::InvalidData(_) => "Invalid request data",
            AppError::NotFound => "User not found",
            AppError::Internal(_) => "Internal server error",
        }
    }

    pub fn details(&self) -> String {
        match self {
            AppError::Unauthorized(details)
            | AppError::MissingField(details)
            | AppError::InvalidData(details)
            | AppError::Internal(details) => details.clone(),
            AppError::NotFound => "No profile has been stored for this user".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::MissingField(_) | AppError::InvalidData(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.category().to_string(),
            details: self.details(),
        })
    }
}
