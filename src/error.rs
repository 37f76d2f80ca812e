//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::middleware::current_request_id;

/// Failure reported by a [`Paginatable`](crate::api::Paginatable) collaborator.
#[derive(Debug, Error)]
pub enum PaginateError {
    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Pagination failed: {0}")]
    Paginate(#[from] PaginateError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Paginate(PaginateError::InvalidCriteria(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Paginate(PaginateError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Paginate(PaginateError::Other(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Paginate(PaginateError::InvalidCriteria(_)) => "INVALID_CRITERIA",
            Self::Paginate(_) => "PAGINATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) => msg.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Paginate(PaginateError::InvalidCriteria(msg)) => msg.clone(),
            Self::Paginate(PaginateError::Unavailable(_)) => {
                "The data source is temporarily unavailable".to_string()
            }
            // Don't leak internal error details
            Self::Paginate(PaginateError::Other(_)) | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Paginate(e) => {
                tracing::error!(error = %e, "Paginate collaborator failed");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
            request_id: current_request_id(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
