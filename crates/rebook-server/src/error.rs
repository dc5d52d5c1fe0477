use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::AppointmentStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("business not found: {0}")]
    BusinessNotFound(Uuid),

    #[error("customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("rating out of range: {0}")]
    InvalidRating(i32),

    #[error("message delivery failed: {0}")]
    Gateway(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            Self::BusinessNotFound(_) => (StatusCode::NOT_FOUND, "business_not_found", None),
            Self::CustomerNotFound(_) => (StatusCode::NOT_FOUND, "customer_not_found", None),
            Self::AppointmentNotFound(_) => {
                (StatusCode::NOT_FOUND, "appointment_not_found", None)
            }
            Self::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                "invalid_transition",
                Some(serde_json::json!({ "from": from, "to": to })),
            ),
            Self::InvalidRating(_) => (StatusCode::BAD_REQUEST, "invalid_rating", None),
            Self::Gateway(_) => (StatusCode::BAD_GATEWAY, "gateway_failure", None),
            Self::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", None)
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", None),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None),
            Self::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error", None)
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
