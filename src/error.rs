use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use compute::ComputeError;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::schemas::ErrorResponse;

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as an [`ErrorResponse`] with a stable `code`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    CampaignNotActive(String),

    #[error("{message}")]
    CapacityExceeded { message: String, remaining: Decimal },

    #[error("{0}")]
    ConcurrentUpdate(String),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("{0}")]
    InvalidStatusTransition(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidStatusTransition(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CampaignNotActive(_)
            | ApiError::CapacityExceeded { .. }
            | ApiError::ConcurrentUpdate(_)
            | ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::CampaignNotActive(_) => "CAMPAIGN_NOT_ACTIVE",
            ApiError::CapacityExceeded { .. } => "FUNDING_CAPACITY_EXCEEDED",
            ApiError::ConcurrentUpdate(_) => "CONCURRENT_UPDATE",
            ApiError::EmailTaken => "EMAIL_TAKEN",
            ApiError::InvalidStatusTransition(_) => "INVALID_STATUS_TRANSITION",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();

        let (message, remaining) = match self {
            ApiError::Database(db_error) => {
                error!("Database error: {}", db_error);
                ("Database operation failed".to_string(), None)
            }
            ApiError::Internal(reason) => {
                error!("Internal error: {}", reason);
                ("Internal server error".to_string(), None)
            }
            ApiError::CapacityExceeded { message, remaining } => (message, Some(remaining)),
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: message,
            code,
            success: false,
            remaining,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::Database(db_error) => ApiError::Database(db_error),
            ComputeError::InvalidAmount(_) => {
                ApiError::Validation(
                    "amount: must be greater than zero with at most two decimal places".to_string(),
                )
            }
            ComputeError::CampaignNotFound(_) => ApiError::NotFound("Campaign not found".to_string()),
            ComputeError::RestaurantNotFound(_) => {
                ApiError::NotFound("Restaurant not found".to_string())
            }
            ComputeError::CampaignNotActive { status, .. } => ApiError::CampaignNotActive(format!(
                "Campaign is not accepting investments (status: {status})"
            )),
            ComputeError::ExceedsCapacity { remaining, .. } => ApiError::CapacityExceeded {
                message: format!("Investment exceeds remaining funding needed: {remaining}"),
                remaining,
            },
            ComputeError::ConcurrentUpdate(_) => ApiError::ConcurrentUpdate(
                "Campaign was updated by another request, please retry".to_string(),
            ),
            ComputeError::NotOwner { .. } => {
                ApiError::Forbidden("You do not own this restaurant".to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, reasons.join(", "))
            })
            .collect();
        fields.sort();
        ApiError::Validation(fields.join("; "))
    }
}
