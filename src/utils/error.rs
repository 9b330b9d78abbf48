use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::payments::ProviderError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Webhook signature rejected: {0}")]
    SignatureInvalid(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Sold out: {0}")]
    SoldOut(String),

    #[error("No order for payment session: {0}")]
    OrderNotFound(String),

    #[error("Payment provider error")]
    PaymentProvider(#[from] ProviderError),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::SignatureInvalid(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SoldOut(_) => StatusCode::CONFLICT,
            AppError::OrderNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PaymentProvider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::SignatureInvalid(_) => "SIGNATURE_INVALID",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SoldOut(_) => "SOLD_OUT",
            AppError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            AppError::PaymentProvider(_) => "PAYMENT_PROVIDER_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::SignatureInvalid(msg)
            | AppError::NotFound(msg)
            | AppError::SoldOut(msg)
            | AppError::OrderNotFound(msg)
            | AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::PaymentProvider(e) => {
                error!(error = ?e, "Payment provider error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages to the client; upstream and
        // database details stay in the logs.
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::SignatureInvalid(msg)
            | AppError::NotFound(msg)
            | AppError::SoldOut(msg) => msg.clone(),
            AppError::OrderNotFound(_) => "Order lookup failed".to_string(),
            AppError::PaymentProvider(_) => "Payment provider request failed".to_string(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
        };

        error_response(code, public_message, None, status)
    }
}
