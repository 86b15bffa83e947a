//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::CheckoutError;
use common::StoreError;
use pricing::PricingError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No resolved user identity on the request.
    #[error("Missing or invalid x-user-id header")]
    Unauthorized,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Cart(err) => cart_status(err),
            ApiError::Pricing(err) => pricing_status(err),
            ApiError::Checkout(err) => checkout_status(err),
            ApiError::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-facing message. Wrapped errors surface their innermost message.
    fn message(&self) -> String {
        match self {
            ApiError::Checkout(CheckoutError::Cart(err)) => err.to_string(),
            ApiError::Checkout(CheckoutError::Pricing(err)) => err.to_string(),
            other => other.to_string(),
        }
    }
}

fn cart_status(err: &CartError) -> StatusCode {
    match err {
        CartError::ProductNotFound(_) | CartError::LineNotFound(_) => StatusCode::NOT_FOUND,
        CartError::InvalidQuantity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CartError::InsufficientStock { .. } => StatusCode::CONFLICT,
        CartError::Store(_) => StatusCode::BAD_GATEWAY,
    }
}

fn pricing_status(err: &PricingError) -> StatusCode {
    if err.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::InvalidShippingInfo { .. }
        | CheckoutError::MissingPaymentMethod
        | CheckoutError::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Cart(err) => cart_status(err),
        CheckoutError::Pricing(err) => pricing_status(err),
        CheckoutError::OrderCreationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(error = %message, %status, "request failed");
        } else {
            tracing::debug!(error = %message, %status, "request rejected");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
