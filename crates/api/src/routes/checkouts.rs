//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use cart::CartRepository;
use checkout::{CheckoutOutcome, CheckoutRequest, PaymentMethod, ShippingInfo};
use serde::{Deserialize, Serialize};

use super::carts::quote_lines;
use super::{AppState, current_user};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub shipping: ShippingInfo,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct PlaceOrderResponse {
    pub order_number: String,
    pub item_count: u64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub coupon_code: Option<String>,
    pub total_cents: i64,
    /// Post-order steps that did not complete. The order itself is placed.
    pub warnings: Vec<String>,
}

impl From<&CheckoutOutcome> for PlaceOrderResponse {
    fn from(outcome: &CheckoutOutcome) -> Self {
        let order = &outcome.order;
        Self {
            order_number: order.order_number().to_string(),
            item_count: order.item_count(),
            subtotal_cents: order.subtotal().cents(),
            discount_cents: order.discount().cents(),
            coupon_code: order.coupon_code().map(String::from),
            total_cents: order.total().cents(),
            warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// POST /checkout: place an order for the caller's current cart.
#[tracing::instrument(skip(state, headers, req))]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), ApiError> {
    let user = current_user(&headers)?;
    let cart = state.checkout.cart();

    let lines = cart.repository().lines_for_user(&user).await?;
    let coupon = match req.coupon_code.as_deref() {
        Some(code) => {
            let resolved = cart.resolve_all(lines.clone()).await?;
            quote_lines(&state, &resolved, Some(code)).await?.coupon
        }
        None => None,
    };

    let outcome = state
        .checkout
        .place_order(CheckoutRequest {
            user_id: user,
            lines,
            coupon,
            shipping: req.shipping,
            payment_method: PaymentMethod::new(req.payment_method),
            notes: req.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PlaceOrderResponse::from(&outcome))))
}
