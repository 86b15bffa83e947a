//! Order lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use checkout::{Order, OrderItem, OrderNumber, OrderStore, ShippingInfo};
use serde::Serialize;

use super::{AppState, current_user};
use crate::error::ApiError;

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_number: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub coupon_code: Option<String>,
    pub total_cents: i64,
    pub payment_method: String,
    pub shipping: ShippingInfo,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub store_id: String,
    pub store_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            product_name: item.product_name.clone(),
            store_id: item.store_id.to_string(),
            store_name: item.store_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            line_total_cents: item.line_total.cents(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number().to_string(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            subtotal_cents: order.subtotal().cents(),
            discount_cents: order.discount().cents(),
            coupon_code: order.coupon_code().map(String::from),
            total_cents: order.total().cents(),
            payment_method: order.payment_method().to_string(),
            shipping: order.shipping().clone(),
            notes: order.notes().map(String::from),
            created_at: order.created_at(),
        }
    }
}

/// GET /orders: the caller's orders, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let user = current_user(&headers)?;
    let orders = state.checkout.orders().orders_for_user(&user).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{order_number}: one of the caller's orders.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let user = current_user(&headers)?;
    let order = state
        .checkout
        .orders()
        .get_order(&OrderNumber::new(order_number.as_str()))
        .await?
        .filter(|o| o.user_id() == &user)
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_number} not found")))?;

    Ok(Json(OrderResponse::from(&order)))
}
