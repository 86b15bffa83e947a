//! Cart line and price quote endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use cart::{CartError, CartLine, CartRepository, ResolvedLine};
use common::{CartLineId, ProductId, UserId};
use pricing::PriceQuote;
use serde::{Deserialize, Serialize};

use super::{AppState, current_user, parse_line_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct AddLineRequest {
    pub product_id: String,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

#[derive(Deserialize, Default)]
pub struct QuoteRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub line_id: String,
    pub product_id: String,
    pub quantity: u32,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            line_id: line.id.to_string(),
            product_id: line.product_id.to_string(),
            quantity: line.quantity,
        }
    }
}

#[derive(Serialize)]
pub struct ResolvedLineResponse {
    pub line_id: String,
    pub product_id: String,
    pub product_name: String,
    pub store_id: String,
    pub store_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&ResolvedLine> for ResolvedLineResponse {
    fn from(line: &ResolvedLine) -> Self {
        Self {
            line_id: line.id().to_string(),
            product_id: line.product.id.to_string(),
            product_name: line.product.name.clone(),
            store_id: line.store.id.to_string(),
            store_name: line.store.name.clone(),
            quantity: line.quantity(),
            unit_price_cents: line.product.price.cents(),
            line_total_cents: line.line_total().cents(),
        }
    }
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub subtotal_cents: i64,
    pub coupon_code: Option<String>,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl From<&PriceQuote> for QuoteResponse {
    fn from(quote: &PriceQuote) -> Self {
        Self {
            subtotal_cents: quote.subtotal.cents(),
            coupon_code: quote.coupon_code().map(String::from),
            discount_cents: quote.discount.cents(),
            total_cents: quote.total.cents(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub lines: Vec<ResolvedLineResponse>,
    pub item_count: u64,
    pub quote: QuoteResponse,
}

// -- Handlers --

/// GET /cart: the caller's resolved lines with an uncouponed quote.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let user = current_user(&headers)?;
    let lines = state.checkout.cart().list_lines(&user).await?;
    let quote = PriceQuote::for_lines(&lines);

    Ok(Json(CartResponse {
        item_count: lines.iter().map(|l| u64::from(l.quantity())).sum(),
        lines: lines.iter().map(ResolvedLineResponse::from).collect(),
        quote: QuoteResponse::from(&quote),
    }))
}

/// POST /cart/lines: add a product with quantity 1.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_line(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>), ApiError> {
    let user = current_user(&headers)?;
    let product_id = ProductId::new(req.product_id);
    let line = state.checkout.cart().add_line(&user, &product_id).await?;

    Ok((StatusCode::CREATED, Json(CartLineResponse::from(&line))))
}

/// PATCH /cart/lines/{id}: set a line's quantity.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_quantity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartLineResponse>, ApiError> {
    let user = current_user(&headers)?;
    let line_id = parse_line_id(&id)?;
    owned_line(&state, &user, line_id).await?;

    let line = state
        .checkout
        .cart()
        .set_quantity(line_id, req.quantity)
        .await?;
    Ok(Json(CartLineResponse::from(&line)))
}

/// DELETE /cart/lines/{id}: remove a line. Removing a missing line succeeds.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_line(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = current_user(&headers)?;
    let line_id = parse_line_id(&id)?;

    match owned_line(&state, &user, line_id).await {
        Ok(_) => state.checkout.cart().remove_line(line_id).await?,
        Err(ApiError::Cart(CartError::LineNotFound(_))) => {}
        Err(err) => return Err(err),
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart: remove every line.
#[tracing::instrument(skip(state, headers))]
pub async fn clear(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user = current_user(&headers)?;
    state.checkout.cart().clear(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cart/quote: price the cart, optionally with a coupon.
#[tracing::instrument(skip(state, headers, req))]
pub async fn quote(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let user = current_user(&headers)?;
    let lines = state.checkout.cart().list_lines(&user).await?;
    let quote = quote_lines(&state, &lines, req.coupon_code.as_deref()).await?;
    Ok(Json(QuoteResponse::from(&quote)))
}

/// Prices `lines`, validating `coupon_code` when one is given.
pub(crate) async fn quote_lines(
    state: &AppState,
    lines: &[ResolvedLine],
    coupon_code: Option<&str>,
) -> Result<PriceQuote, ApiError> {
    let quote = PriceQuote::for_lines(lines);

    match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            let coupon = state
                .checkout
                .pricing()
                .apply_coupon(code, quote.subtotal)
                .await?;
            Ok(quote.with_coupon(coupon))
        }
        None => Ok(quote),
    }
}

/// Fetches a line, treating other users' lines as missing.
async fn owned_line(
    state: &AppState,
    user: &UserId,
    line_id: CartLineId,
) -> Result<CartLine, ApiError> {
    state
        .checkout
        .cart()
        .repository()
        .get_line(line_id)
        .await?
        .filter(|line| &line.user_id == user)
        .ok_or(ApiError::Cart(CartError::LineNotFound(line_id)))
}
