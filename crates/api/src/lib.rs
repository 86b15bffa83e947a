//! HTTP API server for the marketplace cart and checkout engine.
//!
//! Provides REST endpoints for cart editing, price quotes, checkout and
//! order lookup, with structured logging (tracing) and Prometheus metrics.
//! The caller's identity arrives in the `x-user-id` header.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use cart::{CartStore, InMemoryCartRepository};
use catalog::InMemoryCatalog;
use checkout::{CheckoutConfig, CheckoutOrchestrator, InMemoryOrderStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/cart",
            get(routes::carts::get).delete(routes::carts::clear),
        )
        .route("/cart/lines", post(routes::carts::add_line))
        .route(
            "/cart/lines/{id}",
            patch(routes::carts::update_quantity).delete(routes::carts::remove_line),
        )
        .route("/cart/quote", post(routes::carts::quote))
        .route("/checkout", post(routes::checkouts::place_order))
        .route("/orders", get(routes::orders::list))
        .route("/orders/{order_number}", get(routes::orders::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over an in-memory catalog, cart and order store.
pub fn create_default_state(catalog: InMemoryCatalog, config: CheckoutConfig) -> Arc<AppState> {
    let cart = CartStore::new(InMemoryCartRepository::new(), catalog.clone());
    let orders = InMemoryOrderStore::new(catalog.clone());

    Arc::new(AppState {
        checkout: CheckoutOrchestrator::new(cart, orders, config),
        catalog,
    })
}
