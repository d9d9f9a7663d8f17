//! HTTP API server for the kart order backend.
//!
//! Exposes the catalog and order placement under `/api` behind an API-key
//! gate, plus `/health` and Prometheus `/metrics`, with structured logging
//! (tracing) on every request.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use business::{OrderService, RequestContext};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{Catalog, CouponRegistry, OrderRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S>
where
    S: Catalog + CouponRegistry + OrderRepository,
{
    pub store: S,
    pub order_service: OrderService<S, S, S>,
    pub api_key: Arc<str>,
    pub request_timeout: Duration,
}

impl<S> AppState<S>
where
    S: Catalog + CouponRegistry + OrderRepository + Clone,
{
    /// Wires one store into every capability the handlers need.
    pub fn new(store: S, config: &Config) -> Self {
        let order_service = OrderService::new(store.clone(), store.clone(), store.clone());
        Self {
            store,
            order_service,
            api_key: Arc::from(config.api_key.as_str()),
            request_timeout: config.request_timeout,
        }
    }

    /// Context bounding the store calls made on behalf of one request.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}

async fn api_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router
where
    S: Catalog + CouponRegistry + OrderRepository + Clone + 'static,
{
    // Gate every /api path, matched or not.
    let api_router = Router::new()
        .route("/product", get(routes::products::list::<S>))
        .route("/product/{id}", get(routes::products::get::<S>))
        .route("/order", post(routes::orders::create::<S>))
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            auth::require_api_key,
        ))
        .with_state(state);

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
