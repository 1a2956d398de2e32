//! HTTP API server with observability for the hemline storefront.
//!
//! Provides REST endpoints for cart management, checkout and admin order
//! lifecycle operations, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use notifier::{LogTransport, Notifier, QueueNotifier};
use shop::{CartService, CheckoutService, LifecycleService};
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S, N> {
    pub carts: CartService<S>,
    pub checkout: CheckoutService<S, N>,
    pub lifecycle: LifecycleService<S>,
    pub store: S,
    pub notifier: N,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static, N: Notifier + Clone + 'static>(
    state: Arc<AppState<S, N>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::view::<S, N>))
        .route("/cart/items", post(routes::cart::add::<S, N>))
        .route("/cart/items/{id}", post(routes::cart::update::<S, N>))
        .route("/checkout", post(routes::checkout::place::<S, N>))
        .route("/orders", get(routes::orders::mine::<S, N>))
        .route("/admin/orders", get(routes::orders::list::<S, N>))
        .route("/admin/orders/{id}", get(routes::orders::detail::<S, N>))
        .route(
            "/admin/orders/{id}/status",
            post(routes::orders::update_status::<S, N>),
        )
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

/// Creates application state over the given store and notifier.
pub fn create_state<S: Store + Clone + 'static, N: Notifier + Clone + 'static>(
    store: S,
    notifier: N,
) -> Arc<AppState<S, N>> {
    Arc::new(AppState {
        carts: CartService::new(store.clone()),
        checkout: CheckoutService::new(store.clone(), notifier.clone()),
        lifecycle: LifecycleService::new(store.clone()),
        store,
        notifier,
    })
}

/// Creates the default application state: the given store plus a
/// queue-backed notifier that logs deliveries.
///
/// Must be called from within a tokio runtime (the notifier spawns its
/// dispatcher task).
pub fn create_default_state<S: Store + Clone + 'static>(
    store: S,
) -> Arc<AppState<S, QueueNotifier>> {
    create_state(store, QueueNotifier::spawn(LogTransport::new()))
}
