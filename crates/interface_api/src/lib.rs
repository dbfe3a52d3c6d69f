//! HTTP API Layer
//!
//! This crate provides the REST API for the checkout payment core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: checkout submissions, state queries, processor webhooks
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses with localized messages
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, in_memory_state};
//!
//! let app = create_router(in_memory_state(config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod i18n;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_checkout::{CheckoutProcessor, InMemoryStateStore, MethodRegistry};
use domain_payment::{InMemoryPaymentStore, OrderRepository};

use crate::config::ApiConfig;
use crate::handlers::{checkout, health, webhook};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<CheckoutProcessor>,
    pub orders: Arc<dyn OrderRepository>,
    pub config: ApiConfig,
}

/// Builds app state backed by the in-memory stores
///
/// The server binary and the HTTP tests both wire up this way; a host
/// platform embedding the core supplies its own repository adapters.
pub fn in_memory_state(config: ApiConfig) -> AppState {
    let store = Arc::new(InMemoryPaymentStore::new());
    let processor = CheckoutProcessor::new(
        MethodRegistry::with_default_methods(),
        store.clone(),
        store.clone(),
        Arc::new(InMemoryStateStore::new()),
    );

    AppState {
        processor: Arc::new(processor),
        orders: store,
        config,
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let checkout_routes = Router::new()
        .route("/payments", post(checkout::record_payments))
        .route("/payments/:order_id", get(checkout::payment_states));

    let webhook_routes = Router::new().route("/stripe", post(webhook::stripe_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/checkout", checkout_routes)
        .nest("/api/v1/webhooks", webhook_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
