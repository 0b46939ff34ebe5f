//! HTTP API Layer
//!
//! This crate provides the REST API for the invoicing system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: thin request handlers delegating to `InvoiceService`
//! - **Middleware**: tracing and audit logging
//! - **DTOs**: validated request bodies and display-rounded responses
//! - **Error Handling**: domain errors mapped to consistent JSON responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let store = Arc::new(PostgresInvoiceAdapter::new(pool));
//! let app = create_router(store, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use domain_invoicing::{InvoiceService, InvoiceStorePort};

use crate::config::ApiConfig;
use crate::middleware::audit_middleware;
use crate::handlers::{health, invoices};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStorePort>,
    pub service: InvoiceService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `store` - Invoice persistence
/// * `config` - API configuration
pub fn create_router(store: Arc<dyn InvoiceStorePort>, config: ApiConfig) -> Router {
    let service = InvoiceService::new(store.clone()).with_max_attempts(config.allocation_max_attempts);
    let state = AppState {
        store,
        service,
        config,
    };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice).get(invoices::list_invoices))
        .route("/preview", post(invoices::preview_invoice))
        .route("/next-number", get(invoices::next_number))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id/payment", put(invoices::record_payment));

    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .route("/amount-in-words", get(invoices::amount_in_words))
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
