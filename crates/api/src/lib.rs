//! HTTP API for the pickup-point reception service.
//!
//! Exposes pickup point registration, the reception and product lifecycle,
//! the nested listing and account endpoints, with structured logging
//! (tracing) and request metrics.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route("/dummyLogin", post(routes::users::dummy_login))
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/pvz", post(routes::pvz::create).get(routes::pvz::list))
        .route(
            "/pvz/{pvz_id}/close_last_reception",
            post(routes::receptions::close_last),
        )
        .route(
            "/pvz/{pvz_id}/delete_last_product",
            post(routes::products::delete_last),
        )
        .route("/receptions", post(routes::receptions::create))
        .route("/products", post(routes::products::create))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
