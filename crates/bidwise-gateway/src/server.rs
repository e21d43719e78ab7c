// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use bidwise_core::BidwiseError;
use bidwise_negotiation::NegotiationEngine;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::auth::{AuthState, admin_auth_middleware, user_auth_middleware};
use crate::handlers;

/// State for the unauthenticated health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<NegotiationEngine>,
    pub auth: AuthState,
    pub health: HealthState,
}

/// Listener address, taken from the `[server]` config section.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full route table.
///
/// - public: `GET /health`, `GET /metrics`
/// - user token: `POST /v1/bids/evaluate` (and `/bids/evaluate`),
///   `GET /v1/bids/attempts/{product_id}`, `GET /v1/bids/quota`,
///   `GET /v1/products/eligibility`
/// - admin token: everything under `/v1/admin`
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let user_routes = Router::new()
        .route("/v1/bids/evaluate", post(handlers::post_evaluate_bid))
        .route("/bids/evaluate", post(handlers::post_evaluate_bid))
        .route("/v1/bids/attempts/{product_id}", get(handlers::get_attempts))
        .route("/v1/bids/quota", get(handlers::get_quota))
        .route("/v1/products/eligibility", get(handlers::get_eligibility))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state.clone(),
            user_auth_middleware,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/v1/admin/stats", get(admin::get_stats))
        .route("/v1/admin/bids", get(admin::get_bids))
        .route("/v1/admin/thresholds", get(admin::get_thresholds))
        .route(
            "/v1/admin/thresholds/{product_id}/clearance",
            put(admin::put_clearance),
        )
        .route("/v1/admin/users", get(admin::get_users))
        .route(
            "/v1/admin/users/{user_id}/free-bids",
            post(admin::post_free_bids),
        )
        .route(
            "/v1/admin/users/{user_id}/spending",
            put(admin::put_spending),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            admin_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), BidwiseError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BidwiseError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BidwiseError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
