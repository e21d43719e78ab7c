// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for bid evaluation, collaborator reads, and public endpoints.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use bidwise_core::types::AuthIdentity;
use bidwise_core::{BidwiseError, HealthStatus, PluginAdapter};
use bidwise_negotiation::{AttemptSummary, BidDecision, BidRequest, EligibilityReport, QuotaStatus};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Successful bid evaluation body.
///
/// Rejected bids add `suggestedIncreases` and `attemptsRemaining`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    pub success: bool,
    pub accepted: bool,
    pub bid_price: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_increases: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
    pub attempts_used: u32,
    pub max_attempts: u32,
}

impl From<BidDecision> for BidResponse {
    fn from(d: BidDecision) -> Self {
        let rejected = !d.accepted;
        Self {
            success: true,
            accepted: d.accepted,
            bid_price: d.bid_price,
            message: d.message,
            suggested_increases: rejected.then_some(d.suggested_increases),
            attempts_remaining: rejected.then_some(d.attempts_remaining),
            attempts_used: d.attempts_used,
            max_attempts: d.max_attempts,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    pub category: String,
    pub price: f64,
}

/// POST /v1/bids/evaluate (also mounted at /bids/evaluate)
pub async fn post_evaluate_bid(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    body: Result<Json<BidRequest>, JsonRejection>,
) -> Result<Json<BidResponse>, ApiError> {
    let Json(request) =
        body.map_err(|e| BidwiseError::InvalidRequest(e.body_text()))?;
    let decision = state
        .engine
        .evaluate_bid(&identity.user_id, &request)
        .await?;
    Ok(Json(decision.into()))
}

/// GET /v1/bids/attempts/{product_id}
pub async fn get_attempts(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(product_id): Path<String>,
) -> Result<Json<AttemptSummary>, ApiError> {
    let summary = state
        .engine
        .attempt_count(&identity.user_id, &product_id)
        .await?;
    Ok(Json(summary))
}

/// GET /v1/bids/quota
pub async fn get_quota(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<QuotaStatus>, ApiError> {
    Ok(Json(state.engine.user_quota(&identity.user_id).await?))
}

/// GET /v1/products/eligibility?category=&price=
pub async fn get_eligibility(
    State(state): State<GatewayState>,
    query: Result<Query<EligibilityQuery>, QueryRejection>,
) -> Result<Json<EligibilityReport>, ApiError> {
    let Query(query) = query.map_err(|e| BidwiseError::InvalidRequest(e.body_text()))?;
    Ok(Json(state.engine.eligibility(&query.category, query.price)))
}

/// GET /health
///
/// Unauthenticated. Reports storage health; unhealthy storage answers 503.
pub async fn get_public_health(State(state): State<GatewayState>) -> Response {
    let (code, status) = match state.engine.store().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    };
    (code, Json(body)).into_response()
}

/// GET /metrics
///
/// Prometheus text format, or 404 when no recorder is wired.
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics not enabled").into_response(),
    }
}
