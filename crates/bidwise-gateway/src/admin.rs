// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin handlers: ledger inspection, clearance flags, bid-card grants, and
//! the spending writes normally made by the order subsystem.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;

use bidwise_core::BidwiseError;
use bidwise_core::types::{
    AttemptFilter, BidAttempt, BidCouponBalance, BidStats, ProductThreshold, UserSpending,
    UserSummary,
};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidsQuery {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClearanceBody {
    #[serde(default)]
    pub clearance_threshold: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreeBidsBody {
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpendingBody {
    pub total_spent: f64,
    pub spend_level: u8,
}

fn invalid<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError(BidwiseError::InvalidRequest(e.to_string()))
}

/// GET /v1/admin/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Result<Json<BidStats>, ApiError> {
    Ok(Json(state.engine.stats().await?))
}

/// GET /v1/admin/bids?userId=&productId=&limit=
pub async fn get_bids(
    State(state): State<GatewayState>,
    query: Result<Query<BidsQuery>, QueryRejection>,
) -> Result<Json<Vec<BidAttempt>>, ApiError> {
    let Query(query) = query.map_err(|e| invalid(e.body_text()))?;
    let bids = state
        .engine
        .recent_bids(AttemptFilter {
            user_id: query.user_id,
            product_id: query.product_id,
            limit: query.limit,
        })
        .await?;
    Ok(Json(bids))
}

/// GET /v1/admin/thresholds
pub async fn get_thresholds(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<ProductThreshold>>, ApiError> {
    Ok(Json(state.engine.thresholds().await?))
}

/// PUT /v1/admin/thresholds/{product_id}/clearance
pub async fn put_clearance(
    State(state): State<GatewayState>,
    Path(product_id): Path<String>,
    body: Result<Json<ClearanceBody>, JsonRejection>,
) -> Result<Json<ProductThreshold>, ApiError> {
    let Json(body) = body.map_err(|e| invalid(e.body_text()))?;
    let updated = state
        .engine
        .set_clearance(&product_id, body.clearance_threshold)
        .await?;
    Ok(Json(updated))
}

/// GET /v1/admin/users
pub async fn get_users(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.engine.users().await?))
}

/// POST /v1/admin/users/{user_id}/free-bids
pub async fn post_free_bids(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    body: Result<Json<FreeBidsBody>, JsonRejection>,
) -> Result<Json<BidCouponBalance>, ApiError> {
    let Json(body) = body.map_err(|e| invalid(e.body_text()))?;
    Ok(Json(state.engine.grant_free_bids(&user_id, body.count).await?))
}

/// PUT /v1/admin/users/{user_id}/spending
pub async fn put_spending(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    body: Result<Json<SpendingBody>, JsonRejection>,
) -> Result<Json<UserSpending>, ApiError> {
    let Json(body) = body.map_err(|e| invalid(e.body_text()))?;
    let recorded = state
        .engine
        .record_spending(UserSpending {
            user_id,
            total_spent: body.total_spent,
            spend_level: body.spend_level,
        })
        .await?;
    Ok(Json(recorded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearance_body_accepts_null_and_missing() {
        let b: ClearanceBody = serde_json::from_str(r#"{"clearanceThreshold":null}"#).unwrap();
        assert_eq!(b.clearance_threshold, None);
        let b: ClearanceBody = serde_json::from_str("{}").unwrap();
        assert_eq!(b.clearance_threshold, None);
        let b: ClearanceBody = serde_json::from_str(r#"{"clearanceThreshold":6000}"#).unwrap();
        assert_eq!(b.clearance_threshold, Some(6000));
    }

    #[test]
    fn spending_body_rejects_unknown_fields() {
        assert!(
            serde_json::from_str::<SpendingBody>(r#"{"totalSpent":1,"spendLevel":0,"x":1}"#)
                .is_err()
        );
    }
}
