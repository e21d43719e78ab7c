// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter trait boundaries.
//!
//! Money fields that come straight from clients or the order subsystem
//! (`bid_amount`, `total_spent`) are `f64`; thresholds are always rounded to
//! whole currency units and stored as `i64`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Auth,
    Observability,
}

/// Coarse pricing-power classification of a product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

/// Outcome recorded on a bid attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Accepted,
    Rejected,
}

/// Per-product acceptance baseline, computed once at the first bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductThreshold {
    pub product_id: String,
    pub seller_cost: i64,
    pub base_threshold: i64,
    /// Absolute floor; no adjustment may go below it.
    pub min_safe_threshold: i64,
    pub demand_level: DemandLevel,
    pub is_clearance: bool,
    pub clearance_threshold: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Cumulative purchase spend for a user. Written by the order subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSpending {
    pub user_id: String,
    pub total_spent: f64,
    /// Loyalty tier in `0..=2`.
    pub spend_level: u8,
}

impl UserSpending {
    /// A fresh row for a user who has never purchased anything.
    pub fn new_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_spent: 0.0,
            spend_level: 0,
        }
    }
}

/// A user's remaining free negotiation allowances ("bid cards").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidCouponBalance {
    pub user_id: String,
    pub free_bids_remaining: u32,
    pub total_free_bids_used: u32,
}

/// Admin view of one user: spend tier joined with the bid-card balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub total_spent: f64,
    pub spend_level: u8,
    pub free_bids_remaining: u32,
    pub total_free_bids_used: u32,
}

/// One evaluated bid for a (user, product) pair. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAttempt {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub bid_amount: f64,
    pub status: BidStatus,
    /// 1-based and contiguous per (user, product).
    pub attempt_number: u32,
    pub used_free_coupon: bool,
    pub created_at: String,
}

/// Everything the store needs to append an attempt atomically.
///
/// The store re-checks the attempt cap and quota access inside the same
/// transaction that appends the row and consumes the coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptCommit {
    pub user_id: String,
    pub product_id: String,
    pub bid_amount: f64,
    pub status: BidStatus,
    /// The client asked to spend a bid card on this attempt.
    pub coupon_requested: bool,
    /// The user's spend already unlocks unlimited negotiation.
    pub has_spend_access: bool,
    pub max_attempts: u32,
}

/// Result of [`crate::NegotiationStore::commit_attempt`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The attempt row was appended (and a coupon consumed if flagged).
    Recorded(BidAttempt),
    /// The cap was already reached; nothing was written.
    Exhausted { attempts_used: u32 },
    /// No spend access and no bid cards left; nothing was written.
    QuotaDenied { free_bids_remaining: u32 },
}

/// Filter for listing bid attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptFilter {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub limit: Option<u32>,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidStats {
    pub total_bids: u64,
    pub accepted_bids: u64,
    pub rejected_bids: u64,
    pub coupons_used: u64,
    pub products_tracked: u64,
    pub users_tracked: u64,
}

/// Raw bearer credential presented by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(pub String);

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([redacted])")
    }
}

/// A verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user_id: String,
}
