// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter traits for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::BidwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AttemptCommit, AttemptFilter, BidAttempt, BidCouponBalance, BidStats, CommitOutcome,
    ProductThreshold, UserSpending, UserSummary,
};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection setup, etc.).
    async fn initialize(&self) -> Result<(), BidwiseError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), BidwiseError>;
}

/// Persistence operations owned by the negotiation engine.
///
/// Implementations must make every method that writes atomic with respect to
/// concurrent callers: per-user rows and thresholds are inserted idempotently,
/// and [`NegotiationStore::commit_attempt`] is a single serializable unit.
#[async_trait]
pub trait NegotiationStore: StorageAdapter {
    // --- Per-user rows ---

    /// Insert-if-absent the spending and coupon rows for a user, then return both.
    ///
    /// New coupon rows start with `initial_free_bids` bid cards.
    async fn ensure_user(
        &self,
        user_id: &str,
        initial_free_bids: u32,
    ) -> Result<(UserSpending, BidCouponBalance), BidwiseError>;

    async fn get_user_spending(&self, user_id: &str) -> Result<Option<UserSpending>, BidwiseError>;

    /// Write a user's cumulative spend. Used by the order-completion collaborator.
    ///
    /// Fails with [`BidwiseError::InvalidRequest`] if `total_spent` would decrease.
    async fn upsert_user_spending(&self, spending: &UserSpending) -> Result<(), BidwiseError>;

    async fn get_coupon_balance(
        &self,
        user_id: &str,
    ) -> Result<Option<BidCouponBalance>, BidwiseError>;

    /// Add `count` bid cards to a user's balance, creating the row if needed.
    async fn grant_free_bids(
        &self,
        user_id: &str,
        count: u32,
        initial_free_bids: u32,
    ) -> Result<BidCouponBalance, BidwiseError>;

    /// Every known user with spend and bid-card columns, ordered by id.
    ///
    /// Users without a coupon row report `initial_free_bids` remaining.
    async fn list_users(&self, initial_free_bids: u32) -> Result<Vec<UserSummary>, BidwiseError>;

    // --- Product thresholds ---

    async fn get_threshold(&self, product_id: &str)
    -> Result<Option<ProductThreshold>, BidwiseError>;

    /// Persist `threshold` unless a row already exists, returning the stored row.
    ///
    /// Concurrent first writers converge on whichever row landed first.
    async fn get_or_insert_threshold(
        &self,
        threshold: &ProductThreshold,
    ) -> Result<ProductThreshold, BidwiseError>;

    /// Flag (`Some`) or unflag (`None`) a product for clearance pricing.
    ///
    /// Returns `None` if the product has no threshold row.
    async fn set_clearance(
        &self,
        product_id: &str,
        clearance_threshold: Option<i64>,
    ) -> Result<Option<ProductThreshold>, BidwiseError>;

    /// Every threshold row, newest first.
    async fn list_thresholds(&self) -> Result<Vec<ProductThreshold>, BidwiseError>;

    // --- Attempt ledger ---

    async fn count_attempts(&self, user_id: &str, product_id: &str) -> Result<u32, BidwiseError>;

    /// Atomically re-check the cap and quota, consume a coupon if applicable,
    /// and append the attempt row.
    async fn commit_attempt(&self, commit: &AttemptCommit) -> Result<CommitOutcome, BidwiseError>;

    /// List attempts newest first.
    async fn list_attempts(&self, filter: &AttemptFilter) -> Result<Vec<BidAttempt>, BidwiseError>;

    async fn bid_stats(&self) -> Result<BidStats, BidwiseError>;
}
