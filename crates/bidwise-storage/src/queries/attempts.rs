// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bid attempt ledger.
//!
//! Attempt rows are append-only. The attempt cap, the quota re-check, the
//! coupon decrement, and the insert all happen inside one `BEGIN IMMEDIATE`
//! transaction in [`commit_attempt`], so two concurrent bids from the same
//! user can never both take attempt N or both spend the last coupon.

use std::str::FromStr;

use bidwise_core::BidwiseError;
use bidwise_core::types::{
    AttemptCommit, AttemptFilter, BidAttempt, BidStats, BidStatus, CommitOutcome,
};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};

use crate::database::Database;

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<BidAttempt> {
    let status: String = row.get(4)?;
    let status = BidStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(BidAttempt {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        bid_amount: row.get(3)?,
        status,
        attempt_number: row.get(5)?,
        used_free_coupon: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Number of attempts a user has recorded against a product.
pub async fn count_attempts(
    db: &Database,
    user_id: &str,
    product_id: &str,
) -> Result<u32, BidwiseError> {
    let user_id = user_id.to_string();
    let product_id = product_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM bid_attempts WHERE user_id = ?1 AND product_id = ?2",
                params![user_id, product_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record one evaluated bid.
///
/// Re-checks the attempt cap and the quota against committed state, then
/// consumes a coupon when `coupon_requested` is set and the user has no spend
/// access. The decrement is conditional on a positive balance, so
/// `used_free_coupon` reflects whether a card was actually taken.
pub async fn commit_attempt(
    db: &Database,
    commit: &AttemptCommit,
) -> Result<CommitOutcome, BidwiseError> {
    let c = commit.clone();
    let id = uuid::Uuid::new_v4().to_string();
    let now = super::now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let attempts_used: u32 = tx.query_row(
                "SELECT COUNT(*) FROM bid_attempts WHERE user_id = ?1 AND product_id = ?2",
                params![c.user_id, c.product_id],
                |row| row.get(0),
            )?;
            if attempts_used >= c.max_attempts {
                return Ok(CommitOutcome::Exhausted { attempts_used });
            }

            let free_bids_remaining: u32 = tx
                .query_row(
                    "SELECT free_bids_remaining FROM bid_coupons WHERE user_id = ?1",
                    params![c.user_id],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(0);
            if !c.has_spend_access && free_bids_remaining == 0 {
                return Ok(CommitOutcome::QuotaDenied {
                    free_bids_remaining,
                });
            }

            let used_free_coupon = if c.coupon_requested && !c.has_spend_access {
                tx.execute(
                    "UPDATE bid_coupons
                     SET free_bids_remaining = free_bids_remaining - 1,
                         total_free_bids_used = total_free_bids_used + 1,
                         updated_at = ?2
                     WHERE user_id = ?1 AND free_bids_remaining > 0",
                    params![c.user_id, now],
                )? == 1
            } else {
                false
            };

            let attempt = BidAttempt {
                id,
                user_id: c.user_id,
                product_id: c.product_id,
                bid_amount: c.bid_amount,
                status: c.status,
                attempt_number: attempts_used + 1,
                used_free_coupon,
                created_at: now,
            };
            tx.execute(
                "INSERT INTO bid_attempts (id, user_id, product_id, bid_amount, status,
                     attempt_number, used_free_coupon, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    attempt.id,
                    attempt.user_id,
                    attempt.product_id,
                    attempt.bid_amount,
                    attempt.status.to_string(),
                    attempt.attempt_number,
                    attempt.used_free_coupon,
                    attempt.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(CommitOutcome::Recorded(attempt))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List attempts newest first, optionally filtered by user and/or product.
pub async fn list_attempts(
    db: &Database,
    filter: &AttemptFilter,
) -> Result<Vec<BidAttempt>, BidwiseError> {
    let filter = filter.clone();
    // SQLite treats a negative LIMIT as unbounded.
    let limit: i64 = filter.limit.map(i64::from).unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, product_id, bid_amount, status, attempt_number,
                        used_free_coupon, created_at
                 FROM bid_attempts
                 WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR product_id = ?2)
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(
                params![filter.user_id, filter.product_id, limit],
                attempt_from_row,
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate counters for the admin stats endpoint.
pub async fn bid_stats(db: &Database) -> Result<BidStats, BidwiseError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT
                     (SELECT COUNT(*) FROM bid_attempts),
                     (SELECT COUNT(*) FROM bid_attempts WHERE status = 'accepted'),
                     (SELECT COUNT(*) FROM bid_attempts WHERE status = 'rejected'),
                     (SELECT COUNT(*) FROM bid_attempts WHERE used_free_coupon = 1),
                     (SELECT COUNT(*) FROM product_thresholds),
                     (SELECT COUNT(*) FROM user_spending)",
                [],
                |row| {
                    let count = |idx: usize| row.get::<_, i64>(idx).map(|n| n.max(0) as u64);
                    Ok(BidStats {
                        total_bids: count(0)?,
                        accepted_bids: count(1)?,
                        rejected_bids: count(2)?,
                        coupons_used: count(3)?,
                        products_tracked: count(4)?,
                        users_tracked: count(5)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
