// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user spending and bid-card (free coupon) rows.

use bidwise_core::BidwiseError;
use bidwise_core::types::{BidCouponBalance, UserSpending, UserSummary};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::database::Database;

fn select_spending(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<UserSpending>> {
    conn.query_row(
        "SELECT user_id, total_spent, spend_level FROM user_spending WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(UserSpending {
                user_id: row.get(0)?,
                total_spent: row.get(1)?,
                spend_level: row.get(2)?,
            })
        },
    )
    .optional()
}

fn select_balance(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<BidCouponBalance>> {
    conn.query_row(
        "SELECT user_id, free_bids_remaining, total_free_bids_used
         FROM bid_coupons WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(BidCouponBalance {
                user_id: row.get(0)?,
                free_bids_remaining: row.get(1)?,
                total_free_bids_used: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Create the spending and coupon rows for a user if absent, returning both.
pub async fn ensure_user(
    db: &Database,
    user_id: &str,
    initial_free_bids: u32,
) -> Result<(UserSpending, BidCouponBalance), BidwiseError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO user_spending (user_id) VALUES (?1)
                 ON CONFLICT(user_id) DO NOTHING",
                params![user_id],
            )?;
            tx.execute(
                "INSERT INTO bid_coupons (user_id, free_bids_remaining) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO NOTHING",
                params![user_id, initial_free_bids],
            )?;
            let spending =
                select_spending(&tx, &user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            let balance =
                select_balance(&tx, &user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok((spending, balance))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user's spending row.
pub async fn get_user_spending(
    db: &Database,
    user_id: &str,
) -> Result<Option<UserSpending>, BidwiseError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| select_spending(conn, &user_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or raise a user's cumulative spend.
///
/// The stored total never decreases; a lower value is rejected with
/// [`BidwiseError::InvalidRequest`] and leaves the row untouched.
pub async fn upsert_user_spending(
    db: &Database,
    spending: &UserSpending,
) -> Result<(), BidwiseError> {
    let s = spending.clone();
    let now = super::now_timestamp();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_spending (user_id, total_spent, spend_level, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     total_spent = excluded.total_spent,
                     spend_level = excluded.spend_level,
                     updated_at = excluded.updated_at
                 WHERE excluded.total_spent >= user_spending.total_spent",
                params![s.user_id, s.total_spent, s.spend_level, now],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(BidwiseError::InvalidRequest(format!(
            "total spent for user '{}' cannot decrease",
            spending.user_id
        )));
    }
    Ok(())
}

/// Get a user's bid-card balance.
pub async fn get_coupon_balance(
    db: &Database,
    user_id: &str,
) -> Result<Option<BidCouponBalance>, BidwiseError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| select_balance(conn, &user_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add bid cards to a user's balance. A missing row starts from `initial_free_bids`.
///
/// A grant that would push the balance past `u32::MAX` fails with
/// [`BidwiseError::InvalidRequest`] and leaves the row untouched.
pub async fn grant_free_bids(
    db: &Database,
    user_id: &str,
    count: u32,
    initial_free_bids: u32,
) -> Result<BidCouponBalance, BidwiseError> {
    let owned_id = user_id.to_string();
    let now = super::now_timestamp();
    let granted = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let current = select_balance(&tx, &owned_id)?
                .map_or(initial_free_bids, |b| b.free_bids_remaining);
            let Some(total) = current.checked_add(count) else {
                return Ok(None);
            };
            tx.execute(
                "INSERT INTO bid_coupons (user_id, free_bids_remaining, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                     free_bids_remaining = excluded.free_bids_remaining,
                     updated_at = excluded.updated_at",
                params![owned_id, total, now],
            )?;
            let balance =
                select_balance(&tx, &owned_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(Some(balance))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    granted.ok_or_else(|| {
        BidwiseError::InvalidRequest(format!(
            "granting {count} bid cards would overflow the balance of user '{user_id}'"
        ))
    })
}

/// Every user that has a spending or coupon row, joined into one summary.
pub async fn list_users(
    db: &Database,
    initial_free_bids: u32,
) -> Result<Vec<UserSummary>, BidwiseError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "WITH ids AS (
                     SELECT user_id FROM user_spending
                     UNION
                     SELECT user_id FROM bid_coupons
                 )
                 SELECT ids.user_id,
                        COALESCE(s.total_spent, 0.0),
                        COALESCE(s.spend_level, 0),
                        COALESCE(c.free_bids_remaining, ?1),
                        COALESCE(c.total_free_bids_used, 0)
                 FROM ids
                 LEFT JOIN user_spending s ON s.user_id = ids.user_id
                 LEFT JOIN bid_coupons c ON c.user_id = ids.user_id
                 ORDER BY ids.user_id",
            )?;
            let rows = stmt.query_map(params![initial_free_bids], |row| {
                Ok(UserSummary {
                    user_id: row.get(0)?,
                    total_spent: row.get(1)?,
                    spend_level: row.get(2)?,
                    free_bids_remaining: row.get(3)?,
                    total_free_bids_used: row.get(4)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
