// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bid-card quota rules.
//!
//! A user may bid while holding at least one free bid card, or once their
//! cumulative spend unlocks bidding (tier 1+, or total spend at the unlock
//! amount). A card is only spent when the user asks for it and has no
//! spend-based access.

use bidwise_core::BidwiseError;
use bidwise_core::types::{BidCouponBalance, UserSpending};
use serde::Serialize;

/// Quota snapshot returned to clients rendering bid state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub free_bids_remaining: u32,
    pub total_spent: f64,
    pub spend_level: u8,
    pub has_spend_access: bool,
    pub can_bid: bool,
}

impl QuotaStatus {
    pub fn new(spending: &UserSpending, balance: &BidCouponBalance, unlock_amount: f64) -> Self {
        let has_spend_access = has_spend_access(spending, unlock_amount);
        Self {
            free_bids_remaining: balance.free_bids_remaining,
            total_spent: spending.total_spent,
            spend_level: spending.spend_level,
            has_spend_access,
            can_bid: has_spend_access || balance.free_bids_remaining > 0,
        }
    }
}

pub fn has_spend_access(spending: &UserSpending, unlock_amount: f64) -> bool {
    spending.spend_level >= 1 || spending.total_spent >= unlock_amount
}

/// How much more the user must spend to unlock bidding, never negative.
pub fn spend_required(total_spent: f64, unlock_amount: f64) -> f64 {
    (unlock_amount - total_spent).max(0.0)
}

/// Fail with [`BidwiseError::QuotaExceeded`] unless the user may bid.
pub fn check_access(
    spending: &UserSpending,
    balance: &BidCouponBalance,
    unlock_amount: f64,
) -> Result<QuotaStatus, BidwiseError> {
    let status = QuotaStatus::new(spending, balance, unlock_amount);
    if status.can_bid {
        Ok(status)
    } else {
        Err(BidwiseError::QuotaExceeded {
            free_bids_remaining: balance.free_bids_remaining,
            total_spent: spending.total_spent,
            spend_required: spend_required(spending.total_spent, unlock_amount),
        })
    }
}

/// Whether this bid should consume a free card.
pub fn should_consume(coupon_requested: bool, status: &QuotaStatus) -> bool {
    coupon_requested && !status.has_spend_access && status.free_bids_remaining > 0
}
