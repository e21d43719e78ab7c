// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Bidwise negotiation engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Machine-readable reason code attached to every failed or denied request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Unauthorized,
    CategoryExcluded,
    BelowPriceFloor,
    SpendRequired,
    MaxAttempts,
    InvalidRequest,
    NotFound,
    Internal,
}

/// The primary error type used across all Bidwise crates.
#[derive(Debug, Error)]
pub enum BidwiseError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The product's category is sold at a fixed price.
    #[error("products in category `{category}` do not support bidding")]
    IneligibleCategory { category: String },

    /// The product's price is below the negotiation floor.
    #[error("bidding is only available for products priced {floor} or above (got {price})")]
    IneligiblePrice { price: f64, floor: f64 },

    /// The user has no bid cards left and has not spent enough to unlock bidding.
    #[error(
        "spend at least {spend_required} more to unlock reverse bidding, or use a free bid card"
    )]
    QuotaExceeded {
        free_bids_remaining: u32,
        total_spent: f64,
        spend_required: f64,
    },

    /// The (user, product) pair has used every permitted attempt.
    #[error("maximum bid attempts ({max_attempts}) reached for this product")]
    AttemptsExhausted { attempts_used: u32, max_attempts: u32 },

    /// The request body failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BidwiseError {
    /// The reason code surfaced to clients alongside the message.
    pub fn reason(&self) -> RejectionReason {
        match self {
            BidwiseError::Unauthorized => RejectionReason::Unauthorized,
            BidwiseError::IneligibleCategory { .. } => RejectionReason::CategoryExcluded,
            BidwiseError::IneligiblePrice { .. } => RejectionReason::BelowPriceFloor,
            BidwiseError::QuotaExceeded { .. } => RejectionReason::SpendRequired,
            BidwiseError::AttemptsExhausted { .. } => RejectionReason::MaxAttempts,
            BidwiseError::InvalidRequest(_) => RejectionReason::InvalidRequest,
            BidwiseError::NotFound { .. } => RejectionReason::NotFound,
            BidwiseError::Config(_) | BidwiseError::Storage { .. } | BidwiseError::Internal(_) => {
                RejectionReason::Internal
            }
        }
    }

    /// Whether the whole request may be retried.
    ///
    /// Only transient infrastructure failures qualify; every business denial is
    /// permanent for the inputs that produced it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BidwiseError::Storage { .. } | BidwiseError::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_render_snake_case() {
        assert_eq!(RejectionReason::CategoryExcluded.to_string(), "category_excluded");
        assert_eq!(RejectionReason::BelowPriceFloor.to_string(), "below_price_floor");
        assert_eq!(RejectionReason::SpendRequired.to_string(), "spend_required");
        assert_eq!(RejectionReason::MaxAttempts.to_string(), "max_attempts");
        let json = serde_json::to_string(&RejectionReason::MaxAttempts).unwrap();
        assert_eq!(json, "\"max_attempts\"");
    }

    #[test]
    fn business_denials_are_not_retryable() {
        let denials = [
            BidwiseError::Unauthorized,
            BidwiseError::IneligibleCategory {
                category: "laptops".into(),
            },
            BidwiseError::AttemptsExhausted {
                attempts_used: 3,
                max_attempts: 3,
            },
        ];
        for err in &denials {
            assert!(!err.is_retryable(), "{err} should not be retryable");
        }
        assert!(BidwiseError::Internal("boom".into()).is_retryable());
    }

    #[test]
    fn error_maps_to_reason() {
        let err = BidwiseError::QuotaExceeded {
            free_bids_remaining: 0,
            total_spent: 500.0,
            spend_required: 2500.0,
        };
        assert_eq!(err.reason(), RejectionReason::SpendRequired);
        assert!(err.to_string().contains("2500"));
    }
}
