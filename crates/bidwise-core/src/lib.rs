// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Bidwise reverse-bidding negotiation engine.
//!
//! This crate provides the error taxonomy, the persisted domain types, and the
//! adapter traits that the storage, gateway, and negotiation crates share.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BidwiseError, RejectionReason};
pub use types::{
    AdapterType, AttemptCommit, AttemptFilter, AuthIdentity, AuthToken, BidAttempt,
    BidCouponBalance, BidStats, BidStatus, CommitOutcome, DemandLevel, HealthStatus,
    ProductThreshold, UserSpending, UserSummary,
};

// Re-export all adapter traits at crate root.
pub use traits::{AuthAdapter, NegotiationStore, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidwise_error_has_all_variants() {
        let _config = BidwiseError::Config("test".into());
        let _storage = BidwiseError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _unauthorized = BidwiseError::Unauthorized;
        let _category = BidwiseError::IneligibleCategory {
            category: "mobiles".into(),
        };
        let _price = BidwiseError::IneligiblePrice {
            price: 999.0,
            floor: 1000.0,
        };
        let _quota = BidwiseError::QuotaExceeded {
            free_bids_remaining: 0,
            total_spent: 500.0,
            spend_required: 2500.0,
        };
        let _exhausted = BidwiseError::AttemptsExhausted {
            attempts_used: 3,
            max_attempts: 3,
        };
        let _invalid = BidwiseError::InvalidRequest("bad".into());
        let _not_found = BidwiseError::NotFound {
            kind: "product threshold".into(),
            id: "p-1".into(),
        };
        let _internal = BidwiseError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Storage,
            AdapterType::Auth,
            AdapterType::Observability,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_negotiation_store<T: NegotiationStore>() {}
        fn _assert_auth_adapter<T: AuthAdapter>() {}
    }
}
