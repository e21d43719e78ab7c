// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bid evaluation entry point.
//!
//! [`NegotiationEngine::evaluate_bid`] runs eligibility, quota, attempt cap,
//! and threshold pricing, then hands the decision to
//! [`NegotiationStore::commit_attempt`], which re-checks the cap and quota
//! and records the attempt (and any coupon spend) in one transaction. A bid
//! that loses a race at commit time is reported exactly as if it had been
//! refused up front.

use std::sync::Arc;
#[cfg(feature = "prometheus")]
use std::time::Instant;

use bidwise_config::model::NegotiationConfig;
use bidwise_core::types::{
    AttemptCommit, AttemptFilter, BidAttempt, BidCouponBalance, BidStats, BidStatus,
    CommitOutcome, ProductThreshold, UserSpending, UserSummary,
};
use bidwise_core::{BidwiseError, NegotiationStore};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::eligibility::{EligibilityFilter, EligibilityReport};
use crate::pricing::{ThresholdParts, final_threshold};
use crate::quota::{self, QuotaStatus};

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;
const MAX_SPEND_LEVEL: u8 = 2;

/// A buyer's proposed price for one product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRequest {
    pub product_id: String,
    pub bid_amount: f64,
    pub product_category: String,
    pub product_price: f64,
    pub product_original_price: f64,
    #[serde(default, alias = "useFreeCopon")]
    pub use_free_coupon: bool,
}

impl BidRequest {
    /// Reject malformed input before any state is read.
    pub fn validate(&self) -> Result<(), BidwiseError> {
        if self.product_id.trim().is_empty() {
            return Err(BidwiseError::InvalidRequest("productId must not be empty".into()));
        }
        if self.product_category.trim().is_empty() {
            return Err(BidwiseError::InvalidRequest(
                "productCategory must not be empty".into(),
            ));
        }
        for (field, value) in [
            ("bidAmount", self.bid_amount),
            ("productPrice", self.product_price),
            ("productOriginalPrice", self.product_original_price),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BidwiseError::InvalidRequest(format!(
                    "{field} must be a positive number"
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of an evaluated (and recorded) bid.
#[derive(Debug, Clone, PartialEq)]
pub struct BidDecision {
    pub accepted: bool,
    pub bid_price: f64,
    /// Minimum acceptable bid for this user. Not exposed to clients.
    pub final_threshold: i64,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub attempts_remaining: u32,
    /// Empty when accepted; never empty when rejected.
    pub suggested_increases: Vec<u32>,
    pub used_free_coupon: bool,
    pub message: String,
}

/// Attempt usage for one (user, product) pair.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub product_id: String,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub attempts_remaining: u32,
}

/// Composes eligibility, quota, pricing, and the attempt ledger.
pub struct NegotiationEngine {
    store: Arc<dyn NegotiationStore>,
    config: NegotiationConfig,
    eligibility: EligibilityFilter,
}

impl NegotiationEngine {
    pub fn new(store: Arc<dyn NegotiationStore>, config: NegotiationConfig) -> Self {
        let eligibility = EligibilityFilter::new(&config);
        Self {
            store,
            config,
            eligibility,
        }
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn NegotiationStore> {
        &self.store
    }

    /// Evaluate and record one bid from an authenticated user.
    ///
    /// Every refusal is returned as a typed [`BidwiseError`] carrying a reason
    /// code; an evaluated bid (accepted or rejected) is `Ok`.
    pub async fn evaluate_bid(
        &self,
        user_id: &str,
        request: &BidRequest,
    ) -> Result<BidDecision, BidwiseError> {
        #[cfg(feature = "prometheus")]
        let start = Instant::now();
        let result = self.evaluate(user_id, request).await;
        #[cfg(feature = "prometheus")]
        bidwise_prometheus::record_evaluation_latency(start.elapsed().as_secs_f64());

        match &result {
            #[cfg(feature = "prometheus")]
            Ok(decision) => {
                let outcome = if decision.accepted { "accepted" } else { "rejected" };
                bidwise_prometheus::record_bid(outcome);
                if decision.used_free_coupon {
                    bidwise_prometheus::record_coupon_consumed();
                }
            }
            #[cfg(not(feature = "prometheus"))]
            Ok(_) => {}
            Err(e) if e.is_retryable() => {
                warn!(user_id, product_id = %request.product_id, error = %e, "bid evaluation failed");
            }
            Err(e) => {
                let reason = e.reason().to_string();
                #[cfg(feature = "prometheus")]
                bidwise_prometheus::record_denial(&reason);
                info!(user_id, product_id = %request.product_id, reason = %reason, "bid refused");
            }
        }
        result
    }

    async fn evaluate(
        &self,
        user_id: &str,
        request: &BidRequest,
    ) -> Result<BidDecision, BidwiseError> {
        if user_id.trim().is_empty() {
            return Err(BidwiseError::Unauthorized);
        }
        request.validate()?;
        self.eligibility
            .check(&request.product_category, request.product_price)?;

        let (spending, balance) = self
            .store
            .ensure_user(user_id, self.config.initial_free_bids)
            .await?;
        let status = quota::check_access(&spending, &balance, self.config.spend_unlock_amount)?;

        let max_attempts = self.config.max_attempts;
        let attempts_used = self
            .store
            .count_attempts(user_id, &request.product_id)
            .await?;
        if attempts_used >= max_attempts {
            return Err(BidwiseError::AttemptsExhausted {
                attempts_used,
                max_attempts,
            });
        }

        let threshold = self.load_threshold(request).await?;
        let final_threshold = final_threshold(&threshold, &spending);
        let accepted = request.bid_amount >= final_threshold as f64;
        debug!(
            user_id,
            product_id = %request.product_id,
            base_threshold = threshold.base_threshold,
            min_safe_threshold = threshold.min_safe_threshold,
            demand_level = %threshold.demand_level,
            spend_level = spending.spend_level,
            final_threshold,
            "threshold computed"
        );

        let commit = AttemptCommit {
            user_id: user_id.to_string(),
            product_id: request.product_id.clone(),
            bid_amount: request.bid_amount,
            status: if accepted {
                BidStatus::Accepted
            } else {
                BidStatus::Rejected
            },
            coupon_requested: quota::should_consume(request.use_free_coupon, &status),
            has_spend_access: status.has_spend_access,
            max_attempts,
        };

        let attempt = match self.store.commit_attempt(&commit).await? {
            CommitOutcome::Recorded(attempt) => attempt,
            CommitOutcome::Exhausted { attempts_used } => {
                return Err(BidwiseError::AttemptsExhausted {
                    attempts_used,
                    max_attempts,
                });
            }
            CommitOutcome::QuotaDenied {
                free_bids_remaining,
            } => {
                return Err(BidwiseError::QuotaExceeded {
                    free_bids_remaining,
                    total_spent: spending.total_spent,
                    spend_required: quota::spend_required(
                        spending.total_spent,
                        self.config.spend_unlock_amount,
                    ),
                });
            }
        };

        info!(
            user_id,
            product_id = %request.product_id,
            bid_amount = request.bid_amount,
            final_threshold,
            attempt_number = attempt.attempt_number,
            accepted,
            used_free_coupon = attempt.used_free_coupon,
            "bid evaluated"
        );

        Ok(self.decision(request.bid_amount, final_threshold, &attempt))
    }

    /// Read the product's stored threshold, or compute and persist it on first bid.
    async fn load_threshold(&self, request: &BidRequest) -> Result<ProductThreshold, BidwiseError> {
        if let Some(existing) = self.store.get_threshold(&request.product_id).await? {
            return Ok(existing);
        }
        let now = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string();
        let fresh = ThresholdParts::compute(request.product_price, request.product_original_price)
            .into_threshold(&request.product_id, &now);
        let stored = self.store.get_or_insert_threshold(&fresh).await?;
        debug!(product_id = %stored.product_id, "product threshold initialized");
        Ok(stored)
    }

    fn decision(&self, bid_amount: f64, final_threshold: i64, attempt: &BidAttempt) -> BidDecision {
        let max_attempts = self.config.max_attempts;
        let attempts_used = attempt.attempt_number;
        let accepted = attempt.status == BidStatus::Accepted;
        let (suggested_increases, message) = if accepted {
            (
                Vec::new(),
                format!(
                    "Congratulations! Your bid of {} has been accepted!",
                    format_amount(bid_amount)
                ),
            )
        } else {
            (
                self.config.suggested_increases.clone(),
                "Your bid is too low. Try a slightly higher amount.".to_string(),
            )
        };
        BidDecision {
            accepted,
            bid_price: bid_amount,
            final_threshold,
            attempts_used,
            max_attempts,
            attempts_remaining: max_attempts.saturating_sub(attempts_used),
            suggested_increases,
            used_free_coupon: attempt.used_free_coupon,
            message,
        }
    }

    // --- Collaborator reads ---

    /// Attempts used by `user_id` on `product_id`.
    pub async fn attempt_count(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<AttemptSummary, BidwiseError> {
        let attempts_used = self.store.count_attempts(user_id, product_id).await?;
        let max_attempts = self.config.max_attempts;
        Ok(AttemptSummary {
            product_id: product_id.to_string(),
            attempts_used,
            max_attempts,
            attempts_remaining: max_attempts.saturating_sub(attempts_used),
        })
    }

    /// Current quota for `user_id`. Unknown users report fresh-user defaults
    /// without creating any rows.
    pub async fn user_quota(&self, user_id: &str) -> Result<QuotaStatus, BidwiseError> {
        let spending = self
            .store
            .get_user_spending(user_id)
            .await?
            .unwrap_or_else(|| UserSpending::new_user(user_id));
        let balance = self
            .store
            .get_coupon_balance(user_id)
            .await?
            .unwrap_or_else(|| BidCouponBalance {
                user_id: user_id.to_string(),
                free_bids_remaining: self.config.initial_free_bids,
                total_free_bids_used: 0,
            });
        Ok(QuotaStatus::new(
            &spending,
            &balance,
            self.config.spend_unlock_amount,
        ))
    }

    /// Advisory eligibility lookup for storefront hints.
    pub fn eligibility(&self, category: &str, price: f64) -> EligibilityReport {
        self.eligibility.report(category, price)
    }

    // --- Administration ---

    pub async fn stats(&self) -> Result<BidStats, BidwiseError> {
        self.store.bid_stats().await
    }

    /// Recent attempts, newest first. The limit defaults to 50 and is capped at 500.
    pub async fn recent_bids(&self, filter: AttemptFilter) -> Result<Vec<BidAttempt>, BidwiseError> {
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        self.store
            .list_attempts(&AttemptFilter {
                limit: Some(limit),
                ..filter
            })
            .await
    }

    /// Spend tier and bid-card balance for every known user.
    pub async fn users(&self) -> Result<Vec<UserSummary>, BidwiseError> {
        self.store.list_users(self.config.initial_free_bids).await
    }

    pub async fn thresholds(&self) -> Result<Vec<ProductThreshold>, BidwiseError> {
        self.store.list_thresholds().await
    }

    /// Flag a product for clearance at `clearance_threshold`, or unflag it with `None`.
    pub async fn set_clearance(
        &self,
        product_id: &str,
        clearance_threshold: Option<i64>,
    ) -> Result<ProductThreshold, BidwiseError> {
        if let Some(value) = clearance_threshold
            && value <= 0
        {
            return Err(BidwiseError::InvalidRequest(
                "clearanceThreshold must be positive".into(),
            ));
        }
        let updated = self
            .store
            .set_clearance(product_id, clearance_threshold)
            .await?
            .ok_or_else(|| BidwiseError::NotFound {
                kind: "product threshold".into(),
                id: product_id.to_string(),
            })?;
        info!(product_id, ?clearance_threshold, "clearance updated");
        Ok(updated)
    }

    /// Grant additional free bid cards.
    pub async fn grant_free_bids(
        &self,
        user_id: &str,
        count: u32,
    ) -> Result<BidCouponBalance, BidwiseError> {
        if count == 0 {
            return Err(BidwiseError::InvalidRequest("count must be at least 1".into()));
        }
        let balance = self
            .store
            .grant_free_bids(user_id, count, self.config.initial_free_bids)
            .await?;
        info!(
            user_id,
            count,
            free_bids_remaining = balance.free_bids_remaining,
            "free bids granted"
        );
        Ok(balance)
    }

    /// Record a user's cumulative spend on behalf of the order subsystem.
    pub async fn record_spending(&self, spending: UserSpending) -> Result<UserSpending, BidwiseError> {
        if !spending.total_spent.is_finite() || spending.total_spent < 0.0 {
            return Err(BidwiseError::InvalidRequest(
                "totalSpent must be a non-negative number".into(),
            ));
        }
        if spending.spend_level > MAX_SPEND_LEVEL {
            return Err(BidwiseError::InvalidRequest(format!(
                "spendLevel must be between 0 and {MAX_SPEND_LEVEL}"
            )));
        }
        self.store.upsert_user_spending(&spending).await?;
        info!(
            user_id = %spending.user_id,
            total_spent = spending.total_spent,
            spend_level = spending.spend_level,
            "user spending recorded"
        );
        Ok(spending)
    }
}

/// Whole amounts print without decimals, fractional ones with two.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BidRequest {
        BidRequest {
            product_id: "p-1".into(),
            bid_amount: 4000.0,
            product_category: "fashion".into(),
            product_price: 4999.0,
            product_original_price: 9999.0,
            use_free_coupon: false,
        }
    }

    #[test]
    fn request_parses_camel_case_and_legacy_coupon_key() {
        let json = r#"{"productId":"p-9","bidAmount":1500,"productCategory":"bags",
            "productPrice":2000,"productOriginalPrice":2500,"useFreeCopon":true}"#;
        let parsed: BidRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.product_id, "p-9");
        assert!(parsed.use_free_coupon);

        let json = r#"{"productId":"p-9","bidAmount":1500,"productCategory":"bags",
            "productPrice":2000,"productOriginalPrice":2500}"#;
        let parsed: BidRequest = serde_json::from_str(json).unwrap();
        assert!(!parsed.use_free_coupon);
    }

    #[test]
    fn validate_rejects_bad_amounts() {
        assert!(request().validate().is_ok());
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut r = request();
            r.bid_amount = bad;
            assert!(matches!(
                r.validate(),
                Err(BidwiseError::InvalidRequest(_))
            ));
        }
        let mut r = request();
        r.product_original_price = 0.0;
        assert!(r.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_identifiers() {
        let mut r = request();
        r.product_id = "  ".into();
        assert!(r.validate().is_err());
        let mut r = request();
        r.product_category = String::new();
        assert!(r.validate().is_err());
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(8700.0), "8700");
        assert_eq!(format_amount(1234.5), "1234.50");
    }
}
