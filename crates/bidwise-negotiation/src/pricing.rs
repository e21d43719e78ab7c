// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Threshold pricing pipeline.
//!
//! A product's threshold is derived once from its sale and original price,
//! then adjusted per bid in a fixed order: loyalty tier, demand level, and
//! finally the clearance override. Every stage clamps to the product's
//! `min_safe_threshold` (seller cost plus 8%), so no combination of discounts
//! can sell below cost.

use bidwise_core::types::{DemandLevel, ProductThreshold, UserSpending};

const SELLER_COST_RATIO: f64 = 0.55;
const BASE_THRESHOLD_RATIO: f64 = 0.90;
const MIN_MARGIN_RATIO: f64 = 1.08;

const HIGH_DEMAND_PRICE: f64 = 5000.0;
const MEDIUM_DEMAND_PRICE: f64 = 2000.0;

/// Amounts derived from a product's prices at its first bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdParts {
    pub seller_cost: i64,
    pub base_threshold: i64,
    pub min_safe_threshold: i64,
    pub demand_level: DemandLevel,
}

impl ThresholdParts {
    pub fn compute(product_price: f64, product_original_price: f64) -> Self {
        let seller_cost = round(product_original_price * SELLER_COST_RATIO);
        Self {
            seller_cost,
            base_threshold: round(product_price * BASE_THRESHOLD_RATIO),
            min_safe_threshold: round(seller_cost as f64 * MIN_MARGIN_RATIO),
            demand_level: demand_level(product_price),
        }
    }

    /// A fresh, non-clearance threshold row stamped with `now`.
    pub fn into_threshold(self, product_id: &str, now: &str) -> ProductThreshold {
        ProductThreshold {
            product_id: product_id.to_string(),
            seller_cost: self.seller_cost,
            base_threshold: self.base_threshold,
            min_safe_threshold: self.min_safe_threshold,
            demand_level: self.demand_level,
            is_clearance: false,
            clearance_threshold: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

pub fn demand_level(product_price: f64) -> DemandLevel {
    if product_price > HIGH_DEMAND_PRICE {
        DemandLevel::High
    } else if product_price > MEDIUM_DEMAND_PRICE {
        DemandLevel::Medium
    } else {
        DemandLevel::Low
    }
}

/// Loyalty discount multiplier. The highest qualifying tier wins.
pub fn loyalty_multiplier(spend_level: u8, total_spent: f64) -> f64 {
    if spend_level >= 2 || total_spent >= 5000.0 {
        0.88
    } else if spend_level >= 1 || total_spent >= 4000.0 {
        0.92
    } else if total_spent >= 3000.0 {
        0.96
    } else {
        1.0
    }
}

pub fn demand_multiplier(level: DemandLevel) -> f64 {
    match level {
        DemandLevel::High => 1.0,
        DemandLevel::Medium => 0.97,
        DemandLevel::Low => 0.93,
    }
}

pub fn adjust_for_loyalty(
    base_threshold: i64,
    min_safe_threshold: i64,
    spend_level: u8,
    total_spent: f64,
) -> i64 {
    let adjusted = round(base_threshold as f64 * loyalty_multiplier(spend_level, total_spent));
    adjusted.max(min_safe_threshold)
}

pub fn adjust_for_demand(threshold: i64, min_safe_threshold: i64, level: DemandLevel) -> i64 {
    let adjusted = round(threshold as f64 * demand_multiplier(level));
    adjusted.max(min_safe_threshold)
}

/// Tier-1 users see the clearance price on flagged products, floor-clamped.
pub fn apply_clearance(threshold: i64, product: &ProductThreshold, spend_level: u8) -> i64 {
    match product.clearance_threshold {
        Some(clearance) if product.is_clearance && clearance > 0 && spend_level == 1 => {
            clearance.max(product.min_safe_threshold)
        }
        _ => threshold,
    }
}

/// The minimum bid `user` must offer for `product`.
pub fn final_threshold(product: &ProductThreshold, user: &UserSpending) -> i64 {
    let threshold = adjust_for_loyalty(
        product.base_threshold,
        product.min_safe_threshold,
        user.spend_level,
        user.total_spent,
    );
    let threshold = adjust_for_demand(threshold, product.min_safe_threshold, product.demand_level);
    let threshold = apply_clearance(threshold, product, user.spend_level);
    threshold.max(product.min_safe_threshold)
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(price: f64, original: f64) -> ProductThreshold {
        ThresholdParts::compute(price, original).into_threshold("p-1", "2026-01-01T00:00:00.000Z")
    }

    fn user(spend_level: u8, total_spent: f64) -> UserSpending {
        UserSpending {
            user_id: "u-1".into(),
            total_spent,
            spend_level,
        }
    }

    #[test]
    fn cost_floor_overrides_baseline() {
        let parts = ThresholdParts::compute(4999.0, 9999.0);
        assert_eq!(parts.seller_cost, 5499);
        assert_eq!(parts.base_threshold, 4499);
        assert_eq!(parts.min_safe_threshold, 5939);
        assert_eq!(parts.demand_level, DemandLevel::Medium);

        let threshold = final_threshold(&product(4999.0, 9999.0), &user(0, 0.0));
        assert_eq!(threshold, 5939);
    }

    #[test]
    fn top_tier_high_demand() {
        let p = product(10_000.0, 10_000.0);
        assert_eq!(p.seller_cost, 5500);
        assert_eq!(p.base_threshold, 9000);
        assert_eq!(p.min_safe_threshold, 5940);
        assert_eq!(p.demand_level, DemandLevel::High);
        assert_eq!(final_threshold(&p, &user(2, 6000.0)), 7920);
    }

    #[test]
    fn demand_bands_are_exclusive_at_boundaries() {
        assert_eq!(demand_level(5000.0), DemandLevel::Medium);
        assert_eq!(demand_level(5000.01), DemandLevel::High);
        assert_eq!(demand_level(2000.0), DemandLevel::Low);
        assert_eq!(demand_level(2000.01), DemandLevel::Medium);
    }

    #[test]
    fn loyalty_tiers_top_down() {
        assert_eq!(loyalty_multiplier(0, 0.0), 1.0);
        assert_eq!(loyalty_multiplier(0, 3000.0), 0.96);
        assert_eq!(loyalty_multiplier(0, 4000.0), 0.92);
        assert_eq!(loyalty_multiplier(1, 0.0), 0.92);
        assert_eq!(loyalty_multiplier(0, 5000.0), 0.88);
        assert_eq!(loyalty_multiplier(2, 0.0), 0.88);
    }

    #[test]
    fn demand_compounds_on_loyalty() {
        // base 2700, floor 1188: loyalty 0.92 -> 2484, low demand 0.93 -> 2310
        let p = product(3000.0, 2000.0);
        assert_eq!(p.demand_level, DemandLevel::Medium);
        let loyalty = adjust_for_loyalty(p.base_threshold, p.min_safe_threshold, 1, 0.0);
        assert_eq!(loyalty, 2484);
        assert_eq!(adjust_for_demand(loyalty, p.min_safe_threshold, DemandLevel::Low), 2310);
        assert_eq!(final_threshold(&p, &user(1, 0.0)), 2409);
    }

    #[test]
    fn clearance_only_for_tier_one() {
        let mut p = product(10_000.0, 10_000.0);
        p.is_clearance = true;
        p.clearance_threshold = Some(6500);

        assert_eq!(final_threshold(&p, &user(1, 0.0)), 6500);
        assert_eq!(final_threshold(&p, &user(0, 0.0)), 9000);
        assert_eq!(final_threshold(&p, &user(2, 0.0)), 7920);
    }

    #[test]
    fn clearance_is_floor_clamped() {
        let mut p = product(10_000.0, 10_000.0);
        p.is_clearance = true;
        p.clearance_threshold = Some(1000);
        assert_eq!(final_threshold(&p, &user(1, 0.0)), 5940);
    }

    #[test]
    fn unflagged_clearance_value_is_ignored() {
        let mut p = product(10_000.0, 10_000.0);
        p.clearance_threshold = Some(6500);
        assert_eq!(final_threshold(&p, &user(1, 0.0)), 8280);
    }

    fn any_product() -> impl Strategy<Value = ProductThreshold> {
        (1000.0f64..200_000.0, 1000.0f64..200_000.0, any::<bool>(), 1i64..200_000).prop_map(
            |(price, original, clearance, clearance_value)| {
                let mut p = product(price, original);
                p.is_clearance = clearance;
                p.clearance_threshold = clearance.then_some(clearance_value);
                p
            },
        )
    }

    proptest! {
        #[test]
        fn final_threshold_never_below_floor(
            p in any_product(),
            level in 0u8..=2,
            spent in 0.0f64..20_000.0,
        ) {
            prop_assert!(final_threshold(&p, &user(level, spent)) >= p.min_safe_threshold);
        }

        #[test]
        fn higher_tier_never_costs_more(
            price in 1000.0f64..200_000.0,
            original in 1000.0f64..200_000.0,
            spent in 0.0f64..20_000.0,
        ) {
            // Clearance is a tier-1-only promotion and is excluded here.
            let p = product(price, original);
            let t0 = final_threshold(&p, &user(0, spent));
            let t1 = final_threshold(&p, &user(1, spent));
            let t2 = final_threshold(&p, &user(2, spent));
            prop_assert!(t1 <= t0);
            prop_assert!(t2 <= t1);
        }

        #[test]
        fn more_spend_never_costs_more(
            price in 1000.0f64..200_000.0,
            original in 1000.0f64..200_000.0,
            level in 0u8..=2,
            low in 0.0f64..10_000.0,
            extra in 0.0f64..10_000.0,
        ) {
            let p = product(price, original);
            prop_assert!(
                final_threshold(&p, &user(level, low + extra))
                    <= final_threshold(&p, &user(level, low))
            );
        }

        #[test]
        fn threshold_is_deterministic(
            p in any_product(),
            level in 0u8..=2,
            spent in 0.0f64..20_000.0,
        ) {
            let u = user(level, spent);
            prop_assert_eq!(final_threshold(&p, &u), final_threshold(&p.clone(), &u.clone()));
        }
    }
}
