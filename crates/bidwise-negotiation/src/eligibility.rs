// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product eligibility rules.
//!
//! Two hard rules decide eligibility: an excluded (fixed-price) category, and
//! a price below the bidding floor. The keyword list in [`is_suggested_category`]
//! only feeds client UI hints and never affects a decision.

use bidwise_config::model::NegotiationConfig;
use bidwise_core::{BidwiseError, RejectionReason};
use serde::Serialize;

/// Substrings of a lowercased category that mark it as a bidding candidate.
const SUGGESTED_KEYWORDS: &[&str] = &[
    "fashion",
    "shoes",
    "watches",
    "accessories",
    "bags",
    "gym",
    "stationery",
    "lifestyle",
    "men",
    "women",
    "footwear",
    "clothing",
];

/// Server-side eligibility rules built from the `[negotiation]` config.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    excluded_categories: Vec<String>,
    min_bid_price: f64,
}

/// Result of an advisory eligibility lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// UI hint only: the category is one the storefront promotes for bidding.
    pub suggested: bool,
}

impl EligibilityFilter {
    pub fn new(config: &NegotiationConfig) -> Self {
        Self {
            excluded_categories: config
                .excluded_categories
                .iter()
                .map(|c| c.trim().to_lowercase())
                .collect(),
            min_bid_price: config.min_bid_price,
        }
    }

    /// Apply the hard rules in order: category, then price floor.
    pub fn check(&self, category: &str, price: f64) -> Result<(), BidwiseError> {
        let normalized = category.trim().to_lowercase();
        if self.excluded_categories.iter().any(|c| *c == normalized) {
            return Err(BidwiseError::IneligibleCategory {
                category: category.to_string(),
            });
        }
        if price < self.min_bid_price {
            return Err(BidwiseError::IneligiblePrice {
                price,
                floor: self.min_bid_price,
            });
        }
        Ok(())
    }

    /// Evaluate the hard rules and attach the advisory hint.
    pub fn report(&self, category: &str, price: f64) -> EligibilityReport {
        let outcome = self.check(category, price);
        EligibilityReport {
            eligible: outcome.is_ok(),
            reason: outcome.err().map(|e| e.reason()),
            suggested: is_suggested_category(category),
        }
    }
}

/// Whether the storefront should advertise bidding for this category.
pub fn is_suggested_category(category: &str) -> bool {
    let normalized = category.trim().to_lowercase();
    SUGGESTED_KEYWORDS.iter().any(|k| normalized.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> EligibilityFilter {
        EligibilityFilter::new(&NegotiationConfig::default())
    }

    #[test]
    fn excluded_category_is_case_insensitive() {
        for category in ["laptops", "Laptops", " ELECTRONICS ", "Mobiles"] {
            let err = filter().check(category, 50_000.0).unwrap_err();
            assert_eq!(err.reason(), RejectionReason::CategoryExcluded, "{category}");
        }
    }

    #[test]
    fn category_rule_runs_before_price_floor() {
        let err = filter().check("mobiles", 10.0).unwrap_err();
        assert_eq!(err.reason(), RejectionReason::CategoryExcluded);
    }

    #[test]
    fn price_floor_is_inclusive() {
        assert!(filter().check("fashion", 1000.0).is_ok());
        let err = filter().check("fashion", 999.99).unwrap_err();
        assert_eq!(err.reason(), RejectionReason::BelowPriceFloor);
    }

    #[test]
    fn unknown_categories_are_eligible() {
        // The allow-list is a hint; anything not excluded may be negotiated.
        assert!(filter().check("garden tools", 2500.0).is_ok());
        assert!(!is_suggested_category("garden tools"));
    }

    #[test]
    fn suggested_hint_matches_list_and_fragments() {
        assert!(is_suggested_category("Watches"));
        assert!(is_suggested_category("Men's Clothing"));
        assert!(is_suggested_category("kids footwear"));
        assert!(!is_suggested_category("laptops"));
    }

    #[test]
    fn suggested_hint_matches_inside_compound_categories() {
        for category in ["smartwatches", "Shoes & Bags", "kids gym gear"] {
            assert!(is_suggested_category(category), "{category}");
        }
    }

    #[test]
    fn report_combines_rule_and_hint() {
        let report = filter().report("shoes", 500.0);
        assert!(!report.eligible);
        assert_eq!(report.reason, Some(RejectionReason::BelowPriceFloor));
        assert!(report.suggested);

        let report = filter().report("shoes", 1500.0);
        assert!(report.eligible);
        assert_eq!(report.reason, None);
    }
}
