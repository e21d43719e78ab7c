// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reverse-bidding negotiation engine.
//!
//! The pricing pipeline (threshold, loyalty, demand, clearance) and the
//! eligibility and quota rules are pure functions. [`NegotiationEngine`]
//! composes them with a [`bidwise_core::NegotiationStore`] into a single
//! accept/reject decision per bid.

pub mod eligibility;
pub mod orchestrator;
pub mod pricing;
pub mod quota;

pub use eligibility::{EligibilityFilter, EligibilityReport};
pub use orchestrator::{AttemptSummary, BidDecision, BidRequest, NegotiationEngine};
pub use pricing::{ThresholdParts, final_threshold};
pub use quota::QuotaStatus;
