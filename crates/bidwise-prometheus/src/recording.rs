// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; with no recorder installed every call is a no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Bidwise metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("bidwise_bids_total", "Evaluated bids by outcome");
    describe_counter!(
        "bidwise_bid_denials_total",
        "Bids refused before evaluation, by reason code"
    );
    describe_counter!(
        "bidwise_free_coupons_consumed_total",
        "Free bid cards consumed"
    );
    describe_histogram!(
        "bidwise_bid_evaluation_seconds",
        "End-to-end bid evaluation latency in seconds"
    );
    describe_gauge!(
        "bidwise_memory_heap_bytes",
        "Bytes allocated by the application (jemalloc)"
    );
    describe_gauge!(
        "bidwise_memory_resident_bytes",
        "Bytes in physically resident allocator pages (jemalloc)"
    );
}

/// Record an evaluated bid (`accepted` or `rejected`).
pub fn record_bid(outcome: &str) {
    metrics::counter!("bidwise_bids_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a bid refused with a reason code.
pub fn record_denial(reason: &str) {
    metrics::counter!("bidwise_bid_denials_total", "reason" => reason.to_string()).increment(1);
}

pub fn record_coupon_consumed() {
    metrics::counter!("bidwise_free_coupons_consumed_total").increment(1);
}

/// Record evaluation latency.
pub fn record_evaluation_latency(seconds: f64) {
    metrics::histogram!("bidwise_bid_evaluation_seconds").record(seconds);
}

pub fn set_memory_heap(bytes: f64) {
    metrics::gauge!("bidwise_memory_heap_bytes").set(bytes);
}

pub fn set_memory_resident(bytes: f64) {
    metrics::gauge!("bidwise_memory_resident_bytes").set(bytes);
}
