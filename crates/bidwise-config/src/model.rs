// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Bidwise configuration.
///
/// Every section is optional and defaults to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BidwiseConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bearer-token authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Negotiation policy knobs.
    #[serde(default)]
    pub negotiation: NegotiationConfig,
}

impl BidwiseConfig {
    /// A copy with every secret replaced, safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.auth.token_secret.is_some() {
            copy.auth.token_secret = Some("[redacted]".to_string());
        }
        if copy.auth.admin_token.is_some() {
            copy.auth.admin_token = Some("[redacted]".to_string());
        }
        copy
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Authentication configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify user bearer tokens.
    /// `None` rejects every authenticated request.
    #[serde(default)]
    pub token_secret: Option<String>,

    /// Static bearer token for admin routes. `None` disables them.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("bidwise").join("bidwise.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("bidwise.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Negotiation policy configuration.
///
/// The pricing multipliers are part of the algorithm and are not configurable;
/// these are the quota, cap, and eligibility knobs around it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NegotiationConfig {
    /// Maximum evaluated bids per (user, product).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Bid cards granted to a user on first access.
    #[serde(default = "default_initial_free_bids")]
    pub initial_free_bids: u32,

    /// Cumulative spend that unlocks unlimited negotiation.
    #[serde(default = "default_spend_unlock_amount")]
    pub spend_unlock_amount: f64,

    /// Products priced below this cannot be negotiated.
    #[serde(default = "default_min_bid_price")]
    pub min_bid_price: f64,

    /// Fixed-price categories, matched case-insensitively.
    #[serde(default = "default_excluded_categories")]
    pub excluded_categories: Vec<String>,

    /// Fixed increments offered on a rejected bid.
    #[serde(default = "default_suggested_increases")]
    pub suggested_increases: Vec<u32>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_free_bids: default_initial_free_bids(),
            spend_unlock_amount: default_spend_unlock_amount(),
            min_bid_price: default_min_bid_price(),
            excluded_categories: default_excluded_categories(),
            suggested_increases: default_suggested_increases(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_free_bids() -> u32 {
    5
}

fn default_spend_unlock_amount() -> f64 {
    3000.0
}

fn default_min_bid_price() -> f64 {
    1000.0
}

fn default_excluded_categories() -> Vec<String> {
    vec![
        "mobiles".to_string(),
        "laptops".to_string(),
        "electronics".to_string(),
    ]
}

fn default_suggested_increases() -> Vec<u32> {
    vec![50, 100, 200]
}
