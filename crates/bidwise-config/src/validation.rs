// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::BidwiseConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &BidwiseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(secret) = &config.auth.token_secret
        && secret.len() < 16
    {
        errors.push(ConfigError::Validation {
            message: "auth.token_secret must be at least 16 characters".to_string(),
        });
    }

    let negotiation = &config.negotiation;

    if negotiation.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: "negotiation.max_attempts must be at least 1".to_string(),
        });
    }

    if !(negotiation.min_bid_price.is_finite() && negotiation.min_bid_price > 0.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "negotiation.min_bid_price must be positive, got {}",
                negotiation.min_bid_price
            ),
        });
    }

    if !(negotiation.spend_unlock_amount.is_finite() && negotiation.spend_unlock_amount > 0.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "negotiation.spend_unlock_amount must be positive, got {}",
                negotiation.spend_unlock_amount
            ),
        });
    }

    // A rejected bid must always come with at least one suggestion.
    if negotiation.suggested_increases.is_empty() {
        errors.push(ConfigError::Validation {
            message: "negotiation.suggested_increases must not be empty".to_string(),
        });
    }
    if negotiation.suggested_increases.contains(&0) {
        errors.push(ConfigError::Validation {
            message: "negotiation.suggested_increases entries must be positive".to_string(),
        });
    }

    for (i, category) in negotiation.excluded_categories.iter().enumerate() {
        if category.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("negotiation.excluded_categories[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = BidwiseConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = BidwiseConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn zero_max_attempts_fails_validation() {
        let mut config = BidwiseConfig::default();
        config.negotiation.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "max_attempts"));
    }

    #[test]
    fn empty_suggestions_fail_validation() {
        let mut config = BidwiseConfig::default();
        config.negotiation.suggested_increases.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "suggested_increases"));
    }

    #[test]
    fn short_token_secret_fails_validation() {
        let mut config = BidwiseConfig::default();
        config.auth.token_secret = Some("short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "token_secret"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = BidwiseConfig::default();
        config.server.host = " ".to_string();
        config.negotiation.min_bid_price = -1.0;
        config.negotiation.excluded_categories = vec!["".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = BidwiseConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.storage.database_path = "/tmp/bids.db".to_string();
        config.auth.token_secret = Some("0123456789abcdef".to_string());
        config.negotiation.suggested_increases = vec![25];
        assert!(validate_config(&config).is_ok());
    }
}
