// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Bidwise configuration system.

use bidwise_config::diagnostic::ConfigError;
use bidwise_config::model::BidwiseConfig;
use bidwise_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_bidwise_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
log_level = "debug"

[auth]
token_secret = "0123456789abcdef0123"
admin_token = "admin-token"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[negotiation]
max_attempts = 4
initial_free_bids = 2
spend_unlock_amount = 2500.0
min_bid_price = 500.0
excluded_categories = ["mobiles"]
suggested_increases = [25, 75]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.auth.token_secret.as_deref(), Some("0123456789abcdef0123"));
    assert_eq!(config.auth.admin_token.as_deref(), Some("admin-token"));
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.negotiation.max_attempts, 4);
    assert_eq!(config.negotiation.initial_free_bids, 2);
    assert_eq!(config.negotiation.spend_unlock_amount, 2500.0);
    assert_eq!(config.negotiation.min_bid_price, 500.0);
    assert_eq!(config.negotiation.excluded_categories, vec!["mobiles"]);
    assert_eq!(config.negotiation.suggested_increases, vec![25, 75]);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.log_level, "info");
    assert!(config.auth.token_secret.is_none());
    assert!(config.auth.admin_token.is_none());
    assert!(config.storage.database_path.ends_with("bidwise.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.negotiation.max_attempts, 3);
    assert_eq!(config.negotiation.initial_free_bids, 5);
}

/// Dot-notation overrides land on underscored keys (the env mapping target).
#[test]
fn dotted_override_sets_token_secret() {
    use figment::{providers::Serialized, Figment};

    let config: BidwiseConfig = Figment::new()
        .merge(Serialized::defaults(BidwiseConfig::default()))
        .merge(("auth.token_secret", "xyz-from-env-0123"))
        .extract()
        .expect("should set token_secret via dot notation");

    assert_eq!(config.auth.token_secret.as_deref(), Some("xyz-from-env-0123"));
}

/// Unknown field in [negotiation] is rejected with a suggestion.
#[test]
fn unknown_negotiation_key_suggests_correction() {
    let toml = r#"
[negotiation]
max_attemps = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "max_attemps"
                && suggestion.as_deref() == Some("max_attempts")
                && valid_keys.contains("initial_free_bids")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'max_attemps', got: {errors:?}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[cart]
enabled = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("cart"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[server]
port = "eighty"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("port"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_rejects_empty_suggestions() {
    let toml = r#"
[negotiation]
suggested_increases = []
"#;

    let errors = load_and_validate_str(toml).expect_err("empty suggestions should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("suggested_increases"))
    }));
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "prot".to_string(),
        section: "server".to_string(),
        suggestion: Some("port".to_string()),
        valid_keys: "host, port, log_level".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some(), "should have diagnostic code");
    let help = error.help().expect("should have help text").to_string();
    assert!(help.contains("did you mean `port`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("prot"));
}

/// Inline TOML errors carry a span pointing at the misspelled key.
#[test]
fn inline_unknown_key_has_span() {
    let toml = "[storage]\nwal_mod = true\n";
    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let span = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { key, span, .. } if key == "wal_mod" => *span,
        _ => None,
    });
    let span = span.expect("span should be resolved for inline source");
    assert_eq!(&toml[span.offset()..span.offset() + span.len()], "wal_mod");
}
