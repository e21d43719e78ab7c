// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bidwise.toml` > `~/.config/bidwise/bidwise.toml` > `/etc/bidwise/bidwise.toml`
//! with environment variable overrides via `BIDWISE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BidwiseConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bidwise/bidwise.toml`
/// 3. `~/.config/bidwise/bidwise.toml`
/// 4. `./bidwise.toml`
/// 5. `BIDWISE_*` environment variables
pub fn load_config() -> Result<BidwiseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BidwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BidwiseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BidwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BidwiseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/bidwise/bidwise.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("bidwise").join("bidwise.toml"));
    }
    paths.push(PathBuf::from("bidwise.toml"));
    paths
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(BidwiseConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Top-level tables that environment variables may target.
const SECTIONS: &[&str] = &["server", "auth", "storage", "negotiation"];

/// `BIDWISE_<SECTION>_<KEY>` maps to `<section>.<key>`; the key keeps its
/// underscores, so `BIDWISE_AUTH_TOKEN_SECRET` becomes `auth.token_secret`.
fn env_provider() -> Env {
    Env::prefixed("BIDWISE_").map(|key| {
        let lower = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                lower
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(lower)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_maps_underscored_keys_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BIDWISE_AUTH_TOKEN_SECRET", "s3cret");
            jail.set_env("BIDWISE_NEGOTIATION_MAX_ATTEMPTS", "5");
            jail.set_env("BIDWISE_SERVER_PORT", "9090");

            let config: BidwiseConfig = Figment::new()
                .merge(Serialized::defaults(BidwiseConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.auth.token_secret.as_deref(), Some("s3cret"));
            assert_eq!(config.negotiation.max_attempts, 5);
            assert_eq!(config.server.port, 9090);
            Ok(())
        });
    }

    #[test]
    fn local_file_has_highest_precedence() {
        let paths = search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/bidwise/bidwise.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("bidwise.toml")));
    }

    #[test]
    fn file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[negotiation]
initial_free_bids = 2
"#,
            )?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.negotiation.initial_free_bids, 2);
            assert_eq!(config.negotiation.max_attempts, 3);
            Ok(())
        });
    }
}
