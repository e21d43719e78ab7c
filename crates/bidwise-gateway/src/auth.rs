// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the gateway.
//!
//! User tokens have the form `<user_id>.<hex(HMAC-SHA256(secret, user_id))>`.
//! Admin routes use a separate static bearer token. With no secret (or no
//! admin token) configured, the corresponding routes reject every request.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use bidwise_core::types::{AuthIdentity, AuthToken};
use bidwise_core::{AdapterType, AuthAdapter, BidwiseError, HealthStatus, PluginAdapter};

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies HMAC user tokens.
pub struct TokenAuthenticator {
    secret: Option<Vec<u8>>,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl TokenAuthenticator {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.map(|s| s.as_bytes().to_vec()),
        }
    }

    fn mac(secret: &[u8], user_id: &str) -> Result<HmacSha256, BidwiseError> {
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| BidwiseError::Internal(format!("invalid HMAC key: {e}")))?;
        mac.update(user_id.as_bytes());
        Ok(mac)
    }

    /// Mint a bearer token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, BidwiseError> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| BidwiseError::Config("auth.token_secret is not set".into()))?;
        if user_id.trim().is_empty() {
            return Err(BidwiseError::InvalidRequest("user id must not be empty".into()));
        }
        let signature = Self::mac(secret, user_id)?.finalize().into_bytes();
        Ok(format!("{user_id}.{}", hex::encode(signature)))
    }
}

#[async_trait]
impl PluginAdapter for TokenAuthenticator {
    fn name(&self) -> &str {
        "hmac-token"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, BidwiseError> {
        Ok(match self.secret {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("no token secret configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), BidwiseError> {
        Ok(())
    }
}

#[async_trait]
impl AuthAdapter for TokenAuthenticator {
    async fn authenticate(&self, token: AuthToken) -> Result<AuthIdentity, BidwiseError> {
        let Some(secret) = self.secret.as_deref() else {
            tracing::error!("no token secret configured -- rejecting request");
            return Err(BidwiseError::Unauthorized);
        };
        let (user_id, signature_hex) = token
            .0
            .rsplit_once('.')
            .ok_or(BidwiseError::Unauthorized)?;
        if user_id.is_empty() {
            return Err(BidwiseError::Unauthorized);
        }
        let signature = hex::decode(signature_hex).map_err(|_| BidwiseError::Unauthorized)?;
        Self::mac(secret, user_id)?
            .verify_slice(&signature)
            .map_err(|_| BidwiseError::Unauthorized)?;
        Ok(AuthIdentity {
            user_id: user_id.to_string(),
        })
    }
}

/// Shared authentication state for the middleware layers.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn AuthAdapter>,
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("users", &self.users.name())
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn bearer(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Verify the user token and attach the [`AuthIdentity`] as a request extension.
pub async fn user_auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer(&request).map(|t| AuthToken(t.to_string())) else {
        return ApiError(BidwiseError::Unauthorized).into_response();
    };
    match auth.users.authenticate(token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// Require the static admin bearer token.
pub async fn admin_auth_middleware(
    State(auth): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.admin_token.as_deref() else {
        tracing::warn!("admin request rejected: no admin token configured");
        return ApiError(BidwiseError::Unauthorized).into_response();
    };
    // Compare digests so the comparison time does not depend on a shared prefix.
    let authorized = bearer(&request)
        .is_some_and(|token| Sha256::digest(token.as_bytes()) == Sha256::digest(expected.as_bytes()));
    if !authorized {
        return ApiError(BidwiseError::Unauthorized).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-0123";

    #[tokio::test]
    async fn issued_token_round_trips() {
        let auth = TokenAuthenticator::new(Some(SECRET));
        let token = auth.issue("user-42").unwrap();
        assert!(token.starts_with("user-42."));
        let identity = auth.authenticate(AuthToken(token)).await.unwrap();
        assert_eq!(identity.user_id, "user-42");
    }

    #[tokio::test]
    async fn user_ids_may_contain_dots() {
        let auth = TokenAuthenticator::new(Some(SECRET));
        let token = auth.issue("jane.doe").unwrap();
        let identity = auth.authenticate(AuthToken(token)).await.unwrap();
        assert_eq!(identity.user_id, "jane.doe");
    }

    #[tokio::test]
    async fn tampered_tokens_are_rejected() {
        let auth = TokenAuthenticator::new(Some(SECRET));
        let token = auth.issue("user-42").unwrap();
        let forged = token.replacen("user-42", "user-43", 1);
        for bad in [forged, "user-42".to_string(), "user-42.zz".to_string(), ".abcd".to_string()] {
            assert!(matches!(
                auth.authenticate(AuthToken(bad)).await,
                Err(BidwiseError::Unauthorized)
            ));
        }
    }

    #[tokio::test]
    async fn other_secret_is_rejected() {
        let token = TokenAuthenticator::new(Some(SECRET)).issue("u").unwrap();
        let other = TokenAuthenticator::new(Some("a-different-secret-99"));
        assert!(other.authenticate(AuthToken(token)).await.is_err());
    }

    #[tokio::test]
    async fn missing_secret_fails_closed() {
        let auth = TokenAuthenticator::new(None);
        assert!(auth.issue("u").is_err());
        assert!(auth.authenticate(AuthToken("u.00".into())).await.is_err());
        assert!(matches!(
            auth.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[test]
    fn debug_redacts_secret() {
        let auth = TokenAuthenticator::new(Some(SECRET));
        assert!(!format!("{auth:?}").contains(SECRET));
    }
}
