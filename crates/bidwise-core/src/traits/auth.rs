// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication adapter trait for identity verification.

use async_trait::async_trait;

use crate::error::BidwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AuthIdentity, AuthToken};

/// Adapter for authenticating bearer credentials.
#[async_trait]
pub trait AuthAdapter: PluginAdapter {
    /// Authenticates the given token and returns the verified identity.
    ///
    /// Fails with [`BidwiseError::Unauthorized`] for any rejected token.
    async fn authenticate(&self, token: AuthToken) -> Result<AuthIdentity, BidwiseError>;
}
