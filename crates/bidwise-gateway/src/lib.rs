// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Bidwise negotiation engine.
//!
//! Exposes bid evaluation and the collaborator reads to authenticated users,
//! an admin surface behind a static bearer token, and unauthenticated
//! `/health` and `/metrics` endpoints.

pub mod admin;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{AuthState, TokenAuthenticator};
pub use error::ApiError;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
