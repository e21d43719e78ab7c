// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bidwise serve` implementation.
//!
//! Wires storage, metrics, the negotiation engine and the HTTP gateway,
//! then runs until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use bidwise_config::model::BidwiseConfig;
use bidwise_core::{BidwiseError, NegotiationStore, StorageAdapter};
use bidwise_gateway::{
    AuthState, GatewayState, HealthState, ServerConfig, TokenAuthenticator, start_server,
};
use bidwise_negotiation::NegotiationEngine;
use bidwise_storage::SqliteStorage;
use tracing::{debug, info, warn};

const MEMORY_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Runs the server until a shutdown signal arrives.
pub async fn run_serve(config: BidwiseConfig) -> Result<(), BidwiseError> {
    init_tracing(&config.server.log_level);

    info!("starting bidwise serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage initialized");

    let prometheus_render = init_metrics();
    #[cfg(not(target_env = "msvc"))]
    let memory_task = tokio::spawn(memory_monitor(MEMORY_SAMPLE_INTERVAL));

    let store: Arc<dyn NegotiationStore> = storage.clone();
    let engine = Arc::new(NegotiationEngine::new(store, config.negotiation.clone()));

    let authenticator = TokenAuthenticator::new(config.auth.token_secret.as_deref());
    if config.auth.token_secret.is_none() {
        warn!("auth.token_secret is not set; every user request will be rejected");
    }
    if config.auth.admin_token.is_none() {
        warn!("auth.admin_token is not set; admin endpoints are disabled");
    }

    let state = GatewayState {
        engine,
        auth: AuthState {
            users: Arc::new(authenticator),
            admin_token: config.auth.admin_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let result = start_server(&server_config, state, shutdown_signal()).await;

    info!("shutting down");
    #[cfg(not(target_env = "msvc"))]
    memory_task.abort();
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to checkpoint storage on shutdown");
    }

    result
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Option<Arc<dyn Fn() -> String + Send + Sync>> {
    match bidwise_prometheus::PrometheusAdapter::new() {
        Ok(adapter) => {
            let handle = adapter.handle().clone();
            Some(Arc::new(move || handle.render()))
        }
        Err(e) => {
            warn!(error = %e, "prometheus recorder unavailable; /metrics disabled");
            None
        }
    }
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Option<Arc<dyn Fn() -> String + Send + Sync>> {
    None
}

/// Allocated and resident bytes as reported by jemalloc.
#[cfg(not(target_env = "msvc"))]
fn sample_memory() -> Option<(usize, usize)> {
    // Stats are cached until the epoch advances.
    tikv_jemalloc_ctl::epoch::advance().ok()?;
    let allocated = tikv_jemalloc_ctl::stats::allocated::read().ok()?;
    let resident = tikv_jemalloc_ctl::stats::resident::read().ok()?;
    Some((allocated, resident))
}

/// Exports jemalloc heap gauges every `period` until the task is aborted.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let Some((allocated, resident)) = sample_memory() else {
            debug!("jemalloc stats unavailable");
            continue;
        };
        #[cfg(feature = "prometheus")]
        {
            bidwise_prometheus::set_memory_heap(allocated as f64);
            bidwise_prometheus::set_memory_resident(resident as f64);
        }
        debug!(allocated, resident, "memory sampled");
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
                    _ = sigterm.recv() => info!("received SIGTERM"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("received SIGINT");
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bidwise={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_reports_heap_and_resident() {
        let buf = vec![0u8; 1 << 20];
        let (allocated, resident) = sample_memory().unwrap();
        assert!(allocated >= buf.len());
        assert!(resident > 0);
    }
}
