// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use bidwise_config::model::StorageConfig;
use bidwise_core::types::{
    AttemptCommit, AttemptFilter, BidAttempt, BidCouponBalance, BidStats, CommitOutcome,
    ProductThreshold, UserSpending, UserSummary,
};
use bidwise_core::{
    AdapterType, BidwiseError, HealthStatus, NegotiationStore, PluginAdapter, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed negotiation store.
///
/// The database is opened lazily by [`StorageAdapter::initialize`]; every
/// other operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, BidwiseError> {
        self.db.get().ok_or_else(|| BidwiseError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), BidwiseError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, BidwiseError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        let ping = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match ping {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), BidwiseError> {
        if self.db.get().is_some() {
            self.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), BidwiseError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| BidwiseError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), BidwiseError> {
        self.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl NegotiationStore for SqliteStorage {
    // --- Per-user rows ---

    async fn ensure_user(
        &self,
        user_id: &str,
        initial_free_bids: u32,
    ) -> Result<(UserSpending, BidCouponBalance), BidwiseError> {
        queries::users::ensure_user(self.db()?, user_id, initial_free_bids).await
    }

    async fn get_user_spending(&self, user_id: &str) -> Result<Option<UserSpending>, BidwiseError> {
        queries::users::get_user_spending(self.db()?, user_id).await
    }

    async fn upsert_user_spending(&self, spending: &UserSpending) -> Result<(), BidwiseError> {
        queries::users::upsert_user_spending(self.db()?, spending).await
    }

    async fn get_coupon_balance(
        &self,
        user_id: &str,
    ) -> Result<Option<BidCouponBalance>, BidwiseError> {
        queries::users::get_coupon_balance(self.db()?, user_id).await
    }

    async fn grant_free_bids(
        &self,
        user_id: &str,
        count: u32,
        initial_free_bids: u32,
    ) -> Result<BidCouponBalance, BidwiseError> {
        queries::users::grant_free_bids(self.db()?, user_id, count, initial_free_bids).await
    }

    async fn list_users(&self, initial_free_bids: u32) -> Result<Vec<UserSummary>, BidwiseError> {
        queries::users::list_users(self.db()?, initial_free_bids).await
    }

    // --- Product thresholds ---

    async fn get_threshold(
        &self,
        product_id: &str,
    ) -> Result<Option<ProductThreshold>, BidwiseError> {
        queries::thresholds::get_threshold(self.db()?, product_id).await
    }

    async fn get_or_insert_threshold(
        &self,
        threshold: &ProductThreshold,
    ) -> Result<ProductThreshold, BidwiseError> {
        queries::thresholds::get_or_insert_threshold(self.db()?, threshold).await
    }

    async fn set_clearance(
        &self,
        product_id: &str,
        clearance_threshold: Option<i64>,
    ) -> Result<Option<ProductThreshold>, BidwiseError> {
        queries::thresholds::set_clearance(self.db()?, product_id, clearance_threshold).await
    }

    async fn list_thresholds(&self) -> Result<Vec<ProductThreshold>, BidwiseError> {
        queries::thresholds::list_thresholds(self.db()?).await
    }

    // --- Attempt ledger ---

    async fn count_attempts(&self, user_id: &str, product_id: &str) -> Result<u32, BidwiseError> {
        queries::attempts::count_attempts(self.db()?, user_id, product_id).await
    }

    async fn commit_attempt(&self, commit: &AttemptCommit) -> Result<CommitOutcome, BidwiseError> {
        queries::attempts::commit_attempt(self.db()?, commit).await
    }

    async fn list_attempts(&self, filter: &AttemptFilter) -> Result<Vec<BidAttempt>, BidwiseError> {
        queries::attempts::list_attempts(self.db()?, filter).await
    }

    async fn bid_stats(&self) -> Result<BidStats, BidwiseError> {
        queries::attempts::bid_stats(self.db()?).await
    }
}
