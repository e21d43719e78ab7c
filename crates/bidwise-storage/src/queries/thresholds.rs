// SPDX-FileCopyrightText: 2026 Bidwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product threshold operations.
//!
//! A threshold row is written once, the first time any bid is evaluated for
//! the product, and thereafter only the clearance columns change.

use std::str::FromStr;

use bidwise_core::BidwiseError;
use bidwise_core::types::{DemandLevel, ProductThreshold};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};

use crate::database::Database;

const SELECT_COLUMNS: &str = "SELECT product_id, seller_cost, base_threshold, min_safe_threshold,
        demand_level, is_clearance, clearance_threshold, created_at, updated_at
 FROM product_thresholds";

fn threshold_from_row(row: &Row<'_>) -> rusqlite::Result<ProductThreshold> {
    let demand: String = row.get(4)?;
    let demand_level = DemandLevel::from_str(&demand)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(ProductThreshold {
        product_id: row.get(0)?,
        seller_cost: row.get(1)?,
        base_threshold: row.get(2)?,
        min_safe_threshold: row.get(3)?,
        demand_level,
        is_clearance: row.get(5)?,
        clearance_threshold: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Get the threshold row for a product.
pub async fn get_threshold(
    db: &Database,
    product_id: &str,
) -> Result<Option<ProductThreshold>, BidwiseError> {
    let product_id = product_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE product_id = ?1"),
                params![product_id],
                threshold_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert the threshold unless one exists, then return whichever row is stored.
pub async fn get_or_insert_threshold(
    db: &Database,
    threshold: &ProductThreshold,
) -> Result<ProductThreshold, BidwiseError> {
    let t = threshold.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO product_thresholds (product_id, seller_cost, base_threshold,
                     min_safe_threshold, demand_level, is_clearance, clearance_threshold,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(product_id) DO NOTHING",
                params![
                    t.product_id,
                    t.seller_cost,
                    t.base_threshold,
                    t.min_safe_threshold,
                    t.demand_level.to_string(),
                    t.is_clearance,
                    t.clearance_threshold,
                    t.created_at,
                    t.updated_at,
                ],
            )?;
            let stored = tx.query_row(
                &format!("{SELECT_COLUMNS} WHERE product_id = ?1"),
                params![t.product_id],
                threshold_from_row,
            )?;
            tx.commit()?;
            Ok(stored)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set or clear the clearance override. Returns `None` for an unknown product.
pub async fn set_clearance(
    db: &Database,
    product_id: &str,
    clearance_threshold: Option<i64>,
) -> Result<Option<ProductThreshold>, BidwiseError> {
    let product_id = product_id.to_string();
    let now = super::now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let changed = tx.execute(
                "UPDATE product_thresholds
                 SET is_clearance = ?2, clearance_threshold = ?3, updated_at = ?4
                 WHERE product_id = ?1",
                params![
                    product_id,
                    clearance_threshold.is_some(),
                    clearance_threshold,
                    now
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let stored = tx.query_row(
                &format!("{SELECT_COLUMNS} WHERE product_id = ?1"),
                params![product_id],
                threshold_from_row,
            )?;
            tx.commit()?;
            Ok(Some(stored))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List every threshold row, newest first.
pub async fn list_thresholds(db: &Database) -> Result<Vec<ProductThreshold>, BidwiseError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], threshold_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn sample(product_id: &str, base: i64) -> ProductThreshold {
        let now = crate::queries::now_timestamp();
        ProductThreshold {
            product_id: product_id.into(),
            seller_cost: 5500,
            base_threshold: base,
            min_safe_threshold: 5940,
            demand_level: DemandLevel::High,
            is_clearance: false,
            clearance_threshold: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn missing_threshold_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_threshold(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn first_insert_wins() {
        let (db, _dir) = setup_db().await;
        let first = get_or_insert_threshold(&db, &sample("p-1", 9000))
            .await
            .unwrap();
        assert_eq!(first.base_threshold, 9000);

        let second = get_or_insert_threshold(&db, &sample("p-1", 4500))
            .await
            .unwrap();
        assert_eq!(second.base_threshold, 9000);
        assert_eq!(list_thresholds(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_and_clear_clearance() {
        let (db, _dir) = setup_db().await;
        get_or_insert_threshold(&db, &sample("p-1", 9000))
            .await
            .unwrap();

        let flagged = set_clearance(&db, "p-1", Some(6000)).await.unwrap().unwrap();
        assert!(flagged.is_clearance);
        assert_eq!(flagged.clearance_threshold, Some(6000));

        let cleared = set_clearance(&db, "p-1", None).await.unwrap().unwrap();
        assert!(!cleared.is_clearance);
        assert_eq!(cleared.clearance_threshold, None);
        assert_eq!(cleared.base_threshold, 9000);
    }

    #[tokio::test]
    async fn set_clearance_unknown_product() {
        let (db, _dir) = setup_db().await;
        assert!(set_clearance(&db, "ghost", Some(100)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (db, _dir) = setup_db().await;
        for (id, created) in [
            ("p-b", "2026-03-02T10:00:00.000Z"),
            ("p-a", "2026-03-03T10:00:00.000Z"),
            ("p-c", "2026-03-01T10:00:00.000Z"),
        ] {
            let mut t = sample(id, 9000);
            t.created_at = created.into();
            get_or_insert_threshold(&db, &t).await.unwrap();
        }
        // Same timestamp: the later insert wins.
        let mut t = sample("p-d", 9000);
        t.created_at = "2026-03-03T10:00:00.000Z".into();
        get_or_insert_threshold(&db, &t).await.unwrap();

        let ids: Vec<String> = list_thresholds(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.product_id)
            .collect();
        assert_eq!(ids, ["p-d", "p-a", "p-b", "p-c"]);
    }
}
