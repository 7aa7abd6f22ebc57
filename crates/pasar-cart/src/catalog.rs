//! # Catalogue Stock Oracle
//!
//! [`StockOracle`] over the product catalogue in pasar-db: the level is the
//! product's `count_in_stock`.

use async_trait::async_trait;
use tracing::debug;

use pasar_core::ProductId;
use pasar_db::Database;

use crate::error::OracleError;
use crate::oracle::StockOracle;

/// Reads live stock from the `products` table.
#[derive(Debug, Clone)]
pub struct CatalogStockOracle {
    db: Database,
}

impl CatalogStockOracle {
    pub fn new(db: Database) -> Self {
        CatalogStockOracle { db }
    }
}

#[async_trait]
impl StockOracle for CatalogStockOracle {
    async fn available_stock(&self, product_id: &ProductId) -> Result<i64, OracleError> {
        let level = self.db.products().available_stock(product_id).await?;

        match level {
            Some(level) => Ok(level.max(0)),
            None => {
                debug!(product_id = %product_id, "Product not in catalogue, reporting no stock");
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pasar_core::{Money, Product};
    use pasar_db::DbConfig;

    async fn catalogue() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: ProductId::from("A"),
                name: "Kopi Susu".to_string(),
                slug: "kopi-susu".to_string(),
                image: None,
                price: Money::from_minor(18_000),
                count_in_stock: 7,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_reads_count_in_stock() {
        let db = catalogue().await;
        let oracle = CatalogStockOracle::new(db.clone());

        assert_eq!(oracle.available_stock(&ProductId::from("A")).await, Ok(7));

        db.products().adjust_stock(&ProductId::from("A"), -3).await.unwrap();
        assert_eq!(oracle.available_stock(&ProductId::from("A")).await, Ok(4));
    }

    #[tokio::test]
    async fn test_unknown_product_has_no_stock() {
        let oracle = CatalogStockOracle::new(catalogue().await);

        assert_eq!(oracle.available_stock(&ProductId::from("Z")).await, Ok(0));
    }

    #[tokio::test]
    async fn test_closed_database_is_unavailable() {
        let db = catalogue().await;
        let oracle = CatalogStockOracle::new(db.clone());
        db.close().await;

        let result = oracle.available_stock(&ProductId::from("A")).await;
        assert!(matches!(result, Err(OracleError::Unavailable(_))));
    }
}
