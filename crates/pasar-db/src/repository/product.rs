//! # Product Repository
//!
//! Catalogue reads and stock bookkeeping.
//!
//! ## Key Operations
//! - Catalogue lookups by id and slug
//! - Live stock level for the cart's stock oracle
//! - Stock adjustments that never go below zero
//!
//! ## Stock Reads vs Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Touches count_in_stock                           │
//! │                                                                         │
//! │  Cart (any session)                                                    │
//! │       │  available_stock(id)   read only, once per add-or-update       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ products                                │                           │
//! │  │ A | Kopi Susu | kopi-susu | 12 in stock │                           │
//! │  │ B | Teh Manis | teh-manis |  0 in stock │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       ▲                                                                 │
//! │       │  adjust_stock(id, delta)   restock (+) or fulfilment (-)       │
//! │  Order fulfilment / admin                                              │
//! │                                                                         │
//! │  Adding to a cart reserves nothing: the level is advisory until the    │
//! │  order is placed.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pasar_core::{Product, ProductId};

const PRODUCT_COLUMNS: &str =
    "id, name, slug, image, price, count_in_stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.get_by_slug("kopi-susu").await?;
/// let stock = repo.available_stock(&product_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &ProductId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its URL slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = ?1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::UniqueViolation)` - Slug (or id) already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(slug = %product.slug, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, slug, image, price, count_in_stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.image)
        .bind(product.price.minor())
        .bind(product.count_in_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field == "products.slug" => {
                DbError::duplicate(field, &product.slug)
            }
            other => other,
        })?;

        Ok(product.clone())
    }

    /// Current stock level of a product.
    ///
    /// ## Returns
    /// * `Ok(Some(level))` - Product exists
    /// * `Ok(None)` - No such product
    pub async fn available_stock(&self, id: &ProductId) -> DbResult<Option<i64>> {
        debug!(product_id = %id, "Reading stock level");

        let level: Option<i64> =
            sqlx::query_scalar("SELECT count_in_stock FROM products WHERE id = ?1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(level)
    }

    /// Changes the stock level by `delta` and returns the new level.
    ///
    /// ## Delta Update
    /// ```text
    /// UPDATE products SET count_in_stock = MAX(count_in_stock + delta, 0)
    /// ```
    /// Applied in one statement so concurrent fulfilments don't lose
    /// updates. The level is clamped at zero: selling more than what is
    /// recorded empties the shelf instead of failing the order.
    ///
    /// ## Arguments
    /// * `id` - Product ID
    /// * `delta` - Change in stock (negative for fulfilment, positive for restocking)
    pub async fn adjust_stock(&self, id: &ProductId, delta: i64) -> DbResult<i64> {
        debug!(product_id = %id, delta = %delta, "Adjusting stock");

        let level: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET
                count_in_stock = MAX(count_in_stock + ?2, 0),
                updated_at = ?3
            WHERE id = ?1
            RETURNING count_in_stock
            "#,
        )
        .bind(id.as_str())
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        level.ok_or_else(|| DbError::not_found("Product", id.as_str()))
    }

    /// Counts catalogue products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> ProductId {
    ProductId::new(Uuid::new_v4().to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pasar_core::Money;

    fn product(id: &str, slug: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::from(id),
            name: format!("Produk {id}"),
            slug: slug.to_string(),
            image: Some(format!("/images/{slug}.jpg")),
            price: Money::from_minor(15_000),
            count_in_stock: stock,
            created_at: now,
            updated_at: now,
        }
    }

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        repo.insert(&product("A", "kopi-susu", 12)).await.unwrap();

        let by_id = repo.get_by_id(&ProductId::from("A")).await.unwrap().unwrap();
        assert_eq!(by_id.slug, "kopi-susu");
        assert_eq!(by_id.price, Money::from_minor(15_000));

        let by_slug = repo.get_by_slug("kopi-susu").await.unwrap().unwrap();
        assert_eq!(by_slug.id, ProductId::from("A"));

        assert!(repo.get_by_id(&ProductId::from("Z")).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug() {
        let repo = repo().await;
        repo.insert(&product("A", "kopi", 1)).await.unwrap();

        let err = repo.insert(&product("B", "kopi", 1)).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "products.slug");
                assert_eq!(value, "kopi");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let repo = repo().await;
        repo.insert(&product("B", "teh", 1)).await.unwrap();
        repo.insert(&product("A", "kopi", 1)).await.unwrap();

        let names: Vec<String> = repo
            .list(10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Produk A", "Produk B"]);
        assert_eq!(repo.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_available_stock() {
        let repo = repo().await;
        repo.insert(&product("A", "kopi", 5)).await.unwrap();

        assert_eq!(repo.available_stock(&ProductId::from("A")).await.unwrap(), Some(5));
        assert_eq!(repo.available_stock(&ProductId::from("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_adjust_stock_clamps_at_zero() {
        let repo = repo().await;
        let id = ProductId::from("A");
        repo.insert(&product("A", "kopi", 5)).await.unwrap();

        assert_eq!(repo.adjust_stock(&id, 3).await.unwrap(), 8);
        assert_eq!(repo.adjust_stock(&id, -10).await.unwrap(), 0);
        assert_eq!(repo.available_stock(&id).await.unwrap(), Some(0));

        let err = repo.adjust_stock(&ProductId::from("missing"), 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_product_id(), generate_product_id());
    }
}
