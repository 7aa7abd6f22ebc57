//! # Order Repository
//!
//! Order headers for the admin orders screen.
//!
//! ## Orders Outlive Users
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders.user_id ──► users.id   (ON DELETE SET NULL)                    │
//! │                                                                         │
//! │  list_summaries():                                                     │
//! │    orders LEFT JOIN users  ──►  user_name = NULL for deleted users     │
//! │    ORDER BY created_at DESC                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pasar_core::{Money, OrderSummary};

/// An order about to be inserted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<String>,
    pub total_price: Money,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// An unpaid, undelivered order placed now.
    pub fn new(user_id: impl Into<String>, total_price: Money) -> Self {
        NewOrder {
            user_id: Some(user_id.into()),
            total_price,
            paid_at: None,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the order paid at `at`.
    pub fn paid(mut self, at: DateTime<Utc>) -> Self {
        self.paid_at = Some(at);
        self
    }

    /// Marks the order delivered at `at`.
    pub fn delivered(mut self, at: DateTime<Utc>) -> Self {
        self.delivered_at = Some(at);
        self
    }
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and returns its generated id.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - `user_id` names no user
    pub async fn insert(&self, order: &NewOrder) -> DbResult<String> {
        debug!(total = %order.total_price, "Inserting order");

        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, total_price, is_paid, paid_at, is_delivered, delivered_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&order.user_id)
        .bind(order.total_price.minor())
        .bind(order.paid_at.is_some())
        .bind(order.paid_at)
        .bind(order.delivered_at.is_some())
        .bind(order.delivered_at)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Rows for the admin orders screen, newest first.
    pub async fn list_summaries(&self) -> DbResult<Vec<OrderSummary>> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id,
                u.name AS user_name,
                o.total_price,
                o.is_paid,
                o.paid_at,
                o.is_delivered,
                o.delivered_at,
                o.created_at
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Deletes an order.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
