//! # Stock Oracle
//!
//! The port the cart asks for live stock, and an in-memory adapter.
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Add-or-Update, One Question                      │
//! │                                                                         │
//! │  CartStore                         StockOracle                          │
//! │     │  available_stock(&id) ──────────►│                                │
//! │     │                                  │  catalogue, warehouse API ...  │
//! │     │◄──────────── Ok(level) ──────────│                                │
//! │     │◄──────────── Err(OracleError) ───│  → CartError::OracleUnavailable│
//! │     │     (no answer in time)          │  → CartError::OracleUnavailable│
//! │                                                                         │
//! │  The answer is a snapshot: nothing is reserved, and a level can be     │
//! │  stale by the time the order is placed.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations:
//! - [`InMemoryStockOracle`] - Fixed levels, for tests and demos
//! - [`CatalogStockOracle`](crate::catalog::CatalogStockOracle) - Reads
//!   `count_in_stock` from the product catalogue

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use pasar_core::ProductId;

use crate::error::OracleError;

// =============================================================================
// Port
// =============================================================================

/// Answers "how many units of this product can be sold right now?".
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Current sellable quantity of `product_id`.
    ///
    /// An unknown product has zero stock; that is an answer, not an error.
    /// Errors are reserved for the source being unreachable.
    async fn available_stock(&self, product_id: &ProductId) -> Result<i64, OracleError>;
}

// =============================================================================
// In-Memory Adapter
// =============================================================================

/// Stock oracle backed by a map, with failure injection.
///
/// ## Usage
/// ```rust,ignore
/// let oracle = InMemoryStockOracle::new().with_stock("A", 5);
///
/// assert_eq!(oracle.available_stock(&ProductId::from("A")).await, Ok(5));
/// assert_eq!(oracle.available_stock(&ProductId::from("B")).await, Ok(0));
///
/// oracle.set_unavailable(true);   // every query now fails
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStockOracle {
    levels: RwLock<HashMap<ProductId, i64>>,
    unavailable: AtomicBool,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
}

impl InMemoryStockOracle {
    pub fn new() -> Self {
        InMemoryStockOracle::default()
    }

    /// Sets a level (builder style).
    pub fn with_stock(self, product_id: impl Into<ProductId>, level: i64) -> Self {
        self.set_stock(product_id, level);
        self
    }

    /// Sets the level reported for `product_id`.
    pub fn set_stock(&self, product_id: impl Into<ProductId>, level: i64) {
        self.levels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product_id.into(), level);
    }

    /// While set, every query fails with [`OracleError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes every query wait `delay` before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Number of queries received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StockOracle for InMemoryStockOracle {
    async fn available_stock(&self, product_id: &ProductId) -> Result<i64, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(OracleError::Unavailable(
                "in-memory oracle switched off".to_string(),
            ));
        }

        let level = self
            .levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(product_id)
            .copied()
            .unwrap_or(0);

        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_levels_and_unknown_products() {
        let oracle = InMemoryStockOracle::new().with_stock("A", 5);
        oracle.set_stock("B", 2);

        assert_eq!(oracle.available_stock(&ProductId::from("A")).await, Ok(5));
        assert_eq!(oracle.available_stock(&ProductId::from("B")).await, Ok(2));
        assert_eq!(oracle.available_stock(&ProductId::from("C")).await, Ok(0));
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let oracle = InMemoryStockOracle::new().with_stock("A", 5);
        oracle.set_unavailable(true);

        let result = oracle.available_stock(&ProductId::from("A")).await;
        assert!(matches!(result, Err(OracleError::Unavailable(_))));

        oracle.set_unavailable(false);
        assert_eq!(oracle.available_stock(&ProductId::from("A")).await, Ok(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let oracle = InMemoryStockOracle::new().with_stock("A", 5);
        oracle.set_delay(Some(Duration::from_secs(2)));

        let start = tokio::time::Instant::now();
        assert_eq!(oracle.available_stock(&ProductId::from("A")).await, Ok(5));
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
