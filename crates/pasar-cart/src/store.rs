//! # Cart Store
//!
//! One shopper's cart behind an async lock, with the stock check wired in.
//!
//! ## Add-or-Update Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    add_or_update(item, qty)                             │
//! │                                                                         │
//! │  lock cart ─────────────────────────────────────────────┐ (held until  │
//! │     │                                                    │  the end)    │
//! │     ▼                                                    │              │
//! │  local checks (qty, price, id, limits) ── fail ──► Rejected            │
//! │     │                                                    │              │
//! │     ├── qty == 0 ──► remove line, no oracle call         │              │
//! │     ▼                                                    │              │
//! │  oracle.available_stock(id)  bounded by oracle_timeout   │              │
//! │     │        └── error / timeout ──► OracleUnavailable   │              │
//! │     ▼                                                    │              │
//! │  apply AddOrUpdate { available } ── qty > available ──► OutOfStock     │
//! │     │                                                    │              │
//! │     ▼                                                    │              │
//! │  snapshot ◄──────────────────────────────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is a `tokio::sync::Mutex` held across the oracle await: other
//! mutations and reads of the same cart wait, so no state with an unchecked
//! quantity is ever observable. Every error leaves the cart as it was.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use pasar_core::{CartCommand, CartSnapshot, CartState, LineItem, Money, ProductId};

use crate::config::CartConfig;
use crate::error::{CartError, CartResult, ConfigResult};
use crate::oracle::StockOracle;

/// A shopper's cart.
pub struct CartStore {
    state: Mutex<CartState>,
    oracle: Arc<dyn StockOracle>,
    oracle_timeout: Duration,
    revalidate_on_checkout: bool,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("oracle_timeout", &self.oracle_timeout)
            .field("revalidate_on_checkout", &self.revalidate_on_checkout)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Creates an empty cart using `config`'s limits and timeout.
    ///
    /// ## Errors
    /// - [`ConfigError::Invalid`](crate::error::ConfigError::Invalid) - `config` fails [`CartConfig::validate`]
    pub fn new(oracle: Arc<dyn StockOracle>, config: &CartConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(CartStore::from_validated(oracle, config))
    }

    /// Builds a store from a config the caller has already validated.
    pub(crate) fn from_validated(oracle: Arc<dyn StockOracle>, config: &CartConfig) -> Self {
        CartStore {
            state: Mutex::new(CartState::with_limits(config.limits())),
            oracle,
            oracle_timeout: config.oracle_timeout(),
            revalidate_on_checkout: config.revalidate_on_checkout,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Sets the quantity of `item` in the cart, adding the line if needed.
    ///
    /// `item`'s price and display attributes replace those of an existing
    /// line, which keeps its position. A zero quantity removes the line.
    ///
    /// ## Errors
    /// - [`CartError::Rejected`] - bad input or a cart limit, oracle not asked
    /// - [`CartError::OracleUnavailable`] - oracle failed or timed out
    /// - [`CartError::OutOfStock`] - oracle reported fewer units
    pub async fn add_or_update(&self, item: LineItem, quantity: i64) -> CartResult<CartSnapshot> {
        debug!(product_id = %item.product_id, quantity = %quantity, "add_or_update");

        let mut cart = self.state.lock().await;

        cart.check_candidate(&item, quantity)?;

        if quantity == 0 {
            cart.remove(&item.product_id);
            return Ok(cart.snapshot());
        }

        let available = self.query_stock(&item.product_id).await?;

        cart.apply(CartCommand::AddOrUpdate {
            item,
            quantity,
            available,
        })?;

        Ok(cart.snapshot())
    }

    /// Replaces the cart with previously saved lines.
    ///
    /// Every line is checked against this store's limits the way an
    /// add-or-update is; stock is left to the checkout re-check. On error
    /// the cart is unchanged.
    pub async fn restore(&self, items: Vec<LineItem>) -> CartResult<CartSnapshot> {
        let mut cart = self.state.lock().await;

        let restored = CartState::restore(cart.limits(), items)?;
        debug!(items = restored.item_count(), "restore_cart");

        *cart = restored;
        Ok(cart.snapshot())
    }

    /// Removes the line for `product_id`. Removing an absent product is a
    /// no-op.
    pub async fn remove(&self, product_id: &ProductId) -> CartSnapshot {
        debug!(product_id = %product_id, "remove_from_cart");

        let mut cart = self.state.lock().await;
        cart.remove(product_id);
        cart.snapshot()
    }

    /// Empties the cart.
    pub async fn clear(&self) -> CartSnapshot {
        debug!("clear_cart");

        let mut cart = self.state.lock().await;
        cart.clear();
        cart.snapshot()
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub async fn snapshot(&self) -> CartSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn total_quantity(&self) -> i64 {
        self.state.lock().await.total_quantity()
    }

    pub async fn total_price(&self) -> Money {
        self.state.lock().await.total_price()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Snapshot to hand to the checkout trigger.
    ///
    /// With `revalidate_on_checkout`, every line is checked against the
    /// oracle again and the first line that no longer fits fails the call.
    /// The cart is never modified here; the shopper decides what to change.
    pub async fn checkout_snapshot(&self) -> CartResult<CartSnapshot> {
        let cart = self.state.lock().await;

        if cart.is_empty() {
            return Err(CartError::EmptyCart);
        }

        if self.revalidate_on_checkout {
            for item in cart.items() {
                let available = self.query_stock(&item.product_id).await?;
                if item.quantity > available {
                    return Err(CartError::OutOfStock {
                        product_id: item.product_id.clone(),
                        available,
                        requested: item.quantity,
                    });
                }
            }
        }

        debug!(
            items = cart.item_count(),
            total = %cart.total_price(),
            "Checkout snapshot ready"
        );
        Ok(cart.snapshot())
    }

    /// Empties the cart once the checkout trigger reported success.
    pub async fn complete_checkout(&self) {
        let mut cart = self.state.lock().await;
        info!(
            items = cart.item_count(),
            total = %cart.total_price(),
            "Checkout completed, clearing cart"
        );
        cart.clear();
    }

    // =========================================================================
    // Oracle
    // =========================================================================

    async fn query_stock(&self, product_id: &ProductId) -> CartResult<i64> {
        match tokio::time::timeout(self.oracle_timeout, self.oracle.available_stock(product_id))
            .await
        {
            Ok(Ok(available)) => {
                debug!(product_id = %product_id, available = %available, "Stock level received");
                Ok(available)
            }
            Ok(Err(e)) => Err(CartError::OracleUnavailable {
                product_id: product_id.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CartError::OracleUnavailable {
                product_id: product_id.clone(),
                reason: format!("no answer within {} ms", self.oracle_timeout.as_millis()),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::InMemoryStockOracle;
    use crate::error::ConfigError;
    use pasar_core::{CoreError, ValidationError};

    fn item(id: &str, price: i64) -> LineItem {
        LineItem::new(id, format!("Produk {id}"), Money::from_minor(price))
    }

    fn store_with(oracle: &Arc<InMemoryStockOracle>, config: &CartConfig) -> CartStore {
        CartStore::new(oracle.clone(), config).unwrap()
    }

    fn setup() -> (Arc<InMemoryStockOracle>, CartStore) {
        let oracle = Arc::new(
            InMemoryStockOracle::new()
                .with_stock("A", 5)
                .with_stock("B", 10),
        );
        let store = store_with(&oracle, &CartConfig::default());
        (oracle, store)
    }

    fn lines(snapshot: &CartSnapshot) -> Vec<(&str, i64, i64)> {
        snapshot
            .items
            .iter()
            .map(|i| (i.product_id.as_str(), i.quantity, i.unit_price.minor()))
            .collect()
    }

    #[tokio::test]
    async fn test_add_to_empty_cart() {
        let (_, store) = setup();

        let snapshot = store.add_or_update(item("A", 100), 2).await.unwrap();

        assert_eq!(lines(&snapshot), vec![("A", 2, 100)]);
        assert_eq!(snapshot.total_price, Money::from_minor(200));
        assert_eq!(store.total_quantity().await, 2);
        assert_eq!(store.total_price().await, Money::from_minor(200));
    }

    #[tokio::test]
    async fn test_update_replaces_quantity_and_price() {
        let (_, store) = setup();
        store.add_or_update(item("A", 100), 2).await.unwrap();
        store.add_or_update(item("B", 25), 1).await.unwrap();

        let snapshot = store.add_or_update(item("A", 90), 4).await.unwrap();

        assert_eq!(lines(&snapshot), vec![("A", 4, 90), ("B", 1, 25)]);
    }

    #[tokio::test]
    async fn test_out_of_stock_leaves_cart_unchanged() {
        let (_, store) = setup();
        store.add_or_update(item("A", 100), 2).await.unwrap();
        let before = store.snapshot().await;

        let err = store.add_or_update(item("A", 100), 10).await.unwrap_err();

        assert_eq!(
            err,
            CartError::OutOfStock {
                product_id: ProductId::from("A"),
                available: 5,
                requested: 10,
            }
        );
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_unknown_product_is_out_of_stock() {
        let (_, store) = setup();

        let err = store.add_or_update(item("Z", 100), 1).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { available: 0, .. }));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_failure_is_unavailable() {
        let (oracle, store) = setup();
        store.add_or_update(item("A", 100), 2).await.unwrap();
        oracle.set_unavailable(true);

        let err = store.add_or_update(item("A", 100), 3).await.unwrap_err();

        assert!(matches!(err, CartError::OracleUnavailable { .. }));
        assert!(err.is_retryable());
        assert_eq!(lines(&store.snapshot().await), vec![("A", 2, 100)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_oracle_times_out() {
        let oracle = Arc::new(InMemoryStockOracle::new().with_stock("A", 5));
        let config = CartConfig {
            oracle_timeout_ms: 3000,
            ..CartConfig::default()
        };
        let store = store_with(&oracle, &config);
        oracle.set_delay(Some(Duration::from_secs(10)));

        let err = store.add_or_update(item("A", 100), 1).await.unwrap_err();

        match err {
            CartError::OracleUnavailable { product_id, reason } => {
                assert_eq!(product_id, ProductId::from("A"));
                assert_eq!(reason, "no answer within 3000 ms");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_wait_for_pending_check() {
        let (oracle, store) = setup();
        oracle.set_delay(Some(Duration::from_millis(500)));

        let (added, seen) = tokio::join!(store.add_or_update(item("A", 100), 2), store.snapshot());

        added.unwrap();
        assert_eq!(lines(&seen), vec![("A", 2, 100)]);
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_without_oracle() {
        let (oracle, store) = setup();
        store.add_or_update(item("A", 100), 2).await.unwrap();
        store.add_or_update(item("B", 25), 1).await.unwrap();
        let calls = oracle.calls();

        let snapshot = store.add_or_update(item("A", 100), 0).await.unwrap();

        assert_eq!(lines(&snapshot), vec![("B", 1, 25)]);
        assert_eq!(oracle.calls(), calls);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_oracle() {
        let (oracle, store) = setup();

        let err = store.add_or_update(item("A", 100), -1).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Rejected(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let err = store.add_or_update(item("A", -5), 1).await.unwrap_err();
        assert!(matches!(err, CartError::Rejected(CoreError::Validation(_))));

        let err = store.add_or_update(item("  ", 100), 1).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Rejected(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let err = store.add_or_update(item("A", 100), 1000).await.unwrap_err();
        assert!(matches!(err, CartError::Rejected(CoreError::QuantityTooLarge { .. })));

        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_total_overflow_rejected_before_oracle() {
        let (oracle, store) = setup();
        store.add_or_update(item("B", 25), 1).await.unwrap();
        let before = store.snapshot().await;
        let calls = oracle.calls();

        let err = store
            .add_or_update(LineItem::new("A", "Mahal", Money::from_minor(i64::MAX / 2)), 3)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CartError::Rejected(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(oracle.calls(), calls);
        assert_eq!(store.snapshot().await, before);
        assert_eq!(store.total_price().await, Money::from_minor(25));
        assert!(store.checkout_snapshot().await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let oracle: Arc<InMemoryStockOracle> = Arc::new(InMemoryStockOracle::new());

        for config in [
            CartConfig {
                oracle_timeout_ms: 0,
                ..CartConfig::default()
            },
            CartConfig {
                max_item_quantity: 0,
                ..CartConfig::default()
            },
        ] {
            assert!(matches!(
                CartStore::new(oracle.clone(), &config),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_restore_applies_limits_and_rejects_bad_lines() {
        let oracle = Arc::new(InMemoryStockOracle::new().with_stock("A", 5).with_stock("B", 5));
        let config = CartConfig {
            max_items: 1,
            ..CartConfig::default()
        };
        let store = store_with(&oracle, &config);
        store.add_or_update(item("A", 100), 1).await.unwrap();
        let before = store.snapshot().await;

        let saved: Vec<LineItem> = serde_json::from_str(
            r#"[
                {"productId": "A", "name": "Kopi", "slug": "", "image": null, "quantity": 2, "unitPrice": 100},
                {"productId": "A", "name": "Kopi", "slug": "", "image": null, "quantity": 0, "unitPrice": 100}
            ]"#,
        )
        .unwrap();
        assert!(matches!(
            store.restore(saved).await,
            Err(CartError::Rejected(CoreError::Validation(_)))
        ));

        let err = store
            .restore(vec![item("A", 100), item("B", 100)])
            .await
            .unwrap_err();
        assert_eq!(err, CartError::Rejected(CoreError::CartTooLarge { max: 1 }));
        assert_eq!(store.snapshot().await, before);

        let snapshot = store.restore(vec![item("B", 40).with_quantity(2)]).await.unwrap();
        assert_eq!(lines(&snapshot), vec![("B", 2, 40)]);

        // Restored carts keep the configured line limit.
        let err = store.add_or_update(item("A", 100), 1).await.unwrap_err();
        assert_eq!(err, CartError::Rejected(CoreError::CartTooLarge { max: 1 }));
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_cart_limit() {
        let oracle = Arc::new(
            InMemoryStockOracle::new()
                .with_stock("A", 5)
                .with_stock("B", 5),
        );
        let config = CartConfig {
            max_items: 1,
            ..CartConfig::default()
        };
        let store = store_with(&oracle, &config);
        store.add_or_update(item("A", 100), 1).await.unwrap();

        let err = store.add_or_update(item("B", 100), 1).await.unwrap_err();
        assert_eq!(err, CartError::Rejected(CoreError::CartTooLarge { max: 1 }));

        // Updating the existing line is still allowed.
        store.add_or_update(item("A", 100), 3).await.unwrap();
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (_, store) = setup();
        store.add_or_update(item("A", 100), 2).await.unwrap();
        store.add_or_update(item("B", 25), 1).await.unwrap();

        let once = store.remove(&ProductId::from("A")).await;
        let twice = store.remove(&ProductId::from("A")).await;

        assert_eq!(lines(&once), vec![("B", 1, 25)]);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_clear() {
        let (_, store) = setup();
        store.add_or_update(item("A", 100), 2).await.unwrap();

        let snapshot = store.clear().await;
        assert!(snapshot.is_empty());
        assert_eq!(store.total_quantity().await, 0);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let (_, store) = setup();
        assert_eq!(store.checkout_snapshot().await, Err(CartError::EmptyCart));
    }

    #[tokio::test]
    async fn test_checkout_revalidates_stock() {
        let (oracle, store) = setup();
        store.add_or_update(item("A", 50), 3).await.unwrap();
        store.add_or_update(item("B", 25), 2).await.unwrap();

        let snapshot = store.checkout_snapshot().await.unwrap();
        assert_eq!(snapshot.total_quantity, 5);
        assert_eq!(snapshot.total_price, Money::from_minor(200));

        oracle.set_stock("A", 1);
        let err = store.checkout_snapshot().await.unwrap_err();
        assert_eq!(
            err,
            CartError::OutOfStock {
                product_id: ProductId::from("A"),
                available: 1,
                requested: 3,
            }
        );
        // The shopper decides what to change.
        assert_eq!(store.total_quantity().await, 5);

        oracle.set_unavailable(true);
        assert!(matches!(
            store.checkout_snapshot().await,
            Err(CartError::OracleUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_checkout_without_revalidation() {
        let oracle = Arc::new(InMemoryStockOracle::new().with_stock("A", 5));
        let config = CartConfig {
            revalidate_on_checkout: false,
            ..CartConfig::default()
        };
        let store = store_with(&oracle, &config);
        store.add_or_update(item("A", 50), 3).await.unwrap();
        oracle.set_stock("A", 0);
        let calls = oracle.calls();

        assert!(store.checkout_snapshot().await.is_ok());
        assert_eq!(oracle.calls(), calls);
    }

    #[tokio::test]
    async fn test_complete_checkout_clears() {
        let (_, store) = setup();
        store.add_or_update(item("A", 50), 3).await.unwrap();
        store.checkout_snapshot().await.unwrap();

        store.complete_checkout().await;
        assert!(store.snapshot().await.is_empty());
    }
}
