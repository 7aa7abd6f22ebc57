//! # Cart Sessions
//!
//! Registry of live carts, one per shopper session.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartSessions                                                          │
//! │  ├── "sess-1" ──► Arc<CartStore>  (own lock)                           │
//! │  ├── "sess-2" ──► Arc<CartStore>  (own lock)                           │
//! │  └── ...                                                               │
//! │                                                                         │
//! │  The registry lock is only held to look up or insert a store; a slow   │
//! │  stock check in one session never blocks another.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::CartConfig;
use crate::error::ConfigResult;
use crate::oracle::StockOracle;
use crate::store::CartStore;

/// Owns the cart of every active session.
pub struct CartSessions {
    carts: RwLock<HashMap<String, Arc<CartStore>>>,
    oracle: Arc<dyn StockOracle>,
    config: CartConfig,
}

impl CartSessions {
    /// Creates an empty registry; every cart it creates shares `oracle`
    /// and `config`. Fails if `config` does not validate.
    pub fn new(oracle: Arc<dyn StockOracle>, config: CartConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(CartSessions {
            carts: RwLock::new(HashMap::new()),
            oracle,
            config,
        })
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// The cart of `session_id`, created empty on first use.
    pub async fn cart(&self, session_id: &str) -> Arc<CartStore> {
        if let Some(cart) = self.carts.read().await.get(session_id) {
            return Arc::clone(cart);
        }

        let mut carts = self.carts.write().await;
        let cart = carts.entry(session_id.to_string()).or_insert_with(|| {
            debug!(session_id = %session_id, "Creating cart for session");
            Arc::new(CartStore::from_validated(Arc::clone(&self.oracle), &self.config))
        });
        Arc::clone(cart)
    }

    /// Drops the cart of `session_id`. Returns whether one existed.
    ///
    /// Holders of the `Arc` keep a working cart; it is just no longer
    /// reachable through the registry.
    pub async fn discard(&self, session_id: &str) -> bool {
        let removed = self.carts.write().await.remove(session_id).is_some();
        if removed {
            debug!(session_id = %session_id, "Discarded session cart");
        }
        removed
    }

    /// Number of live carts.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}
