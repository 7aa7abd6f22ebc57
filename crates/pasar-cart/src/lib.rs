//! # pasar-cart: Session Carts for the Pasar Storefront
//!
//! Holds one cart per shopper session and runs the stock-check protocol:
//! an add-or-update only commits after the stock oracle confirmed the
//! quantity is available.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pasar Cart Flow                                  │
//! │                                                                         │
//! │  Storefront request (session id, product, quantity)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pasar-cart (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │  CartSessions ──► CartStore (per session, Mutex<CartState>)     │   │
//! │  │                       │                                         │   │
//! │  │                       ├──► StockOracle (port)                   │   │
//! │  │                       │      ├── CatalogStockOracle (pasar-db)  │   │
//! │  │                       │      └── InMemoryStockOracle            │   │
//! │  │                       │                                         │   │
//! │  │                       └──► CartState::apply (pasar-core)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartSnapshot ──► frontend / checkout trigger                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - One cart behind an async lock, stock check included
//! - [`sessions`] - Session id → cart registry
//! - [`oracle`] - `StockOracle` port and in-memory adapter
//! - [`catalog`] - `StockOracle` over the product catalogue
//! - [`config`] - Limits, timeout, checkout re-validation
//! - [`error`] - `CartError`, `OracleError`, `ConfigError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pasar_cart::{CartConfig, CartSessions, CatalogStockOracle};
//! use pasar_db::Database;
//!
//! let config = CartConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let sessions = CartSessions::new(Arc::new(CatalogStockOracle::new(db)), config)?;
//!
//! let cart = sessions.cart(&session_id).await;
//! let snapshot = cart.add_or_update(LineItem::from_product(&product, 1), 2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod oracle;
pub mod sessions;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogStockOracle;
pub use config::CartConfig;
pub use error::{CartError, CartResult, ConfigError, ConfigResult, OracleError};
pub use oracle::{InMemoryStockOracle, StockOracle};
pub use sessions::CartSessions;
pub use store::CartStore;
