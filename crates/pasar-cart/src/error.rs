//! # Cart Service Errors
//!
//! Error types for the session cart service.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      What the Shopper Sees                              │
//! │                                                                         │
//! │  CartError::OutOfStock         "Only 5 left", quantity not changed     │
//! │  CartError::OracleUnavailable  "Try again", quantity not changed       │
//! │  CartError::EmptyCart          checkout button disabled                │
//! │  CartError::Rejected           bad input (negative qty, cart full...)  │
//! │                                                                         │
//! │  OracleError   ── raised by StockOracle adapters, never leaves the     │
//! │                   store: it becomes CartError::OracleUnavailable       │
//! │  ConfigError   ── loading pasar.toml                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant leaves the cart exactly as it was before the call.

use thiserror::Error;

use pasar_core::{CoreError, ProductId};
use pasar_db::DbError;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Cart Error
// =============================================================================

/// Failure of a cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The oracle reported fewer units than requested.
    #[error("Out of stock for {product_id}: available {available}, requested {requested}")]
    OutOfStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The oracle failed or did not answer in time.
    #[error("Stock check for {product_id} unavailable: {reason}")]
    OracleUnavailable { product_id: ProductId, reason: String },

    /// Checkout was requested for an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Input or limit violation caught before the oracle was asked.
    #[error(transparent)]
    Rejected(CoreError),
}

impl CartError {
    /// True when repeating the same call later may succeed unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CartError::OracleUnavailable { .. })
    }
}

impl From<CoreError> for CartError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OutOfStock {
                product_id,
                available,
                requested,
            } => CartError::OutOfStock {
                product_id,
                available,
                requested,
            },
            other => CartError::Rejected(other),
        }
    }
}

// =============================================================================
// Oracle Error
// =============================================================================

/// Failure reported by a [`StockOracle`](crate::oracle::StockOracle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The backing store could not be reached.
    #[error("Stock source unavailable: {0}")]
    Unavailable(String),

    /// The backing store answered with something unusable.
    #[error("Invalid stock answer: {0}")]
    InvalidResponse(String),
}

impl From<DbError> for OracleError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            OracleError::Unavailable(err.to_string())
        } else {
            OracleError::InvalidResponse(err.to_string())
        }
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Failure to load the cart configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`CartConfig`](crate::config::CartConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("Invalid cart configuration: {0}")]
    Invalid(String),
}
