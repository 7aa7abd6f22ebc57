//! # pasar-core: Pure Business Logic for the Pasar Storefront
//!
//! This crate holds the storefront logic that carries invariants, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pasar Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront / Admin frontend                  │   │
//! │  │    Cart page ──► Checkout      Admin orders / users screens     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               pasar-cart (session carts, stock oracle)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pasar-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   money   │  │   admin   │  │ validation│  │   │
//! │  │   │ CartState │  │   Money   │  │ ListState │  │   rules   │  │   │
//! │  │   │ LineItem  │  │           │  │ListAction │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pasar-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart aggregate, commands, transition function, snapshot
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`admin`] - Admin list-screen state machine
//! - [`types`] - Catalogue and admin types (Product, OrderSummary, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Cart and account form validation
//!
//! ## Example Usage
//!
//! ```rust
//! use pasar_core::cart::{CartCommand, CartState, LineItem};
//! use pasar_core::Money;
//!
//! let mut cart = CartState::new();
//! cart.apply(CartCommand::AddOrUpdate {
//!     item: LineItem::new("A", "Kopi", Money::from_minor(50)),
//!     quantity: 3,
//!     available: 10,
//! })
//! .unwrap();
//! cart.apply(CartCommand::AddOrUpdate {
//!     item: LineItem::new("B", "Teh", Money::from_minor(25)),
//!     quantity: 2,
//!     available: 10,
//! })
//! .unwrap();
//!
//! assert_eq!(cart.total_quantity(), 5);
//! assert_eq!(cart.total_price().minor(), 200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartCommand, CartLimits, CartSnapshot, CartState, LineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default maximum number of distinct products in one cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps checkout payloads reasonable.
/// Overridable through `CartLimits`.
pub const DEFAULT_MAX_CART_ITEMS: usize = 100;

/// Default maximum quantity of a single product in the cart.
///
/// ## Business Reason
/// Catches typos (1000 instead of 10) before the stock oracle is even asked.
pub const DEFAULT_MAX_ITEM_QUANTITY: i64 = 999;
