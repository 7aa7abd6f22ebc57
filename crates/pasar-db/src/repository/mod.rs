//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Stock oracle / admin screen                                           │
//! │       │                                                                 │
//! │       │  db.products().available_stock(&id)                            │
//! │       │  db.orders().list_summaries()                                  │
//! │       ▼                                                                 │
//! │  ProductRepository   UserRepository   OrderRepository                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  SQL lives here and nowhere else; callers see pasar-core types.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue and stock levels
//! - [`UserRepository`](user::UserRepository) - Accounts and profile updates
//! - [`OrderRepository`](order::OrderRepository) - Order headers for the admin screen

pub mod order;
pub mod product;
pub mod user;
