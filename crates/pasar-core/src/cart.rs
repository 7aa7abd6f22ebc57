//! # Cart
//!
//! The shopping cart aggregate and its transition function.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Transitions                               │
//! │                                                                         │
//! │  CartCommand                         CartState change                   │
//! │  ───────────                         ────────────────                   │
//! │                                                                         │
//! │  AddOrUpdate { item, qty, stock } ──► replace line in place, or push    │
//! │                                       (qty 0 behaves as Remove)         │
//! │                                                                         │
//! │  Remove { product_id } ─────────────► drop line (no-op if absent)       │
//! │                                                                         │
//! │  Clear ─────────────────────────────► items.clear()                     │
//! │                                                                         │
//! │  Every check runs before the first write: a failed command leaves the   │
//! │  cart equal by value to what it was.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock level arrives inside the command. Looking it up is the async
//! cart store's job (pasar-cart); this module only decides.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, ProductId};
use crate::validation::{validate_product_id, validate_unit_price};
use crate::{DEFAULT_MAX_CART_ITEMS, DEFAULT_MAX_ITEM_QUANTITY};

// =============================================================================
// Line Item
// =============================================================================

/// One distinct product in the cart.
///
/// ## Design Notes
/// - `product_id` is the line's identity; the cart holds at most one line per id
/// - `unit_price` is frozen when the line is added or updated, it is not
///   re-read from the catalogue on every render
/// - `name`, `slug` and `image` are display-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a single-unit line with no display extras.
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>, unit_price: Money) -> Self {
        LineItem {
            product_id: product_id.into(),
            name: name.into(),
            slug: String::new(),
            image: None,
            quantity: 1,
            unit_price,
        }
    }

    /// Creates a line from a catalogue product, freezing its current price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            quantity,
            unit_price: product.price,
        }
    }

    /// Sets the quantity (builder style).
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Limits
// =============================================================================

/// Size limits enforced on every add-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLimits {
    /// Maximum number of distinct lines.
    pub max_items: usize,

    /// Maximum quantity on a single line.
    pub max_item_quantity: i64,
}

impl Default for CartLimits {
    fn default() -> Self {
        CartLimits {
            max_items: DEFAULT_MAX_CART_ITEMS,
            max_item_quantity: DEFAULT_MAX_ITEM_QUANTITY,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Put `quantity` units of `item` in the cart. `available` is the live
    /// stock the caller obtained for `item.product_id`.
    AddOrUpdate {
        item: LineItem,
        quantity: i64,
        available: i64,
    },

    /// Drop the line for `product_id`, if any.
    Remove { product_id: ProductId },

    /// Empty the cart.
    Clear,
}

// =============================================================================
// Cart State
// =============================================================================

/// The cart aggregate.
///
/// ## Invariants
/// - At most one line per `product_id`
/// - Every quantity is > 0 (a zero quantity removes the line)
/// - At most `limits.max_items` lines, each with at most
///   `limits.max_item_quantity` units
/// - Insertion order is preserved; updates keep the line's position
/// - The cart total fits in [`Money`]
///
/// Only `Serialize` is derived: a saved cart comes back through
/// [`CartState::restore`], which re-checks every line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    items: Vec<LineItem>,

    #[serde(skip)]
    limits: CartLimits,
}

impl CartState {
    /// Creates an empty cart with default limits.
    pub fn new() -> Self {
        CartState::default()
    }

    /// Creates an empty cart with the given limits.
    pub fn with_limits(limits: CartLimits) -> Self {
        CartState {
            items: Vec::new(),
            limits,
        }
    }

    /// Rebuilds a cart from saved lines under `limits`.
    ///
    /// Every line passes the local add-or-update checks; stock is not
    /// consulted. Zero quantities and repeated product ids are rejected
    /// rather than merged.
    pub fn restore(limits: CartLimits, items: impl IntoIterator<Item = LineItem>) -> CoreResult<Self> {
        let mut cart = CartState::with_limits(limits);

        for item in items {
            if item.quantity <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                }
                .into());
            }
            if cart.contains(&item.product_id) {
                return Err(ValidationError::InvalidFormat {
                    field: "items".to_string(),
                    reason: format!("more than one line for {}", item.product_id),
                }
                .into());
            }

            cart.check_candidate(&item, item.quantity)?;
            cart.items.push(item);
        }

        Ok(cart)
    }

    pub fn limits(&self) -> CartLimits {
        self.limits
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up the line for a product.
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Applies a command atomically.
    ///
    /// ## Returns
    /// - `Ok(())` when the command was committed
    /// - `Err(CoreError)` with the cart untouched otherwise
    pub fn apply(&mut self, command: CartCommand) -> CoreResult<()> {
        match command {
            CartCommand::AddOrUpdate {
                item,
                quantity,
                available,
            } => self.add_or_update(item, quantity, available),
            CartCommand::Remove { product_id } => {
                self.remove(&product_id);
                Ok(())
            }
            CartCommand::Clear => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Runs every add-or-update rule that does not need the stock level.
    ///
    /// The cart store calls this before querying the stock oracle so that
    /// malformed input never costs a round-trip. A zero quantity always
    /// passes (it is a removal).
    pub fn check_candidate(&self, item: &LineItem, quantity: i64) -> CoreResult<()> {
        if quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if quantity == 0 {
            return Ok(());
        }

        validate_product_id(&item.product_id)?;
        validate_unit_price(item.unit_price)?;

        if quantity > self.limits.max_item_quantity {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: self.limits.max_item_quantity,
            });
        }

        if !self.contains(&item.product_id) && self.items.len() >= self.limits.max_items {
            return Err(CoreError::CartTooLarge {
                max: self.limits.max_items,
            });
        }

        self.check_total(item, quantity)
    }

    /// Rejects a line whose total, or the cart total with it, overflows.
    fn check_total(&self, item: &LineItem, quantity: i64) -> CoreResult<()> {
        let overflow = || ValidationError::OutOfRange {
            field: "totalPrice".to_string(),
            min: 0,
            max: i64::MAX,
        };

        let line_total = item
            .unit_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(overflow)?;

        self.items
            .iter()
            .filter(|i| i.product_id != item.product_id)
            .try_fold(line_total, |total, i| total.checked_add(i.line_total()))
            .ok_or_else(overflow)?;

        Ok(())
    }

    fn add_or_update(&mut self, item: LineItem, quantity: i64, available: i64) -> CoreResult<()> {
        self.check_candidate(&item, quantity)?;

        if quantity == 0 {
            self.remove(&item.product_id);
            return Ok(());
        }

        if quantity > available {
            return Err(CoreError::OutOfStock {
                product_id: item.product_id,
                available,
                requested: quantity,
            });
        }

        let item = item.with_quantity(quantity);
        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Removes the line for `product_id`. Returns whether a line was removed;
    /// removing an absent product is not an error.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of quantity × unit price.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-only view for checkout and API responses.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from(self)
    }
}

/// Pure transition: returns the next state and the error, if any.
///
/// On error the returned state equals `state`.
///
/// ## Usage
/// ```rust
/// use pasar_core::cart::{reduce, CartCommand, CartState, LineItem};
/// use pasar_core::Money;
///
/// let (cart, err) = reduce(
///     &CartState::new(),
///     CartCommand::AddOrUpdate {
///         item: LineItem::new("A", "Kopi", Money::from_minor(100)),
///         quantity: 2,
///         available: 5,
///     },
/// );
/// assert!(err.is_none());
/// assert_eq!(cart.total_price().minor(), 200);
/// ```
pub fn reduce(state: &CartState, command: CartCommand) -> (CartState, Option<CoreError>) {
    let mut next = state.clone();
    match next.apply(command) {
        Ok(()) => (next, None),
        Err(err) => (state.clone(), Some(err)),
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Cart contents plus totals, as handed to checkout and to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub total_quantity: i64,
    pub total_price: Money,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartState> for CartSnapshot {
    fn from(cart: &CartState) -> Self {
        CartSnapshot {
            items: cart.items.clone(),
            total_quantity: cart.total_quantity(),
            total_price: cart.total_price(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64) -> LineItem {
        LineItem::new(id, format!("Product {}", id), Money::from_minor(price))
    }

    fn add(cart: &mut CartState, id: &str, qty: i64, price: i64, available: i64) -> CoreResult<()> {
        cart.apply(CartCommand::AddOrUpdate {
            item: item(id, price),
            quantity: qty,
            available,
        })
    }

    fn quantities(cart: &CartState) -> Vec<(String, i64)> {
        cart.items()
            .iter()
            .map(|i| (i.product_id.to_string(), i.quantity))
            .collect()
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = CartState::new();

        add(&mut cart, "A", 2, 100, 5).unwrap();

        assert_eq!(cart.item_count(), 1);
        let line = cart.get(&ProductId::from("A")).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Money::from_minor(100));
        assert_eq!(cart.total_price().minor(), 200);
    }

    #[test]
    fn test_distinct_products_one_line_each() {
        let mut cart = CartState::new();
        for id in ["A", "B", "C", "D"] {
            add(&mut cart, id, 1, 10, 10).unwrap();
        }
        add(&mut cart, "B", 3, 10, 10).unwrap();

        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_same_product_overwrites_quantity_and_price_in_place() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();
        add(&mut cart, "B", 1, 30, 5).unwrap();

        add(&mut cart, "A", 4, 120, 5).unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.items()[0].product_id, ProductId::from("A"));
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(cart.items()[0].unit_price, Money::from_minor(120));
        assert_eq!(cart.items()[1].product_id, ProductId::from("B"));
    }

    #[test]
    fn test_out_of_stock_leaves_cart_unchanged() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();
        let before = cart.clone();

        let err = add(&mut cart, "A", 10, 100, 5).unwrap_err();

        assert_eq!(
            err,
            CoreError::OutOfStock {
                product_id: ProductId::from("A"),
                available: 5,
                requested: 10,
            }
        );
        assert_eq!(cart, before);
        assert_eq!(quantities(&cart), vec![("A".to_string(), 2)]);
    }

    #[test]
    fn test_quantity_equal_to_stock_is_allowed() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 5, 100, 5).unwrap();
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();

        add(&mut cart, "A", 0, 100, 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut cart = CartState::new();
        let err = add(&mut cart, "A", -1, 100, 5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_price_and_blank_id_rejected() {
        let mut cart = CartState::new();
        assert!(matches!(
            add(&mut cart, "A", 1, -5, 5),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            add(&mut cart, "  ", 1, 5, 5),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_free_item_allowed() {
        let mut cart = CartState::new();
        add(&mut cart, "GIFT", 1, 0, 1).unwrap();
        assert!(cart.total_price().is_zero());
    }

    #[test]
    fn test_limits() {
        let mut cart = CartState::with_limits(CartLimits {
            max_items: 2,
            max_item_quantity: 3,
        });

        assert_eq!(
            add(&mut cart, "A", 4, 10, 100),
            Err(CoreError::QuantityTooLarge {
                requested: 4,
                max: 3
            })
        );

        add(&mut cart, "A", 1, 10, 100).unwrap();
        add(&mut cart, "B", 1, 10, 100).unwrap();
        assert_eq!(
            add(&mut cart, "C", 1, 10, 100),
            Err(CoreError::CartTooLarge { max: 2 })
        );

        // Updating an existing line is fine at the line limit.
        add(&mut cart, "B", 3, 10, 100).unwrap();
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_line_total_overflow_rejected() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 1, 100, 5).unwrap();
        let before = cart.clone();

        let err = add(&mut cart, "B", 3, i64::MAX / 2, 5).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.total_price().minor(), 100);
    }

    #[test]
    fn test_cart_total_overflow_rejected() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 1, i64::MAX - 10, 5).unwrap();
        let before = cart.clone();

        // Each line fits on its own; the sum does not.
        let err = add(&mut cart, "B", 1, 20, 5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(cart, before);

        // Replacing the large line is judged without its old total.
        add(&mut cart, "A", 1, 20, 5).unwrap();
        assert_eq!(cart.total_price().minor(), 20);
    }

    #[test]
    fn test_restore() {
        let limits = CartLimits {
            max_items: 2,
            max_item_quantity: 5,
        };

        let cart = CartState::restore(limits, vec![item("A", 100).with_quantity(2), item("B", 50)]).unwrap();
        assert_eq!(quantities(&cart), vec![("A".to_string(), 2), ("B".to_string(), 1)]);
        assert_eq!(cart.limits(), limits);

        assert!(matches!(
            CartState::restore(limits, vec![item("A", 100).with_quantity(2), item("A", 100)]),
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            CartState::restore(limits, vec![item("A", 100).with_quantity(0)]),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert_eq!(
            CartState::restore(limits, vec![item("A", 1), item("B", 1), item("C", 1)]),
            Err(CoreError::CartTooLarge { max: 2 })
        );
        assert_eq!(
            CartState::restore(limits, vec![item("A", 1).with_quantity(6)]),
            Err(CoreError::QuantityTooLarge {
                requested: 6,
                max: 5
            })
        );
        assert!(CartState::restore(limits, vec![item("A", i64::MAX / 2).with_quantity(3)]).is_err());
    }

    #[test]
    fn test_remove() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();
        add(&mut cart, "B", 1, 100, 5).unwrap();

        assert!(cart.remove(&ProductId::from("A")));

        assert_eq!(quantities(&cart), vec![("B".to_string(), 1)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut once = CartState::new();
        add(&mut once, "A", 2, 100, 5).unwrap();
        add(&mut once, "B", 1, 100, 5).unwrap();
        let mut twice = once.clone();

        once.remove(&ProductId::from("A"));
        twice.remove(&ProductId::from("A"));
        assert!(!twice.remove(&ProductId::from("A")));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();

        cart.apply(CartCommand::Remove {
            product_id: ProductId::from("Z"),
        })
        .unwrap();

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 3, 50, 10).unwrap();
        add(&mut cart, "B", 2, 25, 10).unwrap();

        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.total_price(), Money::from_minor(200));
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 3, 50, 10).unwrap();
        add(&mut cart, "B", 2, 25, 10).unwrap();
        add(&mut cart, "A", 1, 60, 10).unwrap();
        cart.remove(&ProductId::from("B"));

        let expected_qty: i64 = cart.items().iter().map(|i| i.quantity).sum();
        let expected_price: i64 = cart
            .items()
            .iter()
            .map(|i| i.quantity * i.unit_price.minor())
            .sum();
        assert_eq!(cart.total_quantity(), expected_qty);
        assert_eq!(cart.total_price().minor(), expected_price);
        assert_eq!(cart.total_price().minor(), 60);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();
        assert!(!cart.is_empty());

        cart.apply(CartCommand::Clear).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert!(cart.total_price().is_zero());
    }

    #[test]
    fn test_reduce_returns_input_state_on_error() {
        let mut start = CartState::new();
        add(&mut start, "A", 2, 100, 5).unwrap();

        let (next, err) = reduce(
            &start,
            CartCommand::AddOrUpdate {
                item: item("A", 100),
                quantity: 10,
                available: 5,
            },
        );

        assert!(matches!(err, Some(CoreError::OutOfStock { .. })));
        assert_eq!(next, start);
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let start = CartState::new();
        let (next, err) = reduce(
            &start,
            CartCommand::AddOrUpdate {
                item: item("A", 100),
                quantity: 1,
                available: 1,
            },
        );

        assert!(err.is_none());
        assert!(start.is_empty());
        assert_eq!(next.item_count(), 1);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut cart = CartState::new();
        add(&mut cart, "A", 2, 100, 5).unwrap();

        let json = serde_json::to_value(cart.snapshot()).unwrap();

        assert_eq!(json["totalQuantity"], 2);
        assert_eq!(json["totalPrice"], 200);
        assert_eq!(json["items"][0]["productId"], "A");
        assert_eq!(json["items"][0]["unitPrice"], 100);
    }

    #[test]
    fn test_from_product_freezes_price() {
        let now = chrono::Utc::now();
        let mut product = Product {
            id: ProductId::from("A"),
            name: "Kopi Gayo".to_string(),
            slug: "kopi-gayo".to_string(),
            image: Some("/images/kopi.jpg".to_string()),
            price: Money::from_minor(100),
            count_in_stock: 5,
            created_at: now,
            updated_at: now,
        };
        let line = LineItem::from_product(&product, 2);
        product.price = Money::from_minor(999);

        assert_eq!(line.unit_price, Money::from_minor(100));
        assert_eq!(line.line_total(), Money::from_minor(200));
        assert_eq!(line.slug, "kopi-gayo");
    }
}
