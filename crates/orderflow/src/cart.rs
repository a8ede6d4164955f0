//! The cart store: the order-in-progress.
//!
//! An ordered mapping from item id to line entry. Insertion order is
//! preserved for surviving lines; re-adding an item that is still present
//! bumps its quantity in place without moving it. The total is derived on
//! every read, never cached.

use rust_decimal::Decimal;

use tableside_core::{CartLine, CurrencyCode, ItemId, MenuItem, format_price};

/// Holds the current order-in-progress line items.
///
/// Invariant: every present line has quantity >= 1; a line whose quantity
/// would drop to 0 is removed entirely.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one of `item`. Increments the existing line if the item is
    /// already present, otherwise appends a new line with quantity 1.
    pub fn add_item(&mut self, item: &MenuItem) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            });
        }
    }

    /// Remove one of the item with `id`. Deletes the line when its quantity
    /// reaches 0. No-op when the id is absent.
    pub fn remove_item(&mut self, id: &ItemId) {
        let Some(index) = self.lines.iter().position(|line| &line.item.id == id) else {
            return;
        };

        if let Some(line) = self.lines.get_mut(index) {
            if line.quantity > 1 {
                line.quantity -= 1;
            } else {
                self.lines.remove(index);
            }
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Ordered line entries.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Owned copy of the current lines, for order-draft snapshots.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// Derived total: sum of price x quantity. Recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Display views
// =============================================================================

/// Cart line display data, flattened for UI consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub id: ItemId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// Formatted unit price, e.g. "$8.99".
    pub price: String,
    /// Formatted price x quantity.
    pub line_total: String,
}

/// Cart display data for UI consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    /// Formatted derived total.
    pub total: String,
    /// Total units across all lines.
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            total: format_price(Decimal::ZERO, currency),
            item_count: 0,
        }
    }

    /// Render the current cart contents.
    #[must_use]
    pub fn from_store(cart: &CartStore, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    id: line.item.id.clone(),
                    name: line.item.name.clone(),
                    image: line.item.image.clone(),
                    quantity: line.quantity,
                    price: format_price(line.item.price, currency),
                    line_total: format_price(line.line_total(), currency),
                })
                .collect(),
            total: format_price(cart.total(), currency),
            item_count: cart.lines().iter().map(|line| line.quantity).sum(),
        }
    }
}
