use serde::{Deserialize, Serialize};

use crate::domain::menu::MenuItem;

/// Sales tax applied at checkout, in percent.
pub const TAX_RATE_PERCENT: i64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total_cents(&self) -> i64 {
        self.item.price_cents.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl Totals {
    pub fn from_subtotal(subtotal_cents: i64) -> Self {
        // Half-up rounding to the cent; amounts saturate instead of wrapping.
        let tax = (i128::from(subtotal_cents) * i128::from(TAX_RATE_PERCENT) + 50) / 100;
        let tax_cents = i64::try_from(tax).unwrap_or(i64::MAX);
        Self {
            subtotal_cents,
            tax_cents,
            total_cents: subtotal_cents.saturating_add(tax_cents),
        }
    }
}

/// Selected items keyed by menu item id, in insertion order.
///
/// Holds at most one entry per item id and never an entry with a quantity
/// below one: removal deletes the entry instead of zeroing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: &MenuItem) {
        match self.items.iter_mut().find(|ci| ci.item.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                item: item.clone(),
                quantity: 1,
            }),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|ci| ci.item.id != id);
    }

    /// Shifts the quantity of `id` by `delta`, never going below one.
    pub fn update_quantity(&mut self, id: &str, delta: i32) {
        if let Some(entry) = self.items.iter_mut().find(|ci| ci.item.id == id) {
            let next = (i64::from(entry.quantity) + i64::from(delta)).clamp(1, i64::from(u32::MAX));
            entry.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    pub fn totals(&self) -> Totals {
        let subtotal = self
            .items
            .iter()
            .map(CartItem::line_total_cents)
            .fold(0i64, i64::saturating_add);
        Totals::from_subtotal(subtotal)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|ci| ci.item.id == id)
    }

    /// Total number of units across all entries.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|ci| u64::from(ci.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Read model of the cart handed to callers after every operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: Totals,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            totals: cart.totals(),
            item_count: cart.item_count(),
        }
    }
}
