use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cart::{Cart, CartItem, Totals};

/// Prefix marking order ids generated by the local fallback store.
pub const LOCAL_ORDER_PREFIX: &str = "local-";

/// Where a catalog load or order placement was served from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Cloud,
    Local,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<&CartItem> for OrderLine {
    fn from(ci: &CartItem) -> Self {
        Self {
            item_id: ci.item.id.clone(),
            name: ci.item.name.clone(),
            quantity: ci.quantity,
            unit_price_cents: ci.item.price_cents,
        }
    }
}

/// Order contents before an id and timestamp are assigned by a backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub status: OrderStatus,
}

impl OrderDraft {
    pub fn new(items: &[CartItem], totals: Totals) -> anyhow::Result<Self> {
        if items.is_empty() {
            anyhow::bail!("items empty");
        }
        if items.iter().any(|ci| ci.quantity == 0) {
            anyhow::bail!("item qty must be > 0");
        }
        Ok(Self {
            items: items.iter().map(OrderLine::from).collect(),
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
            status: OrderStatus::Pending,
        })
    }

    pub fn from_cart(cart: &Cart) -> anyhow::Result<Self> {
        Self::new(cart.items(), cart.totals())
    }
}

/// A placed order. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    #[serde(flatten)]
    pub draft: OrderDraft,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn assign(draft: OrderDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            draft,
            created_at,
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ORDER_PREFIX)
    }
}

/// Result of a single order placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: String,
    pub status: ConnectionStatus,
}

/// What the shopper is told after checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub id: String,
    pub status: ConnectionStatus,
    pub message: String,
}

impl From<PlacedOrder> for CheckoutReceipt {
    fn from(placed: PlacedOrder) -> Self {
        let message = match placed.status {
            ConnectionStatus::Cloud => format!("Order synced to Cloud! ID: {}", placed.id),
            _ => format!("Order saved locally! ID: {}", placed.id),
        };
        Self {
            id: placed.id,
            status: placed.status,
            message,
        }
    }
}
