use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::OrderStatus;

pub type ProductId = Uuid;
pub type UserId = Uuid;
pub type OrderId = Uuid;

/// A catalogue entry as seen by the checkout core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    pub is_active: bool,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            price,
            stock,
            is_active: true,
        }
    }
}

/// A (product, quantity) pair read from a user's cart. Never persisted with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart line joined with the product's current name and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl QuotedLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A persisted customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub shipping_address: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A freshly written order always starts out `Pending`.
    pub fn pending(user_id: UserId, shipping_address: String, total: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            shipping_address,
            total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of a product captured at order-creation time.
///
/// Name and price never follow later catalogue edits, and `product_id` may
/// outlive the product it points to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn snapshot(order_id: OrderId, line: &QuotedLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: line.product_id,
            product_name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Name and email of a user, as printed on packing slips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContact {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// Which transition permanently removes an order's quantities from stock.
///
/// Exactly one transition commits stock per order under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// `Pending -> Paid` decrements stock; shipping only moves the status.
    #[default]
    OnPayment,
    /// Paying only moves the status; shipping re-verifies and decrements.
    OnShipment,
}
