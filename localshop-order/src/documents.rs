use chrono::{DateTime, Utc};
use localshop_core::{Order, OrderItem, OrderWithItems, UserContact};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";

/// Read-only projection of an order for billing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Recomputed from the item snapshots
    pub subtotal: Decimal,
    pub total: Decimal,
}

impl Invoice {
    pub fn for_order(order: OrderWithItems) -> Self {
        let subtotal = order.items.iter().map(OrderItem::line_total).sum();
        Self {
            invoice_number: format!("INV-{}", order.order.id),
            total: order.order.total,
            subtotal,
            order: order.order,
            items: order.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    pub fn issue(order: OrderWithItems, issued_at: DateTime<Utc>) -> Self {
        Self {
            receipt_number: format!("RCT-{}", order.order.id),
            total: order.order.total,
            order: order.order,
            items: order.items,
            issued_at,
        }
    }
}

/// What the warehouse prints on the parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingSlip {
    pub order_id: uuid::Uuid,
    pub order_date: DateTime<Utc>,
    pub shipping_address: String,
    pub user_name: String,
    pub user_email: String,
    pub total_paid: Decimal,
}

impl PackingSlip {
    pub fn new(order: &Order, contact: Option<UserContact>) -> Self {
        let (user_name, user_email) = match contact {
            Some(contact) => (contact.name, contact.email),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };
        let shipping_address = if order.shipping_address.trim().is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            order.shipping_address.clone()
        };

        Self {
            order_id: order.id,
            order_date: order.created_at,
            shipping_address,
            user_name,
            user_email,
            total_paid: order.total,
        }
    }
}

/// One-line item summary, `"name xQty"` joined by commas.
pub fn summarize_items(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} x{}", item.product_name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}
