use localshop_catalog::Totals;
use localshop_core::{CoreError, CoreResult, Order, OrderId, OrderStatus, QuotedLine, UserId};
use serde::{Deserialize, Serialize};

use crate::documents::Receipt;

/// A shipping address that is known to be non-blank. Surrounding whitespace
/// is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShippingAddress(String);

impl ShippingAddress {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Shipping address is required".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Non-persisted preview of a prospective order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub user_id: UserId,
    pub shipping_address: String,
    pub lines: Vec<QuotedLine>,
    pub totals: Totals,
}

/// Result of turning a cart into an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub lines: Vec<QuotedLine>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub receipt: Receipt,
}

/// An order waiting in the fulfilment queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfilmentEntry {
    pub order: Order,
    /// e.g. `"Classic Cola 330ml x2, Salted Chips 150g x1"`
    pub items: String,
}
