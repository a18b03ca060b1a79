use crate::models::{OrderId, ProductId, UserId};
use crate::status::OrderStatus;

/// The entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Product(ProductId),
    Order(OrderId),
    Cart(UserId),
    User(UserId),
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Product(id) => write!(f, "product {}", id),
            Missing::Order(id) => write!(f, "order {}", id),
            Missing::Cart(user_id) => write!(f, "cart for user {}", user_id),
            Missing::User(id) => write!(f, "user {}", id),
        }
    }
}

/// Business-rule and storage failures of the order lifecycle.
///
/// Every variant except `Storage` is deterministic: retrying with the same
/// inputs fails the same way until the underlying state changes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(Missing),

    #[error("Product {0} is not available for sale")]
    ProductInactive(ProductId),

    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    #[error("Invalid state transition from {current} to {requested}")]
    InvalidStateTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    #[error("Order {order_id} does not belong to user {user_id}")]
    Ownership { order_id: OrderId, user_id: UserId },

    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Coarse classification of a [`CoreError`] for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientStock,
    InvalidStateTransition,
    Ownership,
    Storage,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::ProductInactive(_) => ErrorKind::Validation,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            CoreError::Ownership { .. } => ErrorKind::Ownership,
            CoreError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        CoreError::Storage(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
