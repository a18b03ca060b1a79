use async_trait::async_trait;
use tracing::warn;

use crate::error::CoreResult;
use crate::models::{CartLine, Order, OrderId, OrderItem, Product, ProductId, UserContact, UserId};
use crate::status::OrderStatus;

/// Typed selection over the orders table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
    /// Empty means any status.
    pub statuses: Vec<OrderStatus>,
    pub oldest_first: bool,
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn awaiting_fulfilment() -> Self {
        Self {
            user_id: None,
            statuses: vec![OrderStatus::Paid, OrderStatus::Packing],
            oldest_first: true,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.map_or(true, |user_id| order.user_id == user_id)
            && (self.statuses.is_empty() || self.statuses.contains(&order.status))
    }
}

/// Entry point to the shared relational store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open an atomic unit of work. Nothing written through it is visible to
    /// other units until `commit`.
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>>;
}

/// A transaction-scoped handle. Dropping it without `commit` rolls back.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn cart_lines(&mut self, user_id: UserId) -> CoreResult<Vec<CartLine>>;

    /// Add to the user's cart, creating the cart on first use and merging with
    /// an existing line for the same product.
    async fn add_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<()>;

    /// Overwrite a line's quantity. Returns `false` when the cart holds no
    /// line for the product.
    async fn set_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<bool>;

    /// Returns `false` when there was nothing to remove.
    async fn remove_cart_line(&mut self, user_id: UserId, product_id: ProductId) -> CoreResult<bool>;

    /// Remove every line from the user's cart, returning how many were removed.
    async fn clear_cart(&mut self, user_id: UserId) -> CoreResult<u64>;

    async fn get_product(&mut self, id: ProductId) -> CoreResult<Option<Product>>;

    /// Read a product and hold its row lock until the unit of work ends.
    async fn lock_product(&mut self, id: ProductId) -> CoreResult<Option<Product>>;

    /// Remove `quantity` units from stock, returning the remaining stock.
    /// Never lets stock go below zero.
    async fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> CoreResult<u32>;

    async fn insert_order(&mut self, order: &Order) -> CoreResult<()>;

    async fn insert_order_item(&mut self, item: &OrderItem) -> CoreResult<()>;

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>>;

    /// Read an order and hold its row lock until the unit of work ends.
    async fn lock_order(&mut self, id: OrderId) -> CoreResult<Option<Order>>;

    async fn order_items(&mut self, order_id: OrderId) -> CoreResult<Vec<OrderItem>>;

    /// Compare-and-set on the order status. Returns `false` when the order is
    /// no longer in `expected`.
    async fn update_order_status(
        &mut self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> CoreResult<bool>;

    async fn list_orders(&mut self, filter: &OrderFilter) -> CoreResult<Vec<Order>>;

    async fn user_contact(&mut self, user_id: UserId) -> CoreResult<Option<UserContact>>;

    async fn commit(self: Box<Self>) -> CoreResult<()>;

    async fn rollback(self: Box<Self>) -> CoreResult<()>;
}

/// Commit on success, roll back on failure. The original error always wins
/// over a failed rollback.
pub async fn finish<T>(uow: Box<dyn UnitOfWork>, result: CoreResult<T>) -> CoreResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!("Rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
