use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use localshop_core::repository::OrderFilter;
use localshop_core::{
    CartLine, CoreError, CoreResult, Missing, Order, OrderId, OrderItem, OrderStatus, Product,
    ProductId, Store, UnitOfWork, UserContact, UserId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Every table of the store, held as plain collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryState {
    pub users: HashMap<UserId, UserContact>,
    pub products: HashMap<ProductId, Product>,
    pub carts: HashMap<UserId, Vec<CartLine>>,
    /// Insertion order
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
}

/// In-process store with serializable transactions.
///
/// A unit of work holds the single state lock for its whole lifetime and
/// edits a private copy, which replaces the shared state only on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the default shop users and catalogue.
    pub async fn seeded() -> Self {
        let store = Self::new();
        store.add_user("Admin", "admin@yourlocalshop.com").await;
        store.add_user("Customer", "customer@yourlocalshop.com").await;
        for (name, price_cents, stock) in [
            ("Classic Cola 330ml", 250, 200),
            ("Water 500ml", 180, 300),
            ("Salted Chips 150g", 320, 150),
            ("Chocolate Bar 50g", 220, 180),
            ("Instant Noodles", 200, 120),
        ] {
            store
                .add_product(Product::new(name, rust_decimal::Decimal::new(price_cents, 2), stock))
                .await;
        }
        store
    }

    pub async fn add_user(&self, name: &str, email: &str) -> UserId {
        let user_id = Uuid::new_v4();
        self.state.lock().await.users.insert(
            user_id,
            UserContact {
                user_id,
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        user_id
    }

    pub async fn add_product(&self, product: Product) -> ProductId {
        let id = product.id;
        self.state.lock().await.products.insert(id, product);
        id
    }

    /// Catalogue edit: replace a product's row.
    pub async fn update_product(&self, product: Product) {
        self.state.lock().await.products.insert(product.id, product);
    }

    pub async fn remove_product(&self, id: ProductId) {
        self.state.lock().await.products.remove(&id);
    }

    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.state.lock().await.products.get(&id).cloned()
    }

    /// Find a product by name, for the seeded catalogue.
    pub async fn product_named(&self, name: &str) -> Option<Product> {
        self.state
            .lock()
            .await
            .products
            .values()
            .find(|product| product.name == name)
            .cloned()
    }

    pub async fn user_by_email(&self, email: &str) -> Option<UserContact> {
        self.state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    /// Add to a cart, merging with an existing line for the same product.
    pub async fn add_to_cart(&self, user_id: UserId, product_id: ProductId, quantity: u32) {
        let mut state = self.state.lock().await;
        let lines = state.carts.entry(user_id).or_default();
        match lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity += quantity,
            None => lines.push(CartLine { product_id, quantity }),
        }
    }

    pub async fn cart(&self, user_id: UserId) -> Vec<CartLine> {
        self.state
            .lock()
            .await
            .carts
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Copy of every table, for before/after comparisons.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl MemoryUnitOfWork {
    fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.working.orders.iter_mut().find(|order| order.id == id)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn cart_lines(&mut self, user_id: UserId) -> CoreResult<Vec<CartLine>> {
        Ok(self.working.carts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<()> {
        let lines = self.working.carts.entry(user_id).or_default();
        match lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    CoreError::Validation(format!("quantity for product {} is too large", product_id))
                })?;
            }
            None => lines.push(CartLine { product_id, quantity }),
        }
        Ok(())
    }

    async fn set_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<bool> {
        let line = self
            .working
            .carts
            .get_mut(&user_id)
            .and_then(|lines| lines.iter_mut().find(|line| line.product_id == product_id));
        Ok(match line {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        })
    }

    async fn remove_cart_line(&mut self, user_id: UserId, product_id: ProductId) -> CoreResult<bool> {
        let Some(lines) = self.working.carts.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = lines.len();
        lines.retain(|line| line.product_id != product_id);
        Ok(lines.len() != before)
    }

    async fn clear_cart(&mut self, user_id: UserId) -> CoreResult<u64> {
        let removed = self
            .working
            .carts
            .get_mut(&user_id)
            .map(|lines| lines.drain(..).count())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn get_product(&mut self, id: ProductId) -> CoreResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn lock_product(&mut self, id: ProductId) -> CoreResult<Option<Product>> {
        // The whole state is already locked
        self.get_product(id).await
    }

    async fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> CoreResult<u32> {
        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or(CoreError::NotFound(Missing::Product(id)))?;

        if product.stock < quantity {
            return Err(CoreError::InsufficientStock {
                product_id: id,
                available: product.stock,
                requested: quantity,
            });
        }

        product.stock -= quantity;
        Ok(product.stock)
    }

    async fn insert_order(&mut self, order: &Order) -> CoreResult<()> {
        if self.working.orders.iter().any(|existing| existing.id == order.id) {
            return Err(CoreError::Storage(format!("duplicate order id {}", order.id)));
        }
        self.working.orders.push(order.clone());
        Ok(())
    }

    async fn insert_order_item(&mut self, item: &OrderItem) -> CoreResult<()> {
        if !self.working.orders.iter().any(|order| order.id == item.order_id) {
            return Err(CoreError::Storage(format!(
                "order item {} references missing order {}",
                item.id, item.order_id
            )));
        }
        self.working.order_items.push(item.clone());
        Ok(())
    }

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        Ok(self.working.orders.iter().find(|order| order.id == id).cloned())
    }

    async fn lock_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        self.get_order(id).await
    }

    async fn order_items(&mut self, order_id: OrderId) -> CoreResult<Vec<OrderItem>> {
        Ok(self
            .working
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> CoreResult<bool> {
        match self.order_mut(id) {
            Some(order) if order.status == expected => {
                order.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_orders(&mut self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .working
            .orders
            .iter()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect();

        // Stable sorts keep insertion order among equal timestamps
        if filter.oldest_first {
            orders.sort_by_key(|order| order.created_at);
        } else {
            orders.reverse();
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(orders)
    }

    async fn user_contact(&mut self, user_id: UserId) -> CoreResult<Option<UserContact>> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        Ok(())
    }
}
