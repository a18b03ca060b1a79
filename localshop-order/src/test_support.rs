use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use localshop_catalog::PricingConfig;
use localshop_core::repository::OrderFilter;
use localshop_core::{
    CartLine, CoreResult, Order, OrderId, OrderItem, OrderStatus, Product, ProductId, StockPolicy,
    Store, UnitOfWork, UserContact, UserId,
};
use localshop_store::MemoryStore;
use rust_decimal::Decimal;

use crate::manager::OrderService;

/// A small shop with one customer whose cart holds 2 x cola and 1 x chips.
pub(crate) struct Shop {
    pub store: MemoryStore,
    pub service: OrderService,
    pub customer: UserId,
    pub cola: ProductId,
    pub chips: ProductId,
}

impl Shop {
    pub async fn open() -> Self {
        Self::open_with_policy(StockPolicy::OnPayment).await
    }

    pub async fn open_with_policy(policy: StockPolicy) -> Self {
        let store = MemoryStore::new();
        let customer = store.add_user("Customer", "customer@yourlocalshop.com").await;
        let cola = store
            .add_product(Product::new("Classic Cola 330ml", Decimal::new(250, 2), 10))
            .await;
        let chips = store
            .add_product(Product::new("Salted Chips 150g", Decimal::new(320, 2), 5))
            .await;
        store.add_to_cart(customer, cola, 2).await;
        store.add_to_cart(customer, chips, 1).await;

        let service = OrderService::new(Arc::new(store.clone()), PricingConfig::default(), policy);
        Self {
            store,
            service,
            customer,
            cola,
            chips,
        }
    }

    pub async fn add_product(&self, name: &str, price: Decimal, stock: u32) -> ProductId {
        self.store.add_product(Product::new(name, price, stock)).await
    }

    pub async fn place_order(&self) -> OrderId {
        self.service
            .create_order(self.customer, "1 Main St")
            .await
            .expect("order placed")
            .order_id
    }

    pub async fn order_status(&self, order_id: OrderId) -> OrderStatus {
        self.store
            .snapshot()
            .await
            .orders
            .iter()
            .find(|order| order.id == order_id)
            .map(|order| order.status)
            .expect("order exists")
    }
}

/// Wraps a store and counts order row locks taken through it.
pub(crate) struct LockCountingStore {
    inner: MemoryStore,
    order_locks: Arc<AtomicUsize>,
}

impl LockCountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            order_locks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn order_locks(&self) -> Arc<AtomicUsize> {
        self.order_locks.clone()
    }
}

#[async_trait]
impl Store for LockCountingStore {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(LockCountingUnitOfWork {
            inner: self.inner.begin().await?,
            order_locks: self.order_locks.clone(),
        }))
    }
}

struct LockCountingUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    order_locks: Arc<AtomicUsize>,
}

#[async_trait]
impl UnitOfWork for LockCountingUnitOfWork {
    async fn cart_lines(&mut self, user_id: UserId) -> CoreResult<Vec<CartLine>> {
        self.inner.cart_lines(user_id).await
    }

    async fn add_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<()> {
        self.inner.add_cart_line(user_id, product_id, quantity).await
    }

    async fn set_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<bool> {
        self.inner.set_cart_line(user_id, product_id, quantity).await
    }

    async fn remove_cart_line(&mut self, user_id: UserId, product_id: ProductId) -> CoreResult<bool> {
        self.inner.remove_cart_line(user_id, product_id).await
    }

    async fn clear_cart(&mut self, user_id: UserId) -> CoreResult<u64> {
        self.inner.clear_cart(user_id).await
    }

    async fn get_product(&mut self, id: ProductId) -> CoreResult<Option<Product>> {
        self.inner.get_product(id).await
    }

    async fn lock_product(&mut self, id: ProductId) -> CoreResult<Option<Product>> {
        self.inner.lock_product(id).await
    }

    async fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> CoreResult<u32> {
        self.inner.decrement_stock(id, quantity).await
    }

    async fn insert_order(&mut self, order: &Order) -> CoreResult<()> {
        self.inner.insert_order(order).await
    }

    async fn insert_order_item(&mut self, item: &OrderItem) -> CoreResult<()> {
        self.inner.insert_order_item(item).await
    }

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        self.inner.get_order(id).await
    }

    async fn lock_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        self.order_locks.fetch_add(1, Ordering::SeqCst);
        self.inner.lock_order(id).await
    }

    async fn order_items(&mut self, order_id: OrderId) -> CoreResult<Vec<OrderItem>> {
        self.inner.order_items(order_id).await
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> CoreResult<bool> {
        self.inner.update_order_status(id, expected, next).await
    }

    async fn list_orders(&mut self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        self.inner.list_orders(filter).await
    }

    async fn user_contact(&mut self, user_id: UserId) -> CoreResult<Option<UserContact>> {
        self.inner.user_contact(user_id).await
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        self.inner.rollback().await
    }
}
