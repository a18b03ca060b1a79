use async_trait::async_trait;
use localshop_core::repository::OrderFilter;
use localshop_core::{
    CartLine, CoreError, CoreResult, Missing, Order, OrderId, OrderItem, OrderStatus, Product,
    ProductId, Store, UnitOfWork, UserContact, UserId,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Transaction};
use std::time::Duration;
use tracing::info;

use crate::catalog_repo::CatalogRepository;
use crate::customer_repo::{CartRepository, UserRepository};
use crate::order_repo::OrderRepository;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

#[async_trait]
impl Store for DbClient {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(CoreError::storage)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// A Postgres transaction. Row locks taken through it are held until commit
/// or rollback; sqlx rolls back on drop.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn to_i32(quantity: u32) -> CoreResult<i32> {
    i32::try_from(quantity)
        .map_err(|_| CoreError::Validation(format!("quantity {} is out of range", quantity)))
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn cart_lines(&mut self, user_id: UserId) -> CoreResult<Vec<CartLine>> {
        CartRepository::lines(&mut self.tx, user_id)
            .await
            .map_err(CoreError::storage)
    }

    async fn add_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<()> {
        let quantity = to_i32(quantity)?;
        CartRepository::add(&mut self.tx, user_id, product_id, quantity)
            .await
            .map_err(CoreError::storage)
    }

    async fn set_cart_line(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) -> CoreResult<bool> {
        let quantity = to_i32(quantity)?;
        CartRepository::set_quantity(&mut self.tx, user_id, product_id, quantity)
            .await
            .map_err(CoreError::storage)
    }

    async fn remove_cart_line(&mut self, user_id: UserId, product_id: ProductId) -> CoreResult<bool> {
        CartRepository::remove(&mut self.tx, user_id, product_id)
            .await
            .map_err(CoreError::storage)
    }

    async fn clear_cart(&mut self, user_id: UserId) -> CoreResult<u64> {
        CartRepository::clear(&mut self.tx, user_id)
            .await
            .map_err(CoreError::storage)
    }

    async fn get_product(&mut self, id: ProductId) -> CoreResult<Option<Product>> {
        CatalogRepository::get_product(&mut self.tx, id)
            .await
            .map_err(CoreError::storage)
    }

    async fn lock_product(&mut self, id: ProductId) -> CoreResult<Option<Product>> {
        CatalogRepository::lock_product(&mut self.tx, id)
            .await
            .map_err(CoreError::storage)
    }

    async fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> CoreResult<u32> {
        let requested = to_i32(quantity)?;
        let remaining = CatalogRepository::decrement_stock(&mut self.tx, id, requested)
            .await
            .map_err(CoreError::storage)?;

        match remaining {
            Some(stock) => Ok(u32::try_from(stock).unwrap_or(0)),
            None => {
                // Tell a missing product apart from a short one
                let product = self.get_product(id).await?;
                Err(match product {
                    Some(product) => CoreError::InsufficientStock {
                        product_id: id,
                        available: product.stock,
                        requested: quantity,
                    },
                    None => CoreError::NotFound(Missing::Product(id)),
                })
            }
        }
    }

    async fn insert_order(&mut self, order: &Order) -> CoreResult<()> {
        OrderRepository::insert_order(&mut self.tx, order)
            .await
            .map_err(CoreError::storage)
    }

    async fn insert_order_item(&mut self, item: &OrderItem) -> CoreResult<()> {
        OrderRepository::insert_item(&mut self.tx, item).await
    }

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        OrderRepository::get_order(&mut self.tx, id, false).await
    }

    async fn lock_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        OrderRepository::get_order(&mut self.tx, id, true).await
    }

    async fn order_items(&mut self, order_id: OrderId) -> CoreResult<Vec<OrderItem>> {
        OrderRepository::items(&mut self.tx, order_id)
            .await
            .map_err(CoreError::storage)
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> CoreResult<bool> {
        OrderRepository::update_status(&mut self.tx, id, expected, next)
            .await
            .map_err(CoreError::storage)
    }

    async fn list_orders(&mut self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        OrderRepository::list(&mut self.tx, filter).await
    }

    async fn user_contact(&mut self, user_id: UserId) -> CoreResult<Option<UserContact>> {
        UserRepository::contact(&mut self.tx, user_id)
            .await
            .map_err(CoreError::storage)
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        self.tx.commit().await.map_err(CoreError::storage)
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        self.tx.rollback().await.map_err(CoreError::storage)
    }
}
