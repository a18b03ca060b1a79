use chrono::{DateTime, Utc};
use localshop_core::repository::OrderFilter;
use localshop_core::{CoreError, CoreResult, Order, OrderId, OrderItem, OrderStatus, ProductId, UserId};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

pub struct OrderRepository;

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    shipping_address: String,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = CoreError;

    fn try_from(row: OrderRow) -> CoreResult<Self> {
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            shipping_address: row.shipping_address,
            total: row.total,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: u32::try_from(row.quantity).unwrap_or(0),
            unit_price: row.unit_price,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, shipping_address, total, status, created_at";

fn to_orders(rows: Vec<OrderRow>) -> CoreResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

impl OrderRepository {
    pub async fn insert_order(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, shipping_address, total, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.shipping_address)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn insert_item(
        tx: &mut Transaction<'_, Postgres>,
        item: &OrderItem,
    ) -> CoreResult<()> {
        let quantity = i32::try_from(item.quantity).map_err(|_| {
            CoreError::Validation(format!("quantity {} is out of range", item.quantity))
        })?;

        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(quantity)
        .bind(item.unit_price)
        .execute(&mut **tx)
        .await
        .map_err(CoreError::storage)?;

        Ok(())
    }

    pub async fn get_order(
        tx: &mut Transaction<'_, Postgres>,
        id: OrderId,
        for_update: bool,
    ) -> CoreResult<Option<Order>> {
        let sql = if for_update {
            format!("SELECT {} FROM orders WHERE id = $1 FOR UPDATE", ORDER_COLUMNS)
        } else {
            format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS)
        };

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(CoreError::storage)?;

        row.map(Order::try_from).transpose()
    }

    pub async fn items(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, product_name, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY seq
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Guarded status write: only applies while the order is still in `expected`.
    pub async fn update_status(
        tx: &mut Transaction<'_, Postgres>,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
        )
        .bind(next.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn list(
        tx: &mut Transaction<'_, Postgres>,
        filter: &OrderFilter,
    ) -> CoreResult<Vec<Order>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM orders WHERE TRUE", ORDER_COLUMNS));

        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        if !filter.statuses.is_empty() {
            let statuses: Vec<String> = filter.statuses.iter().map(|s| s.as_str().to_string()).collect();
            query.push(" AND status = ANY(").push_bind(statuses).push(")");
        }
        query.push(if filter.oldest_first {
            " ORDER BY created_at ASC, seq ASC"
        } else {
            " ORDER BY created_at DESC, seq DESC"
        });

        let rows = query
            .build_query_as::<OrderRow>()
            .fetch_all(&mut **tx)
            .await
            .map_err(CoreError::storage)?;

        to_orders(rows)
    }
}
