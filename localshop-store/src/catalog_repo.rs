use localshop_core::{Product, ProductId};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

pub struct CatalogRepository;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    is_active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            // stock has a CHECK (stock >= 0) constraint
            stock: u32::try_from(row.stock).unwrap_or(0),
            is_active: row.is_active,
        }
    }
}

impl CatalogRepository {
    pub async fn get_product(
        tx: &mut Transaction<'_, Postgres>,
        id: ProductId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, stock, is_active FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Product::from))
    }

    /// `SELECT ... FOR UPDATE`: concurrent writers of this product wait for
    /// the transaction to end.
    pub async fn lock_product(
        tx: &mut Transaction<'_, Postgres>,
        id: ProductId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, stock, is_active FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Decrement only when enough stock remains. `None` means the product is
    /// missing or short.
    pub async fn decrement_stock(
        tx: &mut Transaction<'_, Postgres>,
        id: ProductId,
        quantity: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products
            SET stock = stock - $1, updated_at = NOW()
            WHERE id = $2 AND stock >= $1
            RETURNING stock
            "#,
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }
}
