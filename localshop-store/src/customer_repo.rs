use localshop_core::{CartLine, ProductId, UserContact, UserId};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub struct CartRepository;

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: ProductId,
    quantity: i32,
}

impl CartRepository {
    pub async fn lines(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT ci.product_id, ci.quantity
            FROM cart_items ci
            JOIN shopping_carts sc ON sc.id = ci.cart_id
            WHERE sc.user_id = $1
            ORDER BY ci.added_at, ci.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLine {
                product_id: row.product_id,
                // quantity has a CHECK (quantity > 0) constraint
                quantity: u32::try_from(row.quantity).unwrap_or(0),
            })
            .collect())
    }

    /// Creates the cart row on first use; a repeated product adds to the
    /// existing line.
    pub async fn add(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO shopping_carts (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            SELECT id, $2, $3 FROM shopping_carts WHERE user_id = $1
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn set_quantity(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE cart_items SET quantity = $3
            WHERE product_id = $2
              AND cart_id IN (SELECT id FROM shopping_carts WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE product_id = $2
              AND cart_id IN (SELECT id FROM shopping_carts WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE cart_id IN (SELECT id FROM shopping_carts WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

pub struct UserRepository;

impl UserRepository {
    pub async fn contact(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> Result<Option<UserContact>, sqlx::Error> {
        let row = sqlx::query_as::<_, (UserId, String, String)>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(|(user_id, name, email)| UserContact { user_id, name, email }))
    }
}
