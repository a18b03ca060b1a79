use localshop_catalog::round2;
use localshop_core::{CoreError, CoreResult, ProductId, UnitOfWork, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cart line joined with its current catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartViewLine {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// The user's cart priced at current catalogue prices, before tax and shipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub user_id: UserId,
    pub items: Vec<CartViewLine>,
    pub item_count: u64,
    pub total: Decimal,
}

impl CartView {
    /// Lines whose product has left the catalogue are skipped.
    pub async fn load(uow: &mut dyn UnitOfWork, user_id: UserId) -> CoreResult<Self> {
        let lines = uow.cart_lines(user_id).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let Some(product) = uow.get_product(line.product_id).await? else {
                continue;
            };
            items.push(CartViewLine {
                product_id: product.id,
                line_total: product.price * Decimal::from(line.quantity),
                name: product.name,
                description: product.description,
                unit_price: product.price,
                quantity: line.quantity,
            });
        }

        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();
        let total = round2(items.iter().map(|item| item.line_total).sum());
        Ok(Self {
            user_id,
            items,
            item_count,
            total,
        })
    }
}

/// Cart quantities arrive signed; anything that does not fit a positive
/// `u32` is rejected.
pub fn positive_quantity(quantity: i64) -> CoreResult<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|quantity| *quantity > 0)
        .ok_or_else(|| CoreError::Validation(format!("Quantity must be a positive whole number, got {}", quantity)))
}
