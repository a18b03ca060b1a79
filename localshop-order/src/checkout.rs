use localshop_catalog::{PricingEngine, StockDemand, StockVerifier, Totals};
use localshop_core::{
    CartLine, CoreError, CoreResult, Missing, Order, OrderItem, OrderStatus, Product, QuotedLine,
    UnitOfWork, UserId,
};
use tracing::info;

use crate::models::{PlacedOrder, Quote, ShippingAddress};

/// Turns a user's cart into a priced, persisted order.
#[derive(Debug, Clone, Default)]
pub struct OrderWriter {
    pricing: PricingEngine,
}

impl OrderWriter {
    pub fn new(pricing: PricingEngine) -> Self {
        Self { pricing }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    fn totals(&self, lines: &[QuotedLine]) -> Totals {
        self.pricing
            .compute(lines.iter().map(|line| (line.unit_price, line.quantity)))
    }

    /// Price the current cart without writing anything or locking rows.
    pub async fn quote(
        &self,
        uow: &mut dyn UnitOfWork,
        user_id: UserId,
        shipping_address: &str,
    ) -> CoreResult<Quote> {
        let cart = uow.cart_lines(user_id).await?;

        let mut lines = Vec::with_capacity(cart.len());
        for line in &cart {
            let product = uow
                .get_product(line.product_id)
                .await?
                .ok_or(CoreError::NotFound(Missing::Product(line.product_id)))?;
            lines.push(price_line(line, &product)?);
        }

        let totals = self.totals(&lines);
        Ok(Quote {
            user_id,
            shipping_address: shipping_address.trim().to_string(),
            lines,
            totals,
        })
    }

    /// Create a `Pending` order from the cart.
    ///
    /// Must run inside a unit of work that the caller rolls back on error, so
    /// a failure at any step leaves no order, no items and an untouched cart.
    /// Stock is verified under row locks but not decremented here.
    pub async fn create_order_from_cart(
        &self,
        uow: &mut dyn UnitOfWork,
        user_id: UserId,
        shipping_address: ShippingAddress,
    ) -> CoreResult<PlacedOrder> {
        let cart = uow.cart_lines(user_id).await?;
        if cart.is_empty() {
            return Err(CoreError::Validation("Shopping cart is empty".to_string()));
        }

        let demand = StockDemand::from_cart(&cart)?;
        let products = StockVerifier::verify(&mut *uow, &demand).await?;

        let lines = cart
            .iter()
            .map(|line| {
                products
                    .get(&line.product_id)
                    .ok_or(CoreError::NotFound(Missing::Product(line.product_id)))
                    .and_then(|product| price_line(line, product))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let totals = self.totals(&lines);

        let order = Order::pending(user_id, shipping_address.into_inner(), totals.total);
        uow.insert_order(&order).await?;

        for line in &lines {
            uow.insert_order_item(&OrderItem::snapshot(order.id, line)).await?;
        }

        info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %totals.total,
            "Order created with {} line(s)",
            lines.len()
        );

        Ok(PlacedOrder {
            order_id: order.id,
            status: OrderStatus::Pending,
            lines,
            totals,
        })
    }
}

fn price_line(line: &CartLine, product: &Product) -> CoreResult<QuotedLine> {
    if !product.is_active {
        return Err(CoreError::ProductInactive(product.id));
    }
    Ok(QuotedLine {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        quantity: line.quantity,
    })
}
