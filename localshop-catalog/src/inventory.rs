use std::collections::{BTreeMap, HashMap};

use localshop_core::{CartLine, CoreError, CoreResult, Missing, OrderItem, Product, ProductId, UnitOfWork};
use tracing::debug;

/// Quantities requested per product, merged across lines.
///
/// Kept sorted by product id so row locks are always taken in the same order
/// and concurrent checkouts cannot deadlock on each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDemand {
    by_product: BTreeMap<ProductId, u32>,
}

impl StockDemand {
    pub fn from_cart(lines: &[CartLine]) -> CoreResult<Self> {
        let mut demand = Self::default();
        for line in lines {
            demand.add(line.product_id, line.quantity)?;
        }
        Ok(demand)
    }

    pub fn from_items(items: &[OrderItem]) -> CoreResult<Self> {
        let mut demand = Self::default();
        for item in items {
            demand.add(item.product_id, item.quantity)?;
        }
        Ok(demand)
    }

    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> CoreResult<()> {
        if quantity == 0 {
            return Err(CoreError::Validation(format!(
                "quantity for product {} must be positive",
                product_id
            )));
        }
        let entry = self.by_product.entry(product_id).or_insert(0);
        *entry = entry.checked_add(quantity).ok_or_else(|| {
            CoreError::Validation(format!("quantity for product {} is too large", product_id))
        })?;
        Ok(())
    }

    pub fn requested(&self, product_id: &ProductId) -> u32 {
        self.by_product.get(product_id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.by_product.iter().map(|(id, quantity)| (*id, *quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }
}

/// Checks and commits stock inside the caller's unit of work.
///
/// Products are read with row locks, so a verification stays valid until the
/// unit of work ends and the later decrement cannot oversell.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockVerifier;

impl StockVerifier {
    /// Lock every demanded product and confirm it has enough stock.
    /// Returns the locked products keyed by id.
    pub async fn verify(
        uow: &mut dyn UnitOfWork,
        demand: &StockDemand,
    ) -> CoreResult<HashMap<ProductId, Product>> {
        let mut products = HashMap::new();

        for (product_id, requested) in demand.iter() {
            let product = uow
                .lock_product(product_id)
                .await?
                .ok_or(CoreError::NotFound(Missing::Product(product_id)))?;

            if product.stock < requested {
                return Err(CoreError::InsufficientStock {
                    product_id,
                    available: product.stock,
                    requested,
                });
            }

            products.insert(product_id, product);
        }

        Ok(products)
    }

    /// Verify the whole demand first, then decrement each product.
    /// Nothing is decremented unless every product passes.
    pub async fn commit(uow: &mut dyn UnitOfWork, demand: &StockDemand) -> CoreResult<()> {
        Self::verify(uow, demand).await?;

        for (product_id, quantity) in demand.iter() {
            let remaining = uow.decrement_stock(product_id, quantity).await?;
            debug!("Committed {} of product {} ({} left)", quantity, product_id, remaining);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localshop_core::Store;
    use localshop_store::MemoryStore;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_demand_merges_lines() {
        let product_id = Uuid::new_v4();
        let demand = StockDemand::from_cart(&[
            CartLine { product_id, quantity: 2 },
            CartLine { product_id, quantity: 3 },
        ])
        .unwrap();

        assert_eq!(demand.requested(&product_id), 5);
        assert_eq!(demand.iter().count(), 1);
    }

    #[test]
    fn test_demand_rejects_zero_quantity() {
        let result = StockDemand::from_cart(&[CartLine { product_id: Uuid::new_v4(), quantity: 0 }]);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_reports_shortfall() {
        let store = MemoryStore::new();
        let cola = store.add_product(Product::new("Classic Cola 330ml", dec!(2.50), 5)).await;

        let demand = StockDemand::from_cart(&[CartLine { product_id: cola, quantity: 6 }]).unwrap();
        let mut uow = store.begin().await.unwrap();
        let err = StockVerifier::verify(uow.as_mut(), &demand).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock { product_id, available: 5, requested: 6 } if product_id == cola
        ));
    }

    #[tokio::test]
    async fn test_verify_missing_product() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();

        let demand = StockDemand::from_cart(&[CartLine { product_id: ghost, quantity: 1 }]).unwrap();
        let mut uow = store.begin().await.unwrap();
        let err = StockVerifier::verify(uow.as_mut(), &demand).await.unwrap_err();

        assert!(matches!(err, CoreError::NotFound(Missing::Product(id)) if id == ghost));
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let store = MemoryStore::new();
        let water = store.add_product(Product::new("Water 500ml", dec!(1.80), 10)).await;
        let chips = store.add_product(Product::new("Salted Chips 150g", dec!(3.20), 1)).await;

        let demand = StockDemand::from_cart(&[
            CartLine { product_id: water, quantity: 4 },
            CartLine { product_id: chips, quantity: 2 },
        ])
        .unwrap();

        let mut uow = store.begin().await.unwrap();
        let result = StockVerifier::commit(uow.as_mut(), &demand).await;
        assert!(matches!(result, Err(CoreError::InsufficientStock { .. })));
        uow.rollback().await.unwrap();

        assert_eq!(store.product(water).await.unwrap().stock, 10);
        assert_eq!(store.product(chips).await.unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_commit_decrements_each_product() {
        let store = MemoryStore::new();
        let water = store.add_product(Product::new("Water 500ml", dec!(1.80), 10)).await;

        let demand = StockDemand::from_cart(&[CartLine { product_id: water, quantity: 4 }]).unwrap();
        let mut uow = store.begin().await.unwrap();
        StockVerifier::commit(uow.as_mut(), &demand).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(store.product(water).await.unwrap().stock, 6);
    }
}
