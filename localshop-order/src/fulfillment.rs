use localshop_catalog::{StockDemand, StockVerifier};
use localshop_core::repository::OrderFilter;
use localshop_core::{CoreError, CoreResult, Order, OrderStatus, OrderWithItems, StockPolicy, UnitOfWork};
use tracing::info;

use crate::documents::summarize_items;
use crate::models::FulfilmentEntry;
use crate::orchestrator::lost_race;

/// Moves paid orders out of the warehouse.
#[derive(Debug, Clone, Copy, Default)]
pub struct FulfilmentShipper {
    policy: StockPolicy,
}

impl FulfilmentShipper {
    pub fn new(policy: StockPolicy) -> Self {
        Self { policy }
    }

    /// Ship a locked `Paid` or `Packing` order.
    ///
    /// Under `StockPolicy::OnShipment` the items are re-verified and stock is
    /// decremented here; any shortfall aborts the whole transition.
    pub async fn ship_order(
        &self,
        uow: &mut dyn UnitOfWork,
        order: &Order,
    ) -> CoreResult<OrderWithItems> {
        if !order.status.awaits_fulfilment() {
            return Err(CoreError::InvalidStateTransition {
                current: order.status,
                requested: OrderStatus::Shipped,
            });
        }

        let items = uow.order_items(order.id).await?;

        if self.policy == StockPolicy::OnShipment {
            let demand = StockDemand::from_items(&items)?;
            StockVerifier::commit(&mut *uow, &demand).await?;
        }

        if !uow
            .update_order_status(order.id, order.status, OrderStatus::Shipped)
            .await?
        {
            return Err(lost_race(uow, order.id, OrderStatus::Shipped).await);
        }

        info!(order_id = %order.id, from = %order.status, policy = ?self.policy, "Order shipped");

        Ok(OrderWithItems {
            order: Order {
                status: OrderStatus::Shipped,
                ..order.clone()
            },
            items,
        })
    }

    /// Orders in `Paid` or `Packing`, oldest first.
    pub async fn awaiting_fulfilment(&self, uow: &mut dyn UnitOfWork) -> CoreResult<Vec<FulfilmentEntry>> {
        let orders = uow.list_orders(&OrderFilter::awaiting_fulfilment()).await?;

        let mut entries = Vec::with_capacity(orders.len());
        for order in orders {
            let items = uow.order_items(order.id).await?;
            entries.push(FulfilmentEntry {
                items: summarize_items(&items),
                order,
            });
        }
        Ok(entries)
    }
}
