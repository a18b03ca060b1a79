use localshop_catalog::{StockDemand, StockVerifier};
use localshop_core::{CoreError, CoreResult, Missing, Order, OrderId, OrderStatus, StockPolicy, UnitOfWork};
use tracing::info;

/// Re-read the order after a failed compare-and-set so the error names the
/// status that actually won.
pub(crate) async fn lost_race(
    uow: &mut dyn UnitOfWork,
    order_id: OrderId,
    requested: OrderStatus,
) -> CoreError {
    match uow.get_order(order_id).await {
        Ok(Some(order)) => CoreError::InvalidStateTransition {
            current: order.status,
            requested,
        },
        Ok(None) => CoreError::NotFound(Missing::Order(order_id)),
        Err(err) => err,
    }
}

/// Moves orders from `Pending` to `Paid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentTransitioner {
    policy: StockPolicy,
}

impl PaymentTransitioner {
    pub fn new(policy: StockPolicy) -> Self {
        Self { policy }
    }

    /// Mark a locked `Pending` order as `Paid`, committing its stock when the
    /// policy says payment is the commitment point.
    ///
    /// The order row lock plus the `Pending` guard make this exactly-once: a
    /// retried or concurrent call finds the order already `Paid` and fails
    /// with `InvalidStateTransition` without touching stock.
    pub async fn initiate_payment(
        &self,
        uow: &mut dyn UnitOfWork,
        order: &Order,
    ) -> CoreResult<Order> {
        order.status.ensure_transition(OrderStatus::Paid)?;

        if self.policy == StockPolicy::OnPayment {
            let items = uow.order_items(order.id).await?;
            let demand = StockDemand::from_items(&items)?;
            StockVerifier::commit(&mut *uow, &demand).await?;
        }

        if !uow
            .update_order_status(order.id, OrderStatus::Pending, OrderStatus::Paid)
            .await?
        {
            return Err(lost_race(uow, order.id, OrderStatus::Paid).await);
        }

        info!(order_id = %order.id, total = %order.total, policy = ?self.policy, "Order paid");

        Ok(Order {
            status: OrderStatus::Paid,
            ..order.clone()
        })
    }
}
