use std::sync::Arc;

use chrono::Utc;
use localshop_catalog::{PricingConfig, PricingEngine};
use localshop_core::repository::OrderFilter;
use localshop_core::{
    finish, CoreError, CoreResult, Missing, Order, OrderId, OrderStatus, OrderWithItems,
    ProductId, StockPolicy, Store, UnitOfWork, UserId,
};
use tracing::{info, warn};

use crate::cart::{positive_quantity, CartView};
use crate::checkout::OrderWriter;
use crate::documents::{Invoice, PackingSlip, Receipt};
use crate::fulfillment::FulfilmentShipper;
use crate::models::{FulfilmentEntry, PaymentConfirmation, PlacedOrder, Quote, ShippingAddress};
use crate::orchestrator::{lost_race, PaymentTransitioner};

/// The order lifecycle operations exposed to the routing layer.
///
/// Every operation runs in its own unit of work and either commits as a whole
/// or rolls back as a whole.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    writer: OrderWriter,
    payments: PaymentTransitioner,
    shipper: FulfilmentShipper,
}

async fn lock_order(uow: &mut dyn UnitOfWork, order_id: OrderId) -> CoreResult<Order> {
    uow.lock_order(order_id)
        .await?
        .ok_or(CoreError::NotFound(Missing::Order(order_id)))
}

async fn load_order(uow: &mut dyn UnitOfWork, order_id: OrderId) -> CoreResult<OrderWithItems> {
    let order = uow
        .get_order(order_id)
        .await?
        .ok_or(CoreError::NotFound(Missing::Order(order_id)))?;
    let items = uow.order_items(order_id).await?;
    Ok(OrderWithItems { order, items })
}

async fn packing_slip_in(uow: &mut dyn UnitOfWork, order_id: OrderId) -> CoreResult<PackingSlip> {
    let order = uow
        .get_order(order_id)
        .await?
        .ok_or(CoreError::NotFound(Missing::Order(order_id)))?;
    let contact = uow.user_contact(order.user_id).await?;
    Ok(PackingSlip::new(&order, contact))
}

async fn add_to_cart_in(
    uow: &mut dyn UnitOfWork,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
) -> CoreResult<CartView> {
    if uow.user_contact(user_id).await?.is_none() {
        return Err(CoreError::NotFound(Missing::User(user_id)));
    }
    let product = uow
        .get_product(product_id)
        .await?
        .ok_or(CoreError::NotFound(Missing::Product(product_id)))?;
    if !product.is_active {
        return Err(CoreError::ProductInactive(product_id));
    }

    uow.add_cart_line(user_id, product_id, quantity).await?;
    info!(user_id = %user_id, product_id = %product_id, "Added {} to cart", quantity);
    CartView::load(uow, user_id).await
}

async fn set_cart_line_in(
    uow: &mut dyn UnitOfWork,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
) -> CoreResult<CartView> {
    if !uow.set_cart_line(user_id, product_id, quantity).await? {
        return Err(CoreError::NotFound(Missing::Cart(user_id)));
    }
    CartView::load(uow, user_id).await
}

async fn remove_cart_line_in(
    uow: &mut dyn UnitOfWork,
    user_id: UserId,
    product_id: ProductId,
) -> CoreResult<CartView> {
    uow.remove_cart_line(user_id, product_id).await?;
    CartView::load(uow, user_id).await
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, pricing: PricingConfig, policy: StockPolicy) -> Self {
        Self {
            store,
            writer: OrderWriter::new(PricingEngine::new(pricing)),
            payments: PaymentTransitioner::new(policy),
            shipper: FulfilmentShipper::new(policy),
        }
    }

    pub async fn quote(&self, user_id: UserId, shipping_address: &str) -> CoreResult<Quote> {
        let mut uow = self.store.begin().await?;
        let result = self.writer.quote(uow.as_mut(), user_id, shipping_address).await;
        // Read-only: never commit
        if let Err(err) = uow.rollback().await {
            warn!("Rollback of quote failed: {}", err);
        }
        result
    }

    pub async fn create_order(&self, user_id: UserId, shipping_address: &str) -> CoreResult<PlacedOrder> {
        let address = ShippingAddress::parse(shipping_address)?;

        let mut uow = self.store.begin().await?;
        let result = self
            .writer
            .create_order_from_cart(uow.as_mut(), user_id, address)
            .await;
        if let Err(err) = &result {
            info!(user_id = %user_id, "Order creation rolled back: {}", err);
        }
        finish(uow, result).await
    }

    /// Pay for an order on behalf of its owner, then empty the owner's cart
    /// in the same unit of work.
    ///
    /// Ownership is checked with a plain read before the payment unit of work
    /// takes any lock, and again once the order row is locked.
    pub async fn pay(&self, order_id: OrderId, user_id: UserId) -> CoreResult<PaymentConfirmation> {
        self.ensure_owner(order_id, user_id).await?;

        let mut uow = self.store.begin().await?;
        let result = self.pay_in(uow.as_mut(), order_id, user_id).await;
        if let Err(err) = &result {
            info!(order_id = %order_id, "Payment rolled back: {}", err);
        }
        finish(uow, result).await
    }

    async fn ensure_owner(&self, order_id: OrderId, user_id: UserId) -> CoreResult<()> {
        let mut uow = self.store.begin().await?;
        let order = uow.get_order(order_id).await;
        if let Err(err) = uow.rollback().await {
            warn!("Rollback of ownership read failed: {}", err);
        }
        match order? {
            None => Err(CoreError::NotFound(Missing::Order(order_id))),
            Some(order) if order.user_id != user_id => {
                warn!(order_id = %order_id, user_id = %user_id, "Payment refused: order belongs to another user");
                Err(CoreError::Ownership { order_id, user_id })
            }
            Some(_) => Ok(()),
        }
    }

    async fn pay_in(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: OrderId,
        user_id: UserId,
    ) -> CoreResult<PaymentConfirmation> {
        let order = lock_order(&mut *uow, order_id).await?;
        if order.user_id != user_id {
            return Err(CoreError::Ownership { order_id, user_id });
        }

        let paid = self.payments.initiate_payment(&mut *uow, &order).await?;
        let cleared = uow.clear_cart(user_id).await?;
        info!(order_id = %order_id, user_id = %user_id, "Cleared {} cart line(s) after payment", cleared);

        let items = uow.order_items(order_id).await?;
        let receipt = Receipt::issue(OrderWithItems { order: paid, items }, Utc::now());

        Ok(PaymentConfirmation {
            order_id,
            status: OrderStatus::Paid,
            receipt,
        })
    }

    pub async fn ship(&self, order_id: OrderId) -> CoreResult<OrderWithItems> {
        let mut uow = self.store.begin().await?;
        let result = match lock_order(uow.as_mut(), order_id).await {
            Ok(order) => self.shipper.ship_order(uow.as_mut(), &order).await,
            Err(err) => Err(err),
        };
        finish(uow, result).await
    }

    /// Administrative status edit, validated against the transition table.
    ///
    /// Edits to `Paid` and `Shipped` run the payment and shipping transitions
    /// so their stock side effects are never skipped.
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> CoreResult<Order> {
        let mut uow = self.store.begin().await?;
        let result = self.update_status_in(uow.as_mut(), order_id, status).await;
        if let Err(err) = &result {
            warn!(order_id = %order_id, requested = %status, "Status edit rejected: {}", err);
        }
        finish(uow, result).await
    }

    async fn update_status_in(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: OrderId,
        status: OrderStatus,
    ) -> CoreResult<Order> {
        let order = lock_order(&mut *uow, order_id).await?;
        order.status.ensure_transition(status)?;

        match status {
            OrderStatus::Paid => self.payments.initiate_payment(&mut *uow, &order).await,
            OrderStatus::Shipped => Ok(self.shipper.ship_order(&mut *uow, &order).await?.order),
            _ => {
                if !uow.update_order_status(order_id, order.status, status).await? {
                    return Err(lost_race(&mut *uow, order_id, status).await);
                }
                info!(order_id = %order_id, from = %order.status, to = %status, "Order status updated");
                Ok(Order { status, ..order })
            }
        }
    }

    pub async fn get_order(&self, order_id: OrderId) -> CoreResult<OrderWithItems> {
        let mut uow = self.store.begin().await?;
        let result = load_order(uow.as_mut(), order_id).await;
        finish(uow, result).await
    }

    pub async fn list_orders(&self) -> CoreResult<Vec<Order>> {
        self.list(OrderFilter::all()).await
    }

    pub async fn list_orders_for_user(&self, user_id: UserId) -> CoreResult<Vec<Order>> {
        self.list(OrderFilter::for_user(user_id)).await
    }

    async fn list(&self, filter: OrderFilter) -> CoreResult<Vec<Order>> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_orders(&filter).await;
        finish(uow, result).await
    }

    pub async fn awaiting_fulfilment(&self) -> CoreResult<Vec<FulfilmentEntry>> {
        let mut uow = self.store.begin().await?;
        let result = self.shipper.awaiting_fulfilment(uow.as_mut()).await;
        finish(uow, result).await
    }

    pub async fn invoice(&self, order_id: OrderId) -> CoreResult<Invoice> {
        Ok(Invoice::for_order(self.get_order(order_id).await?))
    }

    pub async fn receipt(&self, order_id: OrderId) -> CoreResult<Receipt> {
        Ok(Receipt::issue(self.get_order(order_id).await?, Utc::now()))
    }

    pub async fn packing_slip(&self, order_id: OrderId) -> CoreResult<PackingSlip> {
        let mut uow = self.store.begin().await?;
        let result = packing_slip_in(uow.as_mut(), order_id).await;
        finish(uow, result).await
    }

    pub async fn get_cart(&self, user_id: UserId) -> CoreResult<CartView> {
        let mut uow = self.store.begin().await?;
        let result = CartView::load(uow.as_mut(), user_id).await;
        finish(uow, result).await
    }

    /// Add an active product to the user's cart, merging with an existing line.
    pub async fn add_to_cart(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> CoreResult<CartView> {
        let quantity = positive_quantity(quantity)?;

        let mut uow = self.store.begin().await?;
        let result = add_to_cart_in(uow.as_mut(), user_id, product_id, quantity).await;
        finish(uow, result).await
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub async fn update_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> CoreResult<CartView> {
        if quantity <= 0 {
            return self.remove_from_cart(user_id, product_id).await;
        }
        let quantity = positive_quantity(quantity)?;

        let mut uow = self.store.begin().await?;
        let result = set_cart_line_in(uow.as_mut(), user_id, product_id, quantity).await;
        finish(uow, result).await
    }

    /// Removing a product that is not in the cart is a no-op.
    pub async fn remove_from_cart(&self, user_id: UserId, product_id: ProductId) -> CoreResult<CartView> {
        let mut uow = self.store.begin().await?;
        let result = remove_cart_line_in(uow.as_mut(), user_id, product_id).await;
        finish(uow, result).await
    }

    /// Empty the user's cart. Clearing an empty or missing cart is a no-op.
    pub async fn clear_cart(&self, user_id: UserId) -> CoreResult<u64> {
        let mut uow = self.store.begin().await?;
        let result = uow.clear_cart(user_id).await;
        finish(uow, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{LockCountingStore, Shop};
    use localshop_core::ErrorKind;
    use std::sync::atomic::Ordering;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_order_returns_breakdown() {
        let shop = Shop::open().await;

        let placed = shop.service.create_order(shop.customer, "1 Main St").await.unwrap();

        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.totals.subtotal, dec!(8.20));
        assert_eq!(placed.totals.tax, dec!(0.82));
        assert_eq!(placed.totals.total, dec!(19.02));

        let order = shop.service.get_order(placed.order_id).await.unwrap();
        assert_eq!(order.order.total, dec!(19.02));
        assert_eq!(order.order.shipping_address, "1 Main St");
        // cart is only emptied by payment
        assert_eq!(shop.store.cart(shop.customer).await.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_address_fails_before_any_write() {
        let shop = Shop::open().await;
        let before = shop.store.snapshot().await;

        let err = shop.service.create_order(shop.customer, "   ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(shop.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_state_unchanged() {
        let shop = Shop::open().await;
        let noodles = shop.add_product("Instant Noodles", dec!(2.00), 5).await;
        shop.store.add_to_cart(shop.customer, noodles, 6).await;
        let before = shop.store.snapshot().await;

        let err = shop.service.create_order(shop.customer, "1 Main St").await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock { product_id, available: 5, requested: 6 } if product_id == noodles
        ));
        assert_eq!(shop.store.snapshot().await, before);
        assert!(shop.service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_survives_catalogue_edits() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;

        let mut cola = shop.store.product(shop.cola).await.unwrap();
        cola.name = "Cola Zero 330ml".to_string();
        cola.price = dec!(9.99);
        shop.store.update_product(cola).await;
        shop.store.remove_product(shop.chips).await;

        let order = shop.service.get_order(order_id).await.unwrap();
        assert_eq!(order.items[0].product_name, "Classic Cola 330ml");
        assert_eq!(order.items[0].unit_price, dec!(2.50));
        assert_eq!(order.items[1].product_name, "Salted Chips 150g");
        assert_eq!(order.items[1].unit_price, dec!(3.20));

        let invoice = shop.service.invoice(order_id).await.unwrap();
        assert_eq!(invoice.subtotal, dec!(8.20));
        assert_eq!(invoice.total, dec!(19.02));
    }

    #[tokio::test]
    async fn test_pay_twice_decrements_once() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;

        let confirmation = shop.service.pay(order_id, shop.customer).await.unwrap();
        assert_eq!(confirmation.status, OrderStatus::Paid);
        assert_eq!(confirmation.receipt.receipt_number, format!("RCT-{}", order_id));
        assert_eq!(confirmation.receipt.total, dec!(19.02));
        assert!(shop.store.cart(shop.customer).await.is_empty());

        let err = shop.service.pay(order_id, shop.customer).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStateTransition { current: OrderStatus::Paid, requested: OrderStatus::Paid }
        ));
        assert_eq!(shop.store.product(shop.cola).await.unwrap().stock, 8);
        assert_eq!(shop.store.product(shop.chips).await.unwrap().stock, 4);
    }

    #[tokio::test]
    async fn test_concurrent_payments_decrement_once() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;

        let (first, second) = tokio::join!(
            shop.service.pay(order_id, shop.customer),
            shop.service.pay(order_id, shop.customer)
        );

        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let err = first.err().or(second.err()).unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(shop.store.product(shop.cola).await.unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_last_unit_sells_once() {
        let shop = Shop::open().await;
        let stamp = shop.add_product("Collector Stamp", dec!(5.00), 1).await;
        let other = shop.store.add_user("Other", "other@example.com").await;

        let mine = shop.store.add_user("Mine", "mine@example.com").await;
        shop.store.add_to_cart(mine, stamp, 1).await;
        shop.store.add_to_cart(other, stamp, 1).await;
        let mine_order = shop.service.create_order(mine, "1 Main St").await.unwrap().order_id;
        let other_order = shop.service.create_order(other, "2 Side St").await.unwrap().order_id;

        let (a, b) = tokio::join!(
            shop.service.pay(mine_order, mine),
            shop.service.pay(other_order, other)
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(matches!(err, CoreError::InsufficientStock { available: 0, requested: 1, .. }));
        assert_eq!(shop.store.product(stamp).await.unwrap().stock, 0);

        let statuses = [shop.order_status(mine_order).await, shop.order_status(other_order).await];
        assert!(statuses.contains(&OrderStatus::Paid));
        assert!(statuses.contains(&OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_pay_checks_ownership_first() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;
        let intruder = shop.store.add_user("Intruder", "intruder@example.com").await;
        let before = shop.store.snapshot().await;

        let err = shop.service.pay(order_id, intruder).await.unwrap_err();

        assert!(matches!(err, CoreError::Ownership { user_id, .. } if user_id == intruder));
        assert_eq!(shop.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_foreign_payment_takes_no_lock() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;
        let intruder = shop.store.add_user("Intruder", "intruder@example.com").await;
        let counting = LockCountingStore::new(shop.store.clone());
        let order_locks = counting.order_locks();
        let service = OrderService::new(Arc::new(counting), PricingConfig::default(), StockPolicy::OnPayment);

        let err = service.pay(order_id, intruder).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ownership);
        assert_eq!(order_locks.load(Ordering::SeqCst), 0);

        service.pay(order_id, shop.customer).await.unwrap();
        assert_eq!(order_locks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cart_edits_then_checkout() {
        let shop = Shop::open().await;
        let buyer = shop.store.add_user("Buyer", "buyer@example.com").await;

        let view = shop.service.add_to_cart(buyer, shop.cola, 1).await.unwrap();
        assert_eq!(view.item_count, 1);
        shop.service.add_to_cart(buyer, shop.cola, 2).await.unwrap();
        shop.service.add_to_cart(buyer, shop.chips, 4).await.unwrap();

        let view = shop.service.update_cart_item(buyer, shop.chips, 1).await.unwrap();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].quantity, 3);
        assert_eq!(view.total, dec!(10.70));

        let placed = shop.service.create_order(buyer, "4 Market Rd").await.unwrap();
        assert_eq!(placed.totals.subtotal, dec!(10.70));
        assert_eq!(placed.totals.total, dec!(21.77));
    }

    #[tokio::test]
    async fn test_cart_update_to_zero_removes_line() {
        let shop = Shop::open().await;

        let view = shop.service.update_cart_item(shop.customer, shop.chips, 0).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, shop.cola);

        let view = shop.service.remove_from_cart(shop.customer, shop.cola).await.unwrap();
        assert!(view.items.is_empty());
        // removing again is a no-op
        let view = shop.service.remove_from_cart(shop.customer, shop.cola).await.unwrap();
        assert_eq!(view.total, dec!(0));
    }

    #[tokio::test]
    async fn test_cart_rejects_bad_additions() {
        let shop = Shop::open().await;
        let stranger = uuid::Uuid::new_v4();
        let before = shop.store.snapshot().await;

        let err = shop.service.add_to_cart(shop.customer, shop.cola, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = shop.service.add_to_cart(stranger, shop.cola, 1).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(Missing::User(id)) if id == stranger));

        let err = shop.service.add_to_cart(shop.customer, uuid::Uuid::new_v4(), 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let mut chips = shop.store.product(shop.chips).await.unwrap();
        chips.is_active = false;
        shop.store.update_product(chips).await;
        let err = shop.service.add_to_cart(shop.customer, shop.chips, 1).await.unwrap_err();
        assert!(matches!(err, CoreError::ProductInactive(id) if id == shop.chips));

        let err = shop.service.update_cart_item(stranger, shop.cola, 2).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(Missing::Cart(_))));

        assert_eq!(shop.store.cart(shop.customer).await, before.carts[&shop.customer]);
    }

    #[tokio::test]
    async fn test_pay_unknown_order() {
        let shop = Shop::open().await;
        let err = shop.service.pay(uuid::Uuid::new_v4(), shop.customer).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;

        shop.service.pay(order_id, shop.customer).await.unwrap();
        let packing = shop.service.update_status(order_id, OrderStatus::Packing).await.unwrap();
        assert_eq!(packing.status, OrderStatus::Packing);

        let queue = shop.service.awaiting_fulfilment().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].items, "Classic Cola 330ml x2, Salted Chips 150g x1");

        let shipped = shop.service.ship(order_id).await.unwrap();
        assert_eq!(shipped.order.status, OrderStatus::Shipped);
        assert!(shop.service.awaiting_fulfilment().await.unwrap().is_empty());

        let delivered = shop.service.update_status(order_id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(shop.store.product(shop.cola).await.unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_status_edit_cannot_move_backward() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;
        shop.service.pay(order_id, shop.customer).await.unwrap();
        shop.service.ship(order_id).await.unwrap();

        let err = shop.service.update_status(order_id, OrderStatus::Pending).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::InvalidStateTransition { current: OrderStatus::Shipped, requested: OrderStatus::Pending }
        ));
        assert_eq!(shop.order_status(order_id).await, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_status_edit_to_paid_commits_stock() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;

        let order = shop.service.update_status(order_id, OrderStatus::Paid).await.unwrap();

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(shop.store.product(shop.cola).await.unwrap().stock, 8);
        // admin edits leave the customer's cart alone
        assert_eq!(shop.store.cart(shop.customer).await.len(), 2);
    }

    #[tokio::test]
    async fn test_ship_pending_order_fails() {
        let shop = Shop::open().await;
        let order_id = shop.place_order().await;

        let err = shop.service.ship(order_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    }

    #[tokio::test]
    async fn test_quote_is_read_only() {
        let shop = Shop::open().await;
        let before = shop.store.snapshot().await;

        let quote = shop.service.quote(shop.customer, "1 Main St").await.unwrap();

        assert_eq!(quote.totals.total, dec!(19.02));
        assert_eq!(shop.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_packing_slip_and_listing() {
        let shop = Shop::open().await;
        let first = shop.place_order().await;
        let second = shop.service.create_order(shop.customer, "9 Second Ave").await.unwrap().order_id;

        let slip = shop.service.packing_slip(first).await.unwrap();
        assert_eq!(slip.user_email, "customer@yourlocalshop.com");
        assert_eq!(slip.total_paid, dec!(19.02));

        let mine = shop.service.list_orders_for_user(shop.customer).await.unwrap();
        assert_eq!(mine.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second, first]);
    }

    #[tokio::test]
    async fn test_clear_cart_is_idempotent() {
        let shop = Shop::open().await;

        assert_eq!(shop.service.clear_cart(shop.customer).await.unwrap(), 2);
        assert_eq!(shop.service.clear_cart(shop.customer).await.unwrap(), 0);
    }
}
