pub mod cart;
pub mod checkout;
pub mod documents;
pub mod fulfillment;
pub mod manager;
pub mod models;
pub mod orchestrator;

#[cfg(test)]
mod test_support;

pub use cart::{CartView, CartViewLine};
pub use checkout::OrderWriter;
pub use documents::{Invoice, PackingSlip, Receipt};
pub use fulfillment::FulfilmentShipper;
pub use manager::OrderService;
pub use models::{FulfilmentEntry, PaymentConfirmation, PlacedOrder, Quote, ShippingAddress};
pub use orchestrator::PaymentTransitioner;
