use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round a money amount to cents, halves away from zero.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax (0.10 is ten percent)
    pub tax_rate: Decimal,

    /// Flat shipping charge per order
    pub shipping_cost: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            shipping_cost: Decimal::new(1000, 2),
        }
    }
}

/// Price breakdown of an order or quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

/// Pure pricing arithmetic for carts and orders.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Compute totals from `(unit price, quantity)` pairs.
    ///
    /// Tax is rounded to cents before it is added, and the final sum is
    /// rounded again. Both roundings are part of the contract.
    pub fn compute<I>(&self, lines: I) -> Totals
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let subtotal: Decimal = lines
            .into_iter()
            .map(|(unit_price, quantity)| unit_price * Decimal::from(quantity))
            .sum();
        let tax = round2(subtotal * self.config.tax_rate);
        let total = round2(subtotal + tax + self.config.shipping_cost);

        Totals {
            subtotal,
            tax,
            shipping_cost: self.config.shipping_cost,
            total,
        }
    }
}
