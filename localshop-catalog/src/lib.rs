pub mod inventory;
pub mod pricing;

pub use inventory::{StockDemand, StockVerifier};
pub use pricing::{round2, PricingConfig, PricingEngine, Totals};
