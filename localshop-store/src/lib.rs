pub mod app_config;
pub mod catalog_repo;
pub mod customer_repo;
pub mod database;
pub mod memory;
pub mod order_repo;

pub use database::DbClient;
pub use memory::{MemoryState, MemoryStore};
