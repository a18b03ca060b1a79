pub mod error;
pub mod models;
pub mod repository;
pub mod status;

pub use error::{CoreError, CoreResult, ErrorKind, Missing};
pub use models::{
    CartLine, Order, OrderId, OrderItem, OrderWithItems, Product, ProductId, QuotedLine,
    StockPolicy, UserContact, UserId,
};
pub use repository::{finish, OrderFilter, Store, UnitOfWork};
pub use status::OrderStatus;
