//! Orders
//!
//! Checkout turns a cart into an order inside a single PostgreSQL transaction. Durable
//! stock is only ever decremented here.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
