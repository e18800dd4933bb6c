//! Carts
//!
//! Carts are ephemeral: each shopper owns one Redis hash mapping product UUID to
//! reserved quantity, expiring after a period without writes. Nothing here touches
//! durable stock.

pub mod errors;
pub mod records;
pub mod service;
pub mod store;

pub use errors::CartsServiceError;
pub use service::*;
pub use store::{
    CartScanPage, CartStore, CartStoreError, MockCartStore, RedisCartStore, ScanCursor,
};
