//! Availability
//!
//! Soft, derived stock: durable stock minus what other shoppers currently hold in their
//! carts. Never persisted and never authoritative; only the order committer decides
//! whether stock is really there.

pub mod records;
pub mod service;

pub use service::*;
