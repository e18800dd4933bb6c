//! Stockroom application core: catalog, carts, soft availability and checkout.

pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

mod uuids;
