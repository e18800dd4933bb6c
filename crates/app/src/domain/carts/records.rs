//! Cart Records

use crate::domain::products::records::{ProductRecord, ProductUuid};

/// A raw cart entry as held in the cart store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_uuid: ProductUuid,

    /// Reserved quantity; always at least 1.
    pub quantity: u64,
}

/// Outcome of setting a cart entry's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartItemUpdate {
    /// The entry now holds this quantity.
    Set(CartLine),

    /// A zero quantity removed the entry.
    Removed(ProductUuid),
}

/// A cart entry joined with current product data.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product: ProductRecord,
    pub quantity: u64,

    /// `quantity` times the product's current price.
    pub line_total: u64,
}

/// A shopper's cart priced at current product prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: u64,
}
