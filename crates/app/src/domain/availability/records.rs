//! Availability Records

use crate::domain::products::records::ProductRecord;

/// Stock a shopper can expect to buy, after other shoppers' reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Durable stock minus other carts' reservations, floored at zero.
    pub available_stock: u64,

    /// Some stock left, but at or below the low-stock threshold.
    pub low_stock: bool,
    pub out_of_stock: bool,
}

impl Availability {
    #[must_use]
    pub fn from_stock(durable_stock: u64, reserved_by_others: u64, low_stock_threshold: u64) -> Self {
        let available_stock = durable_stock.saturating_sub(reserved_by_others);

        Self {
            available_stock,
            low_stock: available_stock > 0 && available_stock <= low_stock_threshold,
            out_of_stock: available_stock == 0,
        }
    }
}

/// Product detail together with the viewer's soft availability.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAvailability {
    pub product: ProductRecord,
    pub availability: Availability,
}
