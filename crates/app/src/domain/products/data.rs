//! Products Data

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,

    /// Price in minor currency units.
    pub price: u64,

    /// Initial durable stock.
    pub stock: u64,
    pub is_featured: bool,
}

/// Product Update Data
///
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub price: Option<u64>,
    pub stock: Option<u64>,
}
