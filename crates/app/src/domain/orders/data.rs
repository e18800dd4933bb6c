//! Order Data

use crate::domain::{
    addresses::records::AddressUuid,
    orders::records::{OrderItemUuid, OrderUuid},
    products::records::ProductUuid,
    users::records::UserUuid,
};

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub address_uuid: AddressUuid,
    pub subtotal: u64,
}

/// A cart line priced against the locked product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub quantity: u64,
    pub price_at_time: u64,
}
