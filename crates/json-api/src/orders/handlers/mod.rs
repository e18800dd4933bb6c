//! Order Handlers

pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use stockroom_app::domain::{
        addresses::records::{AddressRecord, AddressUuid},
        orders::records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderStatus, OrderUuid},
        products::records::ProductUuid,
    };

    use crate::test_helpers::TEST_USER_UUID;

    pub(super) fn make_order(uuid: OrderUuid) -> OrderRecord {
        OrderRecord {
            uuid,
            user_uuid: TEST_USER_UUID,
            status: OrderStatus::Pending,
            subtotal: 300,
            address: AddressRecord {
                uuid: AddressUuid::new(),
                user_uuid: TEST_USER_UUID,
                label: "Home".to_string(),
                street: "1-1 Chiyoda".to_string(),
                city: "Chiyoda".to_string(),
                state: "Tokyo".to_string(),
                zip: "100-0001".to_string(),
                country: "JP".to_string(),
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
                deleted_at: None,
            },
            items: vec![OrderItemRecord {
                uuid: OrderItemUuid::new(),
                order_uuid: uuid,
                product_uuid: ProductUuid::new(),
                product_name: "Pikachu Illustrator".to_string(),
                quantity: 2,
                price_at_time: 150,
            }],
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }
}
