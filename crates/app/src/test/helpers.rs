//! Test Helpers

use jiff::Timestamp;

use crate::domain::{
    addresses::{data::NewAddress, records::AddressUuid},
    products::{
        data::NewProduct,
        records::{ProductRecord, ProductUuid},
    },
};

pub(crate) fn new_product(name: &str, price: u64, stock: u64) -> NewProduct {
    NewProduct {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        description: String::new(),
        price,
        stock,
        is_featured: false,
    }
}

pub(crate) fn new_address() -> NewAddress {
    NewAddress {
        uuid: AddressUuid::new(),
        label: "home".to_string(),
        street: "1 Pallet Road".to_string(),
        city: "Pallet Town".to_string(),
        state: "Kanto".to_string(),
        zip: "00001".to_string(),
        country: "JP".to_string(),
    }
}

/// An in-memory product record for mocked service tests.
pub(crate) fn product_record(uuid: ProductUuid, price: u64, stock: u64) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Test Card".to_string(),
        description: String::new(),
        price,
        stock,
        is_featured: false,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}
