//! Cart Item Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_app::domain::carts::records::{CartItemUpdate, CartLine};

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod update;

/// A cart line after a change.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub(crate) struct CartLineResponse {
    /// The product held in the cart
    pub product_uuid: Uuid,

    /// Units now held; zero once the line is removed
    pub quantity: u64,

    /// Whether the change removed the line
    pub removed: bool,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            product_uuid: line.product_uuid.into(),
            quantity: line.quantity,
            removed: false,
        }
    }
}

impl From<CartItemUpdate> for CartLineResponse {
    fn from(update: CartItemUpdate) -> Self {
        match update {
            CartItemUpdate::Set(line) => line.into(),
            CartItemUpdate::Removed(product) => Self {
                product_uuid: product.into(),
                quantity: 0,
                removed: true,
            },
        }
    }
}
