//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_app::domain::{
    addresses::records::AddressRecord,
    orders::records::{OrderItemRecord, OrderRecord},
};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// Fulfillment status
    pub status: String,

    /// Sum of the item totals at the prices paid
    pub subtotal: u64,

    /// Where the order ships
    pub shipping_address: ShippingAddressResponse,

    /// The purchased items
    pub items: Vec<OrderItemResponse>,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order was last updated
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into(),
            status: order.status.to_string(),
            subtotal: order.subtotal,
            shipping_address: order.address.into(),
            items: order.items.into_iter().map(Into::into).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Shipping Address Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingAddressResponse {
    pub uuid: Uuid,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl From<AddressRecord> for ShippingAddressResponse {
    fn from(address: AddressRecord) -> Self {
        Self {
            uuid: address.uuid.into(),
            label: address.label,
            street: address.street,
            city: address.city,
            state: address.state,
            zip: address.zip,
            country: address.country,
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    /// The product purchased
    pub product_uuid: Uuid,

    /// The product name
    pub product_name: String,

    /// Units purchased
    pub quantity: u64,

    /// The unit price paid, in pence/cents
    pub price_at_time: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            product_uuid: item.product_uuid.into(),
            product_name: item.product_name,
            quantity: item.quantity,
            price_at_time: item.price_at_time,
        }
    }
}

/// Get Order Handler
///
/// Returns one of the caller's orders.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let order = state
        .orders
        .get_order(user, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
