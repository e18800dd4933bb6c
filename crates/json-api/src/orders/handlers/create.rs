//! Place Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::{CheckoutOutcome, observe_checkout},
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlaceOrderRequest {
    /// One of the caller's saved addresses
    pub address_uuid: Uuid,
}

/// Place Order Handler
///
/// Converts the caller's whole cart into a pending order. Stock is re-checked and
/// decremented atomically; on any failure nothing is written and the cart is kept.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::NOT_FOUND, description = "Address or product not found"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let order = match state
        .orders
        .place_order(user, json.into_inner().address_uuid.into())
        .await
    {
        Ok(order) => order,
        Err(error) => {
            let status = into_status_error(error);

            observe_checkout(if status.code.is_server_error() {
                CheckoutOutcome::Failed
            } else {
                CheckoutOutcome::Rejected
            });

            return Err(status);
        }
    };

    observe_checkout(CheckoutOutcome::Placed);

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
