//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_app::domain::carts::records::{Cart, CartItem};

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    /// Sum of the line totals at current prices
    pub subtotal: u64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartResponse {
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            subtotal: cart.subtotal,
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the product in the cart item
    pub product_uuid: Uuid,

    /// The product name
    pub name: String,

    /// The current unit price in pence/cents
    pub price: u64,

    /// Units held in the cart
    pub quantity: u64,

    /// Quantity times the current unit price
    pub line_total: u64,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product_uuid: item.product.uuid.into(),
            name: item.product.name,
            price: item.product.price,
            quantity: item.quantity,
            line_total: item.line_total,
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart priced at current product prices.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let cart = state
        .carts
        .get_cart(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
