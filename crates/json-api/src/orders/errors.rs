//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use stockroom_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::AddressNotFound => StatusError::not_found().brief("Address not found"),
        OrdersServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        OrdersServiceError::ProductGone(product) => {
            StatusError::not_found().brief(format!("Product {product} is no longer available"))
        }
        OrdersServiceError::InsufficientStock {
            name, remaining, ..
        } => StatusError::conflict().brief(format!(
            "Only {remaining} units of \"{name}\" left in stock"
        )),
        OrdersServiceError::TotalOverflow => {
            StatusError::bad_request().brief("Order total out of range")
        }
        OrdersServiceError::Store(source) => {
            error!("cart store failure during checkout: {source}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
