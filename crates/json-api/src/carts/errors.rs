//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use stockroom_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::OutOfStock => StatusError::conflict().brief("Product is out of stock"),
        CartsServiceError::InsufficientStock { available } => {
            StatusError::conflict().brief(format!("Only {available} units available"))
        }
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        CartsServiceError::Store(source) => {
            error!("cart store failure: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::Catalog(source) => {
            error!("failed to read products for cart: {source}");

            StatusError::internal_server_error()
        }
    }
}
