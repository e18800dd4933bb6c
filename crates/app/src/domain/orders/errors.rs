//! Orders service errors.

use thiserror::Error;

use crate::domain::{carts::store::CartStoreError, products::records::ProductUuid};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("address not found")]
    AddressNotFound,

    #[error("cart is empty")]
    EmptyCart,

    #[error("product {0} is no longer available")]
    ProductGone(ProductUuid),

    #[error("only {remaining} units of \"{name}\" left in stock")]
    InsufficientStock {
        product: ProductUuid,
        name: String,
        remaining: u64,
    },

    #[error("order total out of range")]
    TotalOverflow,

    #[error("cart store error")]
    Store(#[from] CartStoreError),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for OrdersServiceError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Sql(other),
        }
    }
}
