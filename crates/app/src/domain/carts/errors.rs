//! Carts service errors.

use thiserror::Error;

use crate::domain::{carts::store::CartStoreError, products::ProductsServiceError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("product not found")]
    ProductNotFound,

    #[error("product is out of stock")]
    OutOfStock,

    #[error("only {available} units available")]
    InsufficientStock { available: u64 },

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("cart store error")]
    Store(#[from] CartStoreError),

    #[error("catalog error")]
    Catalog(#[source] ProductsServiceError),
}

impl From<ProductsServiceError> for CartsServiceError {
    fn from(error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::NotFound => Self::ProductNotFound,
            other => Self::Catalog(other),
        }
    }
}
