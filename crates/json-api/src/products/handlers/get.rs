//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_app::domain::{
    availability::records::ProductAvailability, products::records::ProductRecord,
};

use crate::{extensions::*, products::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub uuid: Uuid,

    /// The product name
    pub name: String,

    /// The product description
    pub description: String,

    /// The current price of the product in pence/cents
    pub price: u64,

    /// Whether the product is featured in the storefront
    pub is_featured: bool,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        ProductResponse {
            uuid: product.uuid.into(),
            name: product.name,
            description: product.description,
            price: product.price,
            is_featured: product.is_featured,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Product detail with the stock the caller can still reserve.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductDetailResponse {
    /// The product
    pub product: ProductResponse,

    /// Durable stock less the units held in other shoppers' carts
    pub available_stock: u64,

    /// Whether only a few units remain
    pub low_stock: bool,

    /// Whether no units remain for this caller
    pub out_of_stock: bool,
}

impl From<ProductAvailability> for ProductDetailResponse {
    fn from(detail: ProductAvailability) -> Self {
        ProductDetailResponse {
            product: detail.product.into(),
            available_stock: detail.availability.available_stock,
            low_stock: detail.availability.low_stock,
            out_of_stock: detail.availability.out_of_stock,
        }
    }
}

/// Get Product Handler
///
/// Returns a product with its availability. Units in the caller's own cart are not
/// counted against them.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductDetailResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let viewer = depot.viewer_uuid();

    let detail = state
        .availability
        .product_availability(product.into_inner().into(), viewer)
        .await
        .map_err(into_status_error)?;

    Ok(Json(detail.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use stockroom_app::domain::{
        availability::records::Availability,
        products::{ProductsServiceError, records::ProductUuid},
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, guest_service, make_product, user_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}").get(handler)
    }

    #[tokio::test]
    async fn test_get_returns_availability_for_guest() -> TestResult {
        let uuid = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .availability
            .expect_product_availability()
            .once()
            .withf(move |product, viewer| *product == uuid && viewer.is_none())
            .return_once(move |_, _| {
                Ok(ProductAvailability {
                    product: make_product(uuid, 150_00, 3),
                    availability: Availability::from_stock(3, 2, 2),
                })
            });

        let response: ProductDetailResponse =
            TestClient::get(format!("http://example.com/products/{uuid}"))
                .send(&guest_service(mocks, route()))
                .await
                .take_json()
                .await?;

        assert_eq!(response.product.uuid, uuid.into_uuid());
        assert_eq!(response.product.price, 150_00);
        assert_eq!(response.available_stock, 1);
        assert!(response.low_stock);
        assert!(!response.out_of_stock);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_passes_the_viewer_through() -> TestResult {
        let uuid = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .availability
            .expect_product_availability()
            .once()
            .withf(move |product, viewer| *product == uuid && *viewer == Some(TEST_USER_UUID))
            .return_once(move |_, _| {
                Ok(ProductAvailability {
                    product: make_product(uuid, 150_00, 3),
                    availability: Availability::from_stock(3, 0, 2),
                })
            });

        let res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_product_returns_404() {
        let uuid = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .availability
            .expect_product_availability()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&guest_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_get_malformed_uuid_returns_400() {
        let res = TestClient::get("http://example.com/products/not-a-uuid")
            .send(&guest_service(Mocks::default(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
