//! Featured Products Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    products::{errors::into_status_error, index::ProductsResponse},
    state::State,
};

/// Featured Products Handler
///
/// Returns the products flagged for the storefront front page.
#[endpoint(
    tags("products"),
    summary = "List Featured Products",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let products = state
        .products
        .list_featured_products()
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProductsResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use stockroom_app::domain::products::records::{ProductRecord, ProductUuid};

    use crate::test_helpers::{Mocks, guest_service, make_product};

    use super::*;

    #[tokio::test]
    async fn test_featured_lists_only_featured_products() -> TestResult {
        let uuid = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks.products.expect_list_products().never();
        mocks
            .products
            .expect_list_featured_products()
            .once()
            .return_once(move || {
                Ok(vec![ProductRecord {
                    is_featured: true,
                    ..make_product(uuid, 999, 5)
                }])
            });

        let response: ProductsResponse = TestClient::get("http://example.com/products/featured")
            .send(&guest_service(
                mocks,
                Router::with_path("products/featured").get(handler),
            ))
            .await
            .take_json()
            .await?;

        assert_eq!(response.products.len(), 1);
        assert!(response.products.iter().all(|product| product.is_featured));

        Ok(())
    }
}
