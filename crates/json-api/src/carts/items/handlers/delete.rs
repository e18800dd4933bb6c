//! Delete Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Delete Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Delete Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart item deleted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    state
        .carts
        .remove_item(user, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;

    use stockroom_app::domain::products::records::ProductUuid;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, user_service};

    use super::*;

    #[tokio::test]
    async fn test_delete_cart_item_returns_204() {
        let product = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_remove_item()
            .once()
            .withf(move |user, candidate| *user == TEST_USER_UUID && *candidate == product)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/cart/items/{product}"))
            .send(&user_service(
                mocks,
                Router::with_path("cart/items/{product}").delete(handler),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));
    }
}
