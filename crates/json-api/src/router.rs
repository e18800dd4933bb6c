//! App Router

use salvo::Router;

use crate::{auth, carts, orders, products};

/// Every business route. Catalogue reads accept an optional token; cart and order
/// routes require one.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("products")
                .hoop(auth::middleware::optional)
                .get(products::index::handler)
                .push(Router::with_path("featured").get(products::featured::handler))
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::required)
                .push(
                    Router::with_path("cart")
                        .get(carts::get::handler)
                        .delete(carts::delete::handler)
                        .push(
                            Router::with_path("items")
                                .post(carts::items::create::handler)
                                .push(
                                    Router::with_path("{product}")
                                        .patch(carts::items::update::handler)
                                        .delete(carts::items::delete::handler),
                                ),
                        ),
                )
                .push(
                    Router::with_path("orders")
                        .get(orders::index::handler)
                        .post(orders::create::handler)
                        .push(Router::with_path("{order}").get(orders::get::handler)),
                ),
        )
}
