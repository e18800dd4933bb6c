//! State

use std::sync::Arc;

use stockroom_app::{
    auth::AuthService,
    context::AppContext,
    domain::{
        availability::AvailabilityService, carts::CartsService, orders::OrdersService,
        products::ProductsService,
    },
};

/// Services shared by every handler.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) products: Arc<dyn ProductsService>,
    pub(crate) availability: Arc<dyn AvailabilityService>,
    pub(crate) carts: Arc<dyn CartsService>,
    pub(crate) orders: Arc<dyn OrdersService>,
    pub(crate) auth: Arc<dyn AuthService>,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State").finish_non_exhaustive()
    }
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self {
            products: app.products,
            availability: app.availability,
            carts: app.carts,
            orders: app.orders,
            auth: app.auth,
        })
    }
}
