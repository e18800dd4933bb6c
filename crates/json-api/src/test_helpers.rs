//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use stockroom_app::{
    auth::MockAuthService,
    domain::{
        availability::MockAvailabilityService,
        carts::MockCartsService,
        orders::MockOrdersService,
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        users::records::UserUuid,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_uuid(TEST_USER_UUID);
    ctrl.call_next(req, depot, res).await;
}

/// One mock per service. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) products: MockProductsService,
    pub(crate) availability: MockAvailabilityService,
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        Arc::new(State {
            products: Arc::new(self.products),
            availability: Arc::new(self.availability),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            auth: Arc::new(self.auth),
        })
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Mocks {
        auth,
        ..Mocks::default()
    }
    .into_state()
}

/// Serve `route` as [`TEST_USER_UUID`].
pub(crate) fn user_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_user)
            .push(route),
    )
}

/// Serve `route` without an authenticated user.
pub(crate) fn guest_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .push(route),
    )
}

pub(crate) fn make_product(uuid: ProductUuid, price: u64, stock: u64) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Charizard Holo".to_string(),
        description: "Base Set, unlimited".to_string(),
        price,
        stock,
        is_featured: false,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}
