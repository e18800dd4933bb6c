//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use stockroom_app::domain::users::records::UserUuid;

const USER_UUID_DEPOT_KEY: &str = "user_uuid";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Record the authenticated shopper for downstream handlers.
    fn insert_user_uuid(&mut self, user: UserUuid);

    /// The authenticated shopper, or `401` when the request is anonymous.
    fn user_uuid_or_401(&self) -> Result<UserUuid, StatusError>;

    /// The authenticated shopper if any; guests are `None`.
    fn viewer_uuid(&self) -> Option<UserUuid>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_user_uuid(&mut self, user: UserUuid) {
        self.insert(USER_UUID_DEPOT_KEY, user);
    }

    fn user_uuid_or_401(&self) -> Result<UserUuid, StatusError> {
        self.viewer_uuid()
            .ok_or_else(|| StatusError::unauthorized().brief("Authentication required"))
    }

    fn viewer_uuid(&self) -> Option<UserUuid> {
        self.get::<UserUuid>(USER_UUID_DEPOT_KEY).ok().copied()
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn anonymous_depot_has_no_viewer() {
        let depot = Depot::new();

        assert_eq!(depot.viewer_uuid(), None);
        assert_eq!(
            depot.user_uuid_or_401().err().map(|error| error.code),
            Some(StatusCode::UNAUTHORIZED)
        );
    }

    #[test]
    fn inserted_user_is_returned() {
        let user = UserUuid::new();
        let mut depot = Depot::new();

        depot.insert_user_uuid(user);

        assert_eq!(depot.viewer_uuid(), Some(user));
        assert_eq!(depot.user_uuid_or_401().ok(), Some(user));
    }
}
