//! Auth data models.

use jiff::Timestamp;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// API Token UUID
pub type ApiTokenUuid = TypedUuid<ApiTokenMetadata>;

/// The owner of a live token, found by its hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveApiToken {
    pub uuid: ApiTokenUuid,
    pub user_uuid: UserUuid,
}

/// API token metadata persisted in storage. The token itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTokenMetadata {
    pub uuid: ApiTokenUuid,
    pub user_uuid: UserUuid,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// API token issuance result with the one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub metadata: ApiTokenMetadata,
}
