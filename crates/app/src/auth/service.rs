//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use tracing::warn;

use crate::{
    auth::{
        ApiTokenUuid, AuthServiceError, IssuedApiToken, generate_api_token, hash_api_token,
        is_well_formed, repository::PgAuthRepository,
    },
    database::Db,
    domain::users::records::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: &Db) -> Self {
        Self {
            repository: PgAuthRepository::new(db.pool().clone()),
        }
    }

    /// Issue a new API token for the given user. The raw token is only available here.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::UnknownUser`] if the user does not exist, or a storage
    /// error if insertion fails.
    pub async fn issue_api_token(&self, user: UserUuid) -> Result<IssuedApiToken, AuthServiceError> {
        let token = generate_api_token();

        let metadata = self
            .repository
            .create_api_token(ApiTokenUuid::new(), user, &hash_api_token(&token))
            .await?;

        Ok(IssuedApiToken { token, metadata })
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token: ApiTokenUuid) -> Result<bool, AuthServiceError> {
        let rows_affected = self.repository.revoke_api_token(token).await?;

        Ok(rows_affected > 0)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserUuid, AuthServiceError> {
        if !is_well_formed(bearer_token) {
            return Err(AuthServiceError::NotFound);
        }

        let token = self
            .repository
            .find_user_by_token_hash(&hash_api_token(bearer_token))
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        // Best-effort metadata update; auth success should not depend on this write.
        if let Err(error) = self.repository.touch_api_token_last_used(token.uuid).await {
            warn!(token = %token.uuid, error = %error, "failed to record token use");
        }

        Ok(token.user_uuid)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the user it was issued to.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserUuid, AuthServiceError>;
}
