//! Addresses service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        addresses::{
            data::NewAddress,
            errors::AddressesServiceError,
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl AddressesService for PgAddressesService {
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_address(&mut tx, user, address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin().await?;

        let address = self.repository.get_address(&mut tx, user, address).await?;

        tx.commit().await?;

        address.ok_or(AddressesServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
/// Shipping address lookups for a single owner.
pub trait AddressesService: Send + Sync {
    /// Save a new address for `user`.
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Retrieve an address, failing with `NotFound` when it belongs to someone else.
    async fn get_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;
}
