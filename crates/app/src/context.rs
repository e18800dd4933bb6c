//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    cache,
    config::{DatabaseConfig, InventoryConfig, RedisConfig},
    database::{self, Db},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        availability::{AvailabilityCalculator, AvailabilityService},
        carts::{CartMutator, CartStore, CartStoreError, CartsService, RedisCartStore},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to connect to cart store")]
    Redis(#[source] redis::RedisError),

    #[error("invalid cart store settings")]
    CartStore(#[source] CartStoreError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub addresses: Arc<dyn AddressesService>,
    pub availability: Arc<dyn AvailabilityService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Connect to PostgreSQL and Redis and wire every service.
    ///
    /// # Errors
    ///
    /// Returns an error when either store is unreachable or the cart settings are invalid.
    pub async fn connect(
        database: &DatabaseConfig,
        redis: &RedisConfig,
        inventory: &InventoryConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(&database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        let connection = cache::connect(&redis.redis_url)
            .await
            .map_err(AppInitError::Redis)?;

        let store = RedisCartStore::new(
            connection,
            inventory.cart_key_prefix.clone(),
            inventory.cart_ttl_seconds,
        )
        .map_err(AppInitError::CartStore)?;

        Ok(Self::from_parts(Db::new(pool), Arc::new(store), inventory))
    }

    /// Wire every service over an existing database handle and cart store.
    #[must_use]
    pub fn from_parts(db: Db, store: Arc<dyn CartStore>, inventory: &InventoryConfig) -> Self {
        let products: Arc<dyn ProductsService> = Arc::new(PgProductsService::new(db.clone()));

        Self {
            availability: Arc::new(AvailabilityCalculator::new(
                products.clone(),
                store.clone(),
                inventory.low_stock_threshold,
                inventory.cart_scan_batch_size,
            )),
            carts: Arc::new(CartMutator::new(products.clone(), store.clone())),
            orders: Arc::new(PgOrdersService::new(
                db.clone(),
                store,
                inventory.order_commit_attempts,
            )),
            addresses: Arc::new(PgAddressesService::new(db.clone())),
            auth: Arc::new(PgAuthService::new(&db)),
            products,
        }
    }
}
