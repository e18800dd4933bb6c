//! Cart store
//!
//! One Redis hash per shopper, keyed `<prefix>:<user uuid>`, with product UUIDs as
//! fields and reserved quantities as values.

use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use mockall::automock;
use redis::{AsyncCommands, RedisError, aio::ConnectionManager};
use thiserror::Error;
use tracing::warn;

use crate::domain::{
    carts::records::CartLine, products::records::ProductUuid, users::records::UserUuid,
};

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("cart store unavailable")]
    Redis(#[from] RedisError),

    #[error("cart TTL of {ttl_seconds}s is not a usable Redis expiry")]
    InvalidTtl { ttl_seconds: u64 },
}

/// Position of an incremental scan over cart keys. A scan starts at
/// [`ScanCursor::START`] and is complete once the store hands back a finished cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCursor(u64);

impl ScanCursor {
    pub const START: Self = Self(0);

    #[must_use]
    pub fn is_finished(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for ScanCursor {
    fn from(cursor: u64) -> Self {
        Self(cursor)
    }
}

/// One batch of cart owners returned by [`CartStore::scan_carts`].
///
/// A batch may repeat owners already seen in an earlier batch of the same scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartScanPage {
    pub next: ScanCursor,
    pub owners: Vec<UserUuid>,
}

#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Quantity of `product` in the user's cart, if present.
    async fn get_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<Option<u64>, CartStoreError>;

    /// All lines in the user's cart. An expired or absent cart is empty.
    async fn get_lines(&self, user: UserUuid) -> Result<Vec<CartLine>, CartStoreError>;

    /// Set a line's quantity and renew the cart's expiry.
    async fn set_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<(), CartStoreError>;

    /// Remove a single line. Removing an absent line is not an error.
    async fn remove_line(&self, user: UserUuid, product: ProductUuid)
    -> Result<(), CartStoreError>;

    /// Delete the whole cart.
    async fn delete_cart(&self, user: UserUuid) -> Result<(), CartStoreError>;

    /// Fetch the next batch of cart owners without blocking the store.
    async fn scan_carts(
        &self,
        cursor: ScanCursor,
        count: usize,
    ) -> Result<CartScanPage, CartStoreError>;
}

#[derive(Clone)]
pub struct RedisCartStore {
    connection: ConnectionManager,
    prefix: String,
    ttl_seconds: i64,
}

impl fmt::Debug for RedisCartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCartStore")
            .field("prefix", &self.prefix)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl RedisCartStore {
    /// Create a store over `connection`, keeping carts under `prefix` and expiring them
    /// `ttl_seconds` after their last write.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::InvalidTtl`] when the TTL is zero or out of Redis' range.
    /// `EXPIRE key 0` deletes the key outright.
    pub fn new(
        connection: ConnectionManager,
        prefix: impl Into<String>,
        ttl_seconds: u64,
    ) -> Result<Self, CartStoreError> {
        Ok(Self {
            connection,
            prefix: prefix.into(),
            ttl_seconds: expiry_seconds(ttl_seconds)?,
        })
    }

    fn match_pattern(&self) -> String {
        format!("{}:*", escape_glob(&self.prefix))
    }

    fn key(&self, user: UserUuid) -> String {
        format!("{}:{user}", self.prefix)
    }

    fn owner_of(&self, key: &str) -> Option<UserUuid> {
        key.strip_prefix(self.prefix.as_str())?
            .strip_prefix(':')?
            .parse()
            .ok()
    }
}

fn expiry_seconds(ttl_seconds: u64) -> Result<i64, CartStoreError> {
    i64::try_from(ttl_seconds)
        .ok()
        .filter(|ttl| *ttl > 0)
        .ok_or(CartStoreError::InvalidTtl { ttl_seconds })
}

/// Escape the characters `SCAN MATCH` treats as glob syntax.
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());

    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn get_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<Option<u64>, CartStoreError> {
        let mut conn = self.connection.clone();

        let quantity: Option<u64> = conn.hget(self.key(user), product.to_string()).await?;

        Ok(quantity)
    }

    async fn get_lines(&self, user: UserUuid) -> Result<Vec<CartLine>, CartStoreError> {
        let mut conn = self.connection.clone();

        let fields: HashMap<String, u64> = conn.hgetall(self.key(user)).await?;

        let mut lines: Vec<CartLine> = fields
            .into_iter()
            .filter_map(|(field, quantity)| match field.parse::<ProductUuid>() {
                Ok(product_uuid) if quantity > 0 => Some(CartLine {
                    product_uuid,
                    quantity,
                }),
                Ok(_) => None,
                Err(_) => {
                    warn!(%user, field = %field, "ignoring malformed cart field");
                    None
                }
            })
            .collect();

        lines.sort_by_key(|line| line.product_uuid);

        Ok(lines)
    }

    async fn set_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<(), CartStoreError> {
        let mut conn = self.connection.clone();
        let key = self.key(user);

        let () = redis::pipe()
            .atomic()
            .hset(&key, product.to_string(), quantity)
            .ignore()
            .expire(&key, self.ttl_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn remove_line(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartStoreError> {
        let mut conn = self.connection.clone();

        let _removed: u64 = conn.hdel(self.key(user), product.to_string()).await?;

        Ok(())
    }

    async fn delete_cart(&self, user: UserUuid) -> Result<(), CartStoreError> {
        let mut conn = self.connection.clone();

        let _removed: u64 = conn.del(self.key(user)).await?;

        Ok(())
    }

    async fn scan_carts(
        &self,
        cursor: ScanCursor,
        count: usize,
    ) -> Result<CartScanPage, CartStoreError> {
        let mut conn = self.connection.clone();

        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor.0)
            .arg("MATCH")
            .arg(self.match_pattern())
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        let owners = keys.iter().filter_map(|key| self.owner_of(key)).collect();

        Ok(CartScanPage {
            next: ScanCursor(next),
            owners,
        })
    }
}
