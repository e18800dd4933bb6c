//! Configuration groups shared by the CLI and the JSON server.

use clap::{Args, builder::RangedU64ValueParser};

/// Default low-stock warning threshold, in units.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 2;

/// Default sliding cart expiration: 7 days.
pub const DEFAULT_CART_TTL_SECONDS: u64 = 60 * 60 * 24 * 7;

/// Default Redis key prefix for cart hashes.
pub const DEFAULT_CART_KEY_PREFIX: &str = "cart";

/// Default `COUNT` hint for each cart scan page.
pub const DEFAULT_CART_SCAN_BATCH_SIZE: usize = 100;

/// Default number of attempts for an order commit that hits a serialization conflict.
pub const DEFAULT_ORDER_COMMIT_ATTEMPTS: u32 = 3;

/// Database settings.
#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Cart store settings.
#[derive(Debug, Clone, Args)]
pub struct RedisConfig {
    /// Redis connection string
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,
}

/// Stock reservation and checkout tuning.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InventoryConfig {
    /// Available stock at or below which a product is flagged as low stock
    #[arg(long, env = "LOW_STOCK_THRESHOLD", default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    pub low_stock_threshold: u64,

    /// Seconds a cart survives after its last write
    #[arg(
        long,
        env = "CART_TTL_SECONDS",
        default_value_t = DEFAULT_CART_TTL_SECONDS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cart_ttl_seconds: u64,

    /// Redis key prefix for cart hashes
    #[arg(long, env = "CART_KEY_PREFIX", default_value = DEFAULT_CART_KEY_PREFIX)]
    pub cart_key_prefix: String,

    /// `COUNT` hint passed to each `SCAN` call over cart keys
    #[arg(
        long,
        env = "CART_SCAN_BATCH_SIZE",
        default_value_t = DEFAULT_CART_SCAN_BATCH_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub cart_scan_batch_size: usize,

    /// Attempts made when an order commit hits a serialization failure or deadlock
    #[arg(long, env = "ORDER_COMMIT_ATTEMPTS", default_value_t = DEFAULT_ORDER_COMMIT_ATTEMPTS)]
    pub order_commit_attempts: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            cart_ttl_seconds: DEFAULT_CART_TTL_SECONDS,
            cart_key_prefix: DEFAULT_CART_KEY_PREFIX.to_string(),
            cart_scan_batch_size: DEFAULT_CART_SCAN_BATCH_SIZE,
            order_commit_attempts: DEFAULT_ORDER_COMMIT_ATTEMPTS,
        }
    }
}
