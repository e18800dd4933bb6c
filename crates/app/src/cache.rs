//! Redis connection management

use redis::{Client, RedisError, aio::ConnectionManager};

/// Connect to Redis and wrap the connection in a reconnecting manager.
///
/// The manager is cheap to clone; every clone multiplexes over the same connection.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the initial connection fails.
pub async fn connect(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let client = Client::open(redis_url)?;

    ConnectionManager::new(client).await
}
