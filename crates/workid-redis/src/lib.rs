#![doc = include_str!("../README.md")]

use core::time::Duration;
use redis::aio::ConnectionManager;
use workid::{KeyValueStore, StoreError};

/// A [`KeyValueStore`] backed by a shared Redis instance.
///
/// Built on [`ConnectionManager`], which multiplexes requests over a single
/// reconnecting connection. Cloning the manager is cheap and is how each
/// operation checks out a handle, so one `RedisStore` safely serves any
/// number of concurrent allocator handles.
///
/// A Redis nil reply is an expected outcome ("key absent"), never an error:
/// it surfaces as `Ok(false)` / `Ok(0)` per the [`KeyValueStore`] contract.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Wraps an existing [`ConnectionManager`].
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// Connects to Redis at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

/// TTLs are sent in milliseconds (`PX`/`PEXPIRE`) so sub-second precision
/// in the lease window survives the wire format.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

impl KeyValueStore for RedisStore {
    async fn create_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        // SET .. PX .. NX replies "OK" on create and nil when the key is
        // already held.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|err| StoreError::new("create_if_absent", key, err))?;
        Ok(reply.is_some())
    }

    async fn extend_expiry(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let updated: i64 = redis::cmd("PEXPIRE")
            .arg(key)
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|err| StoreError::new("extend_expiry", key, err))?;
        Ok(updated == 1)
    }

    async fn delete(&self, key: &str) -> Result<usize, StoreError> {
        let mut conn = self.manager.clone();
        let removed: usize = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|err| StoreError::new("delete", key, err))?;
        Ok(removed)
    }

    async fn release_connection(&self) -> Result<(), StoreError> {
        // The manager owns a single multiplexed connection shared by all
        // clones; there is nothing to return to a pool.
        Ok(())
    }
}
