use crate::error::StoreError;
use crate::store::KeyValueStore;
use core::time::Duration;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

/// An in-process [`KeyValueStore`] backend.
///
/// Serves single-process deployments (where the "fleet" is one process and
/// coordination still goes through the same code path) and the test suite.
/// Entries expire against [`tokio::time::Instant`], so tests running under a
/// paused Tokio clock observe expiry deterministically.
///
/// All operations complete immediately; the internal lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the expiry instant recorded for `key`, or `None` if the key
    /// is absent or already expired.
    ///
    /// Inspection hook for operators and tests; not part of the
    /// [`KeyValueStore`] contract.
    pub fn expiry_of(&self, key: &str) -> Option<Instant> {
        let now = Instant::now();
        let map = self.lock();
        map.get(key).filter(|e| !e.is_expired(now)).map(|e| e.expires_at)
    }

    /// Returns the value recorded for `key`, or `None` if the key is absent
    /// or already expired.
    pub fn value_of(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let map = self.lock();
        map.get(key).filter(|e| !e.is_expired(now)).map(|e| e.value.clone())
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // still coherent for these single-step operations.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    async fn create_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut map = self.lock();
        if map.get(key).is_some_and(|e| !e.is_expired(now)) {
            return Ok(false);
        }
        map.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn extend_expiry(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut map = self.lock();
        match map.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut map = self.lock();
        match map.remove(key) {
            Some(entry) if !entry.is_expired(now) => Ok(1),
            _ => Ok(0),
        }
    }

    async fn release_connection(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn create_is_first_writer_wins() {
        let store = MemoryStore::new();
        assert!(store.create_if_absent("k", "1", TTL).await.unwrap());
        assert!(!store.create_if_absent("k", "2", TTL).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_key_is_indistinguishable_from_absent() {
        let store = MemoryStore::new();
        assert!(store.create_if_absent("k", "1", TTL).await.unwrap());

        tokio::time::advance(TTL).await;
        assert!(store.expiry_of("k").is_none());
        assert!(!store.extend_expiry("k", TTL).await.unwrap());
        assert_eq!(store.delete("k").await.unwrap(), 0);
        assert!(store.create_if_absent("k", "1", TTL).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn extend_pushes_expiry_forward() {
        let store = MemoryStore::new();
        store.create_if_absent("k", "1", TTL).await.unwrap();
        let first = store.expiry_of("k").unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.extend_expiry("k", TTL).await.unwrap());
        assert_eq!(store.expiry_of("k").unwrap(), first + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn delete_reports_removed_count() {
        let store = MemoryStore::new();
        store.create_if_absent("k", "1", TTL).await.unwrap();
        assert_eq!(store.delete("k").await.unwrap(), 1);
        assert_eq!(store.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn release_connection_is_a_no_op() {
        let store = MemoryStore::new();
        store.release_connection().await.unwrap();
        store.release_connection().await.unwrap();
    }
}
