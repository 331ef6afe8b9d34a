use crate::error::StoreError;
use core::time::Duration;

/// The four store operations the allocator and lease renewal depend on.
///
/// Any datastore offering an atomic create-if-absent-with-TTL, expiry
/// extension, and delete can back the allocator by implementing this trait.
/// The allocator never depends on a concrete backend.
///
/// ## Required semantics
///
/// - [`create_if_absent`] must be atomic across *all* calling processes
///   (test-and-set, not read-then-write). Uniqueness of allocated ids rests
///   entirely on this.
/// - An absent key is an expected outcome, not a fault: backends translate
///   "not found" into `Ok(false)` / `Ok(0)`, never into an error.
/// - Implementations must be safe for concurrent use by multiple allocator
///   handles sharing one store.
///
/// ## Cancellation
///
/// Every operation is a plain future; callers cancel or bound it by
/// dropping it (e.g. under [`tokio::time::timeout`]). The futures must be
/// `Send` so the renewal task can run them from a spawned task.
///
/// [`create_if_absent`]: KeyValueStore::create_if_absent
pub trait KeyValueStore {
    /// Atomically creates `key` with `value` and expiry `ttl` if it does not
    /// exist.
    ///
    /// Returns `Ok(true)` if the key was created, `Ok(false)` if it already
    /// existed and was left untouched.
    fn create_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Sets a new expiry on an existing key.
    ///
    /// Returns `Ok(false)` if the key does not currently exist.
    fn extend_expiry(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Removes `key` if present, returning the number of keys removed
    /// (0 or 1).
    fn delete(&self, key: &str) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Returns any held connection or session to its pool. Idempotent; a
    /// no-op for backends without pooled connections.
    fn release_connection(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
