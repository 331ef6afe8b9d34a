//! Error types for worker identity allocation.
//!
//! The crate distinguishes three failure classes:
//! - [`StoreError`]: the backing store failed to execute an operation
//!   (transport or backend fault), wrapped with operation context.
//! - [`Error::Exhausted`]: the full candidate range was scanned without
//!   claiming an id.
//! - [`Error::ReleaseMismatch`]: a release did not remove exactly one key
//!   (the lease had already expired or was never created).

use crate::config::MAX_WORKER_IDS;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A failed operation against the backing key-value store.
///
/// Carries the name of the store operation and the key it targeted so that a
/// single log line is enough to locate the fault. An *absent key* is never a
/// `StoreError`: backends translate "not found" into `Ok(false)` / `Ok(0)`
/// per the [`KeyValueStore`] contract.
///
/// [`KeyValueStore`]: crate::store::KeyValueStore
#[derive(Debug, thiserror::Error)]
#[error("store {op} failed for key {key:?}")]
pub struct StoreError {
    op: &'static str,
    key: String,
    #[source]
    source: Box<dyn core::error::Error + Send + Sync>,
}

impl StoreError {
    /// Wraps a backend fault with the operation name and target key.
    pub fn new(
        op: &'static str,
        key: impl Into<String>,
        source: impl core::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            op,
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// The store operation that failed (e.g. `"create_if_absent"`).
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// The key the failed operation targeted.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Unified error type for the allocator and lease lifecycle.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The backing store failed to execute a requested operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every candidate id in `[0, MAX_WORKER_IDS)` was already held or
    /// failed to reserve.
    ///
    /// If any candidate failed at the store level during the scan, the
    /// *last* such failure is retained as the cause. The scan keeps going
    /// past per-candidate faults, so the retained error reflects whichever
    /// attempt failed last, not necessarily the first or most informative
    /// one.
    #[error("no worker id available ({MAX_WORKER_IDS} candidates scanned)")]
    Exhausted {
        #[source]
        source: Option<StoreError>,
    },

    /// A release did not remove exactly one reservation key.
    ///
    /// `removed == 0` means the lease had already expired, was already
    /// released, or was claimed by another process after expiry. Distinct
    /// from [`Error::Store`], which signals a transport fault.
    #[error("release of {key:?} removed {removed} keys, expected exactly one")]
    ReleaseMismatch { key: String, removed: usize },
}
