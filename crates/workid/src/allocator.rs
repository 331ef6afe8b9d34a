use crate::config::{AllocatorConfig, MAX_WORKER_IDS};
use crate::error::{Error, Result, StoreError};
use crate::key::reservation_key;
use crate::lease::WorkerIdLease;
use crate::store::KeyValueStore;
use std::sync::Arc;

/// Value written into every reservation key.
const RESERVATION_VALUE: &str = "1";

/// Claims a fleet-unique worker id by racing other processes through the
/// store's atomic create-if-absent primitive.
///
/// The allocator scans candidate ids `0..MAX_WORKER_IDS` in ascending order
/// and claims the first one whose reservation key it manages to create.
/// Under light load the lowest free id always wins, which keeps the active
/// id set dense; the range is finite and must not be eaten up by sparse
/// allocation.
///
/// The store is a shared resource, never owned: multiple allocators (one
/// per module namespace, say) can share one `Arc<S>`, and each acquired
/// lease runs a fully independent renewal task.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use workid::{AllocatorConfig, MemoryStore, WorkerIdAllocator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), workid::Error> {
/// let store = Arc::new(MemoryStore::new());
/// let allocator = WorkerIdAllocator::new(store, AllocatorConfig::new("svc"));
/// let lease = allocator.acquire().await?;
/// assert_eq!(lease.id(), 0);
/// lease.release().await?;
/// # Ok(())
/// # }
/// ```
pub struct WorkerIdAllocator<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    store: Arc<S>,
    config: AllocatorConfig,
}

impl<S> WorkerIdAllocator<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: AllocatorConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Claims the lowest free worker id in this allocator's namespace and
    /// starts the lease renewal heartbeat.
    ///
    /// Each candidate is attempted with a TTL of twice the heartbeat
    /// interval plus one second of slack. A per-candidate store fault does
    /// not abort the search; the scan records it and moves on to the next
    /// candidate.
    ///
    /// # Errors
    ///
    /// [`Error::Exhausted`] after all `MAX_WORKER_IDS` candidates fail. If
    /// any candidate failed at the store level, the last such fault is
    /// attached as the cause (last-error retention: a transient fault on a
    /// late candidate can shadow an earlier, more informative one).
    pub async fn acquire(&self) -> Result<WorkerIdLease<S>> {
        let app = self.config.app_name();
        let module = self.config.module_name();
        let ttl = self.config.lease_ttl();
        let mut last_err: Option<StoreError> = None;

        for candidate in 0..MAX_WORKER_IDS {
            let key = reservation_key(app, module, candidate);
            match self
                .store
                .create_if_absent(&key, RESERVATION_VALUE, ttl)
                .await
            {
                Ok(true) => {
                    tracing::debug!(%key, id = candidate, "worker id acquired");
                    let mut lease = WorkerIdLease::new(
                        candidate,
                        key,
                        self.config.heartbeat(),
                        ttl,
                        Arc::clone(&self.store),
                    );
                    lease.start_renewal();
                    return Ok(lease);
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(%key, error = %err, "candidate reservation failed, continuing scan");
                    last_err = Some(err);
                }
            }
        }

        tracing::warn!(
            app,
            module,
            "worker id namespace exhausted after {MAX_WORKER_IDS} candidates"
        );
        Err(Error::Exhausted { source: last_err })
    }

    /// Returns the store's held connection or session to its pool.
    pub async fn release_connection(&self) -> Result<()> {
        self.store.release_connection().await?;
        Ok(())
    }
}
