use crate::error::{Error, Result};
use crate::store::KeyValueStore;
use core::time::Duration;
use portable_atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Observable lifecycle of a lease's renewal task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LeaseState {
    /// The lease exists but its renewal task has not started.
    Idle = 0,
    /// The renewal task is heartbeating the reservation.
    Running = 1,
    /// The renewal task has been stopped and will not restart.
    Stopped = 2,
}

/// Atomic Idle → Running → Stopped transition guard.
///
/// Repeated start attempts are provably no-ops: only the one caller that
/// wins the Idle → Running exchange spawns a task, and a stopped lease can
/// never return to Running.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(LeaseState::Idle as u8),
        }
    }

    /// Attempts the Idle → Running transition. Returns `false` if the task
    /// is already running or stopped.
    pub(crate) fn try_start(&self) -> bool {
        self.state
            .compare_exchange(
                LeaseState::Idle as u8,
                LeaseState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn stop(&self) {
        self.state.store(LeaseState::Stopped as u8, Ordering::Release);
    }

    pub(crate) fn get(&self) -> LeaseState {
        match self.state.load(Ordering::Acquire) {
            0 => LeaseState::Idle,
            1 => LeaseState::Running,
            _ => LeaseState::Stopped,
        }
    }
}

/// A claimed worker identity and its renewal heartbeat.
///
/// Returned by [`WorkerIdAllocator::acquire`]. The id is fixed for the
/// lease's lifetime. A background task renews the reservation's TTL every
/// heartbeat interval until [`release`] is called or the lease is dropped;
/// on drop without release the task stops and the store entry simply
/// expires on its own.
///
/// [`WorkerIdAllocator::acquire`]: crate::allocator::WorkerIdAllocator::acquire
/// [`release`]: WorkerIdLease::release
#[derive(Debug)]
pub struct WorkerIdLease<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    id: u16,
    key: String,
    heartbeat: Duration,
    ttl: Duration,
    store: Arc<S>,
    lifecycle: Arc<Lifecycle>,
    cancel: CancellationToken,
    renewal: Option<JoinHandle<()>>,
}

impl<S> WorkerIdLease<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    pub(crate) fn new(
        id: u16,
        key: String,
        heartbeat: Duration,
        ttl: Duration,
        store: Arc<S>,
    ) -> Self {
        Self {
            id,
            key,
            heartbeat,
            ttl,
            store,
            lifecycle: Arc::new(Lifecycle::new()),
            cancel: CancellationToken::new(),
            renewal: None,
        }
    }

    /// The claimed worker id, always in `[0, MAX_WORKER_IDS)`.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// The reservation key backing this lease.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current state of the renewal task.
    pub fn state(&self) -> LeaseState {
        self.lifecycle.get()
    }

    /// Spawns the renewal task. A no-op unless the lease is Idle.
    pub(crate) fn start_renewal(&mut self) {
        if !self.lifecycle.try_start() {
            return;
        }
        let store = Arc::clone(&self.store);
        let lifecycle = Arc::clone(&self.lifecycle);
        let cancel = self.cancel.clone();
        let key = self.key.clone();
        let heartbeat = self.heartbeat;
        let ttl = self.ttl;
        self.renewal = Some(tokio::spawn(renewal_loop(
            store, key, heartbeat, ttl, cancel, lifecycle,
        )));
    }

    /// Releases the worker id: stops the renewal task, then deletes the
    /// reservation key.
    ///
    /// # Errors
    ///
    /// - [`Error::ReleaseMismatch`] if the delete removed zero keys (the
    ///   lease had already expired or been released).
    /// - [`Error::Store`] if the delete itself failed at the store level;
    ///   the renewal task is already stopped at that point, so the lease
    ///   will lapse on its own even if the caller does not retry.
    pub async fn release(mut self) -> Result<()> {
        self.stop_renewal().await;
        let removed = self.store.delete(&self.key).await?;
        if removed != 1 {
            return Err(Error::ReleaseMismatch {
                key: self.key.clone(),
                removed,
            });
        }
        tracing::debug!(key = %self.key, id = self.id, "worker id released");
        Ok(())
    }

    async fn stop_renewal(&mut self) {
        self.lifecycle.stop();
        self.cancel.cancel();
        if let Some(task) = self.renewal.take() {
            // A panic inside the renewal task surfaces here instead of
            // dying silently.
            if let Err(err) = task.await {
                tracing::error!(key = %self.key, error = %err, "lease renewal task failed");
            }
        }
    }
}

impl<S> Drop for WorkerIdLease<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    fn drop(&mut self) {
        // Abandoned without release: stop heartbeating and let the store
        // entry expire on its own.
        self.lifecycle.stop();
        self.cancel.cancel();
    }
}

/// Periodically extends the reservation's expiry until cancelled.
///
/// A failed or missed renewal is logged and the loop continues: one miss is
/// not fatal because the TTL covers two heartbeat windows, but repeated
/// misses let the lease lapse, after which another process may claim the
/// same id.
async fn renewal_loop<S>(
    store: Arc<S>,
    key: String,
    heartbeat: Duration,
    ttl: Duration,
    cancel: CancellationToken,
    lifecycle: Arc<Lifecycle>,
) where
    S: KeyValueStore + Send + Sync + 'static,
{
    tracing::debug!(%key, ?heartbeat, "lease renewal started");
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(heartbeat) => {}
        }
        match store.extend_expiry(&key, ttl).await {
            Ok(true) => tracing::trace!(%key, "lease renewed"),
            Ok(false) => tracing::warn!(%key, "lease missing during renewal"),
            Err(err) => tracing::warn!(%key, error = %err, "lease renewal failed"),
        }
    }
    lifecycle.stop();
    tracing::debug!(%key, "lease renewal stopped");
}
