use core::time::Duration;

/// Upper bound (exclusive) of the candidate id range per namespace.
pub const MAX_WORKER_IDS: u16 = 1024;

/// Module name used when the caller does not set one.
pub const DEFAULT_MOD_NAME: &str = "default_mod";

/// Heartbeat interval used when the caller does not set one.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(30);

/// Smallest accepted heartbeat interval; shorter values are ignored.
pub const MIN_HEARTBEAT: Duration = Duration::from_secs(1);

/// Namespace and timing configuration for a [`WorkerIdAllocator`].
///
/// Worker ids are unique within an `(application, module)` namespace. An
/// application with a single id consumer can leave the module name at its
/// default; an application whose modules each need their own id sets a
/// distinct module name per allocator.
///
/// # Example
/// ```
/// use core::time::Duration;
/// use workid::AllocatorConfig;
///
/// let config = AllocatorConfig::new("checkout")
///     .with_module("orders")
///     .with_heartbeat(Duration::from_secs(10));
///
/// assert_eq!(config.app_name(), "checkout");
/// assert_eq!(config.module_name(), "orders");
/// ```
///
/// [`WorkerIdAllocator`]: crate::allocator::WorkerIdAllocator
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    app_name: String,
    mod_name: String,
    heartbeat: Duration,
}

impl AllocatorConfig {
    /// Creates a configuration for `app_name` with the default module name
    /// and heartbeat interval.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            mod_name: DEFAULT_MOD_NAME.to_owned(),
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }

    /// Sets the module name. An empty string is ignored and the previous
    /// value is retained.
    #[must_use]
    pub fn with_module(mut self, mod_name: impl Into<String>) -> Self {
        let mod_name = mod_name.into();
        if !mod_name.is_empty() {
            self.mod_name = mod_name;
        }
        self
    }

    /// Sets the heartbeat interval. Values below [`MIN_HEARTBEAT`] are
    /// ignored and the previous value is retained.
    #[must_use]
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        if heartbeat >= MIN_HEARTBEAT {
            self.heartbeat = heartbeat;
        }
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn module_name(&self) -> &str {
        &self.mod_name
    }

    pub fn heartbeat(&self) -> Duration {
        self.heartbeat
    }

    /// TTL applied on reservation and on every renewal.
    ///
    /// The doubled heartbeat window plus one second of slack tolerates a
    /// single missed renewal without losing the lease.
    pub fn lease_ttl(&self) -> Duration {
        self.heartbeat * 2 + Duration::from_secs(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = AllocatorConfig::new("svc");
        assert_eq!(config.app_name(), "svc");
        assert_eq!(config.module_name(), DEFAULT_MOD_NAME);
        assert_eq!(config.heartbeat(), DEFAULT_HEARTBEAT);
    }

    #[test]
    fn empty_module_name_is_ignored() {
        let config = AllocatorConfig::new("svc").with_module("");
        assert_eq!(config.module_name(), DEFAULT_MOD_NAME);

        let config = AllocatorConfig::new("svc").with_module("orders").with_module("");
        assert_eq!(config.module_name(), "orders");
    }

    #[test]
    fn sub_second_heartbeat_is_ignored() {
        let config = AllocatorConfig::new("svc").with_heartbeat(Duration::from_millis(999));
        assert_eq!(config.heartbeat(), DEFAULT_HEARTBEAT);

        let config = AllocatorConfig::new("svc")
            .with_heartbeat(Duration::from_secs(5))
            .with_heartbeat(Duration::from_millis(1));
        assert_eq!(config.heartbeat(), Duration::from_secs(5));
    }

    #[test]
    fn one_second_heartbeat_is_accepted() {
        let config = AllocatorConfig::new("svc").with_heartbeat(MIN_HEARTBEAT);
        assert_eq!(config.heartbeat(), MIN_HEARTBEAT);
    }

    #[test]
    fn lease_ttl_is_double_heartbeat_plus_slack() {
        let config = AllocatorConfig::new("svc");
        assert_eq!(config.lease_ttl(), Duration::from_secs(61));
    }
}
