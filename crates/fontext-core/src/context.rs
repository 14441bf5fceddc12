//! The runtime context extensions are called through

// this_file: crates/fontext-core/src/context.rs

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    bus::{NotificationBus, SubscriptionHandle},
    cache::{CacheMetrics, CacheStore},
    cache_config::CacheConfig,
    error::{ConfigError, Result},
    extension::{Declared, Dependencies},
    lifecycle,
    owner::{Owner, OwnerId},
    registrar::Registrar,
    registry::ExtensionRegistry,
};

struct Shared {
    registry: Arc<ExtensionRegistry>,
    bus: Arc<dyn NotificationBus>,
    store: Arc<CacheStore>,
    registrar: Registrar,
    config: CacheConfig,
    lifecycle: Mutex<Option<SubscriptionHandle>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(handle) = self.lifecycle.lock().take() {
            self.bus.unsubscribe(handle);
        }
        self.registrar.clear();
    }
}

/// A registry bound to a host's notification bus, plus the caches
///
/// Cloning is cheap and clones share caches. When the last clone is dropped
/// every subscription it made is cancelled.
///
/// ```
/// use std::sync::Arc;
/// use fontext_core::{CacheConfig, EventBus, Extensions, RegistryBuilder};
///
/// let registry = Arc::new(RegistryBuilder::new().build());
/// let bus = Arc::new(EventBus::new());
/// let ext = Extensions::new(registry, bus, CacheConfig::default());
/// assert!(ext.config().enabled);
/// ```
#[derive(Clone)]
pub struct Extensions {
    shared: Arc<Shared>,
}

impl Extensions {
    pub fn new(
        registry: Arc<ExtensionRegistry>,
        bus: Arc<dyn NotificationBus>,
        config: CacheConfig,
    ) -> Self {
        let store = Arc::new(CacheStore::new());
        let registrar = Registrar::new(Arc::clone(&bus), Arc::clone(&store));
        let shared = Arc::new(Shared {
            registry,
            bus,
            store,
            registrar,
            config,
            lifecycle: Mutex::new(None),
        });

        if config.enabled {
            let weak = Arc::downgrade(&shared);
            let handle = shared.bus.subscribe_lifecycle(Arc::new(move |signal| {
                if let Some(shared) = weak.upgrade() {
                    lifecycle::on_signal(&shared.store, &shared.registrar, signal);
                }
            }));
            *shared.lifecycle.lock() = Some(handle);
        } else {
            log::info!("fontext caching disabled; cached extensions recompute on every call");
        }

        Self { shared }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.shared.registry
    }

    pub fn config(&self) -> CacheConfig {
        self.shared.config
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.shared.store.metrics()
    }

    pub fn store(&self) -> &CacheStore {
        &self.shared.store
    }

    pub fn registrar(&self) -> &Registrar {
        &self.shared.registrar
    }

    /// Drop everything cached for `owner`, as if it had been destroyed
    pub fn forget(&self, owner: OwnerId) {
        lifecycle::teardown(&self.shared.store, &self.shared.registrar, owner);
    }

    pub(crate) fn check_handle(&self, declared: &Declared) -> Result<()> {
        if declared.registry != self.shared.registry.id() {
            return Err(ConfigError::ForeignExtension(declared.name.to_string()).into());
        }
        Ok(())
    }

    /// Read path shared by cached methods and properties
    pub(crate) fn cached<O, A, V, F>(
        &self,
        declared: &Declared,
        dependencies: &Dependencies<O>,
        owner: &O,
        arg: &A,
        compute: F,
    ) -> Result<V>
    where
        O: Owner,
        A: Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<V>,
    {
        self.check_handle(declared)?;
        if !self.shared.config.enabled {
            return compute();
        }

        let id = owner.owner_id();
        let registrar = &self.shared.registrar;
        if !registrar.is_registered(id, declared.id) {
            let bindings = dependencies.bindings(owner, &declared.name)?;
            registrar.register(id, declared.id, &declared.name, &bindings)?;
        }

        let mut computed = false;
        let value = self
            .shared
            .store
            .get_or_compute(id, declared.id, &declared.name, arg, || {
                computed = true;
                compute()
            })?;
        if !computed && self.shared.config.log_hits {
            log::debug!("cache hit: `{}` on {}", declared.name, id);
        }
        Ok(value)
    }
}
