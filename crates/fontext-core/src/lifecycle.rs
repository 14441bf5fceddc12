//! Owner lifecycle hooks
//!
//! A destroyed owner loses its cache entries and every subscription made for
//! it. A newly created owner starts with an empty cache.

use crate::bus::Lifecycle;
use crate::cache::CacheStore;
use crate::owner::OwnerId;
use crate::registrar::Registrar;

pub(crate) fn on_signal(store: &CacheStore, registrar: &Registrar, signal: Lifecycle) {
    match signal {
        Lifecycle::Created(owner) => {
            let stale = store.invalidate_all(owner);
            if stale > 0 {
                log::warn!("{} was created with {} stale cache slots; dropped", owner, stale);
            }
        }
        Lifecycle::Destroyed(owner) => teardown(store, registrar, owner),
    }
}

pub(crate) fn teardown(store: &CacheStore, registrar: &Registrar, owner: OwnerId) {
    let registrations = registrar.teardown_owner(owner);
    let slots = store.invalidate_all(owner);
    if registrations > 0 || slots > 0 {
        log::debug!(
            "teardown {}: {} registrations, {} cache slots",
            owner,
            registrations,
            slots
        );
    }
}
