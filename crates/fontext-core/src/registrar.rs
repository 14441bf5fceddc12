//! The invalidation registrar
//!
//! Binds one cached extension on one owner to the events that make its
//! values stale. A binding names the event and the owner that fires it,
//! which is either the owner itself or a related owner resolved when the
//! registration was made (the kerning of a font listening to that font's
//! groups).

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::bus::{NotificationBus, SubscriptionHandle};
use crate::cache::{CacheStore, FunctionId};
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::owner::OwnerId;

/// One event on one source owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventBinding {
    pub event: Event,
    pub source: OwnerId,
}

impl EventBinding {
    pub fn new(event: impl Into<Event>, source: OwnerId) -> Self {
        Self {
            event: event.into(),
            source,
        }
    }
}

/// Outcome of [`Registrar::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    AlreadyRegistered,
}

struct Entry {
    label: String,
    bindings: Vec<EventBinding>,
    handles: Vec<SubscriptionHandle>,
}

pub struct Registrar {
    bus: Arc<dyn NotificationBus>,
    store: Arc<CacheStore>,
    entries: RwLock<HashMap<(OwnerId, FunctionId), Entry>>,
}

impl Registrar {
    pub fn new(bus: Arc<dyn NotificationBus>, store: Arc<CacheStore>) -> Self {
        Self {
            bus,
            store,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe `function` on `owner` to every binding
    ///
    /// Registering the same binding set twice is a no-op. A different binding
    /// set for an already registered pair is a configuration error.
    pub fn register(
        &self,
        owner: OwnerId,
        function: FunctionId,
        label: &str,
        bindings: &[EventBinding],
    ) -> Result<Registration> {
        let bindings = dedup(bindings);
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&(owner, function)) {
            if same_bindings(&existing.bindings, &bindings) {
                return Ok(Registration::AlreadyRegistered);
            }
            return Err(ConfigError::ConflictingRegistration {
                extension: existing.label.clone(),
                owner,
            }
            .into());
        }

        let handles = bindings
            .iter()
            .map(|binding| {
                let store: Weak<CacheStore> = Arc::downgrade(&self.store);
                self.bus.subscribe(
                    binding.source,
                    binding.event,
                    Arc::new(move |notification| {
                        if let Some(store) = store.upgrade() {
                            let cleared = store.invalidate(owner, function);
                            log::trace!(
                                "{} on {} cleared {} slots of {} on {}",
                                notification.event,
                                notification.owner,
                                cleared,
                                function,
                                owner
                            );
                        }
                    }),
                )
            })
            .collect();

        log::debug!(
            "registered `{}` on {} for {} events",
            label,
            owner,
            bindings.len()
        );
        entries.insert(
            (owner, function),
            Entry {
                label: label.to_string(),
                bindings,
                handles,
            },
        );
        Ok(Registration::Registered)
    }

    /// Drop the subscriptions of one registration
    pub fn unregister(&self, owner: OwnerId, function: FunctionId) -> bool {
        let removed = self.entries.write().remove(&(owner, function));
        match removed {
            Some(entry) => {
                self.release(&entry);
                true
            }
            None => false,
        }
    }

    /// Forget everything tied to a destroyed owner
    ///
    /// Registrations made for the owner are dropped. Registrations of other
    /// owners that listen to it as a related source are dropped too, and their
    /// values invalidated, so the next read resolves the related owner again.
    /// Returns the number of registrations removed.
    pub fn teardown_owner(&self, owner: OwnerId) -> usize {
        let (own, dependent) = {
            let mut entries = self.entries.write();
            let keys: Vec<(OwnerId, FunctionId)> = entries
                .iter()
                .filter(|(key, entry)| {
                    key.0 == owner || entry.bindings.iter().any(|b| b.source == owner)
                })
                .map(|(key, _)| *key)
                .collect();

            let mut own = Vec::new();
            let mut dependent = Vec::new();
            for key in keys {
                if let Some(entry) = entries.remove(&key) {
                    if key.0 == owner {
                        own.push(entry);
                    } else {
                        dependent.push((key, entry));
                    }
                }
            }
            (own, dependent)
        };

        for entry in &own {
            self.release(entry);
        }
        for ((dependent_owner, function), entry) in &dependent {
            self.release(entry);
            self.store.invalidate(*dependent_owner, *function);
            log::debug!(
                "`{}` on {} lost its source {}; will re-resolve on next read",
                entry.label,
                dependent_owner,
                owner
            );
        }
        own.len() + dependent.len()
    }

    /// Drop every registration
    pub fn clear(&self) {
        let entries = std::mem::take(&mut *self.entries.write());
        for entry in entries.values() {
            self.release(entry);
        }
    }

    pub fn is_registered(&self, owner: OwnerId, function: FunctionId) -> bool {
        self.entries.read().contains_key(&(owner, function))
    }

    pub fn bindings(&self, owner: OwnerId, function: FunctionId) -> Option<Vec<EventBinding>> {
        self.entries
            .read()
            .get(&(owner, function))
            .map(|entry| entry.bindings.clone())
    }

    pub fn registration_count(&self) -> usize {
        self.entries.read().len()
    }

    fn release(&self, entry: &Entry) {
        for handle in &entry.handles {
            self.bus.unsubscribe(*handle);
        }
    }
}

fn dedup(bindings: &[EventBinding]) -> Vec<EventBinding> {
    let mut unique = Vec::with_capacity(bindings.len());
    for binding in bindings {
        if !unique.contains(binding) {
            unique.push(*binding);
        }
    }
    unique
}

fn same_bindings(a: &[EventBinding], b: &[EventBinding]) -> bool {
    a.len() == b.len() && a.iter().all(|binding| b.contains(binding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::cache::EntryState;
    use crate::error::ExtError;
    use crate::events::{GlyphEvent, GroupsEvent, KerningEvent};

    const F: FunctionId = FunctionId(0);

    fn setup() -> (Arc<EventBus>, Arc<CacheStore>, Registrar) {
        let bus = Arc::new(EventBus::new());
        let store = Arc::new(CacheStore::new());
        let registrar = Registrar::new(bus.clone(), store.clone());
        (bus, store, registrar)
    }

    fn fill(store: &CacheStore, owner: OwnerId) {
        store.get_or_compute(owner, F, "f", &(), || Ok(1u32)).unwrap();
    }

    #[test]
    fn listed_event_invalidates() {
        let (bus, store, registrar) = setup();
        let glyph = OwnerId::fresh();
        let bindings = [EventBinding::new(GlyphEvent::AnchorsChanged, glyph)];
        registrar.register(glyph, F, "f", &bindings).unwrap();
        fill(&store, glyph);

        bus.emit(glyph, GlyphEvent::ContoursChanged.into());
        assert_eq!(store.entry_state::<(), u32>(glyph, F, &()), EntryState::Valid);

        bus.emit(glyph, GlyphEvent::AnchorsChanged.into());
        assert_eq!(store.entry_state::<(), u32>(glyph, F, &()), EntryState::Invalid);
    }

    #[test]
    fn registering_twice_is_a_no_op() {
        let (bus, _store, registrar) = setup();
        let glyph = OwnerId::fresh();
        let bindings = [
            EventBinding::new(GlyphEvent::AnchorsChanged, glyph),
            EventBinding::new(GlyphEvent::AnchorsChanged, glyph),
        ];
        assert_eq!(
            registrar.register(glyph, F, "f", &bindings).unwrap(),
            Registration::Registered
        );
        assert_eq!(
            registrar.register(glyph, F, "f", &bindings[..1]).unwrap(),
            Registration::AlreadyRegistered
        );
        assert_eq!(bus.subscription_count(glyph), 1);
    }

    #[test]
    fn different_bindings_conflict() {
        let (_bus, _store, registrar) = setup();
        let glyph = OwnerId::fresh();
        registrar
            .register(glyph, F, "f", &[EventBinding::new(GlyphEvent::AnchorsChanged, glyph)])
            .unwrap();
        let err = registrar
            .register(glyph, F, "f", &[EventBinding::new(GlyphEvent::Changed, glyph)])
            .unwrap_err();
        assert!(matches!(
            err,
            ExtError::Config(ConfigError::ConflictingRegistration { .. })
        ));
    }

    #[test]
    fn related_source_teardown_drops_dependents() {
        let (bus, store, registrar) = setup();
        let kerning = OwnerId::fresh();
        let groups = OwnerId::fresh();
        let bindings = [
            EventBinding::new(KerningEvent::Changed, kerning),
            EventBinding::new(GroupsEvent::Changed, groups),
        ];
        registrar.register(kerning, F, "f", &bindings).unwrap();
        fill(&store, kerning);

        assert_eq!(registrar.teardown_owner(groups), 1);
        assert!(!registrar.is_registered(kerning, F));
        assert_eq!(bus.subscription_count(kerning), 0);
        assert_eq!(store.entry_state::<(), u32>(kerning, F, &()), EntryState::Invalid);
    }

    #[test]
    fn owner_teardown_unsubscribes() {
        let (bus, _store, registrar) = setup();
        let glyph = OwnerId::fresh();
        registrar
            .register(glyph, F, "f", &[EventBinding::new(GlyphEvent::AnchorsChanged, glyph)])
            .unwrap();
        assert_eq!(registrar.teardown_owner(glyph), 1);
        assert_eq!(bus.total_subscriptions(), 0);
        assert_eq!(registrar.registration_count(), 0);
    }
}
