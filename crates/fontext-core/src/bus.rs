//! The notification bus: how host changes reach the cache
//!
//! Hosts report changes by name on an owner; extensions listen. The
//! [`NotificationBus`] trait is the seam a host adapter implements, and
//! [`EventBus`] is the in-process implementation used by `fontext-host`.
//!
//! Dispatch is synchronous: every matching callback has run by the time
//! `emit` returns. Callbacks are snapshotted before they run, so a callback
//! may subscribe or unsubscribe without deadlocking the bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::Event;
use crate::owner::OwnerId;

/// A change that happened on an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub owner: OwnerId,
    pub event: Event,
}

/// Owner lifecycle as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created(OwnerId),
    Destroyed(OwnerId),
}

pub type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;
pub type LifecycleCallback = Arc<dyn Fn(Lifecycle) + Send + Sync>;

/// Ticket returned by a subscription, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Subscribe-by-name over a host's observer mechanism
pub trait NotificationBus: Send + Sync {
    /// Call `callback` every time `event` fires on `owner`
    fn subscribe(&self, owner: OwnerId, event: Event, callback: Callback) -> SubscriptionHandle;

    /// Listen to owner creation and destruction
    fn subscribe_lifecycle(&self, callback: LifecycleCallback) -> SubscriptionHandle;

    /// Cancel a subscription. Returns false when the handle was unknown.
    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool;

    /// Number of live event subscriptions on an owner
    fn subscription_count(&self, owner: OwnerId) -> usize;
}

struct Subscription {
    owner: OwnerId,
    event: Event,
    callback: Callback,
}

#[derive(Default)]
struct BusState {
    subscriptions: HashMap<SubscriptionHandle, Subscription>,
    by_target: HashMap<(OwnerId, Event), Vec<SubscriptionHandle>>,
    lifecycle: Vec<(SubscriptionHandle, LifecycleCallback)>,
}

/// In-process synchronous bus
pub struct EventBus {
    state: RwLock<BusState>,
    next_handle: AtomicU64,
    emitted: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BusState::default()),
            next_handle: AtomicU64::new(1),
            emitted: AtomicU64::new(0),
        }
    }

    fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Fire `event` on `owner`, returning how many callbacks ran
    pub fn emit(&self, owner: OwnerId, event: Event) -> usize {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        let callbacks: Vec<Callback> = {
            let state = self.state.read();
            match state.by_target.get(&(owner, event)) {
                Some(handles) => handles
                    .iter()
                    .filter_map(|handle| state.subscriptions.get(handle))
                    .map(|sub| Arc::clone(&sub.callback))
                    .collect(),
                None => Vec::new(),
            }
        };

        log::trace!("emit {} on {} -> {} callbacks", event, owner, callbacks.len());

        let notification = Notification { owner, event };
        for callback in &callbacks {
            callback(&notification);
        }
        callbacks.len()
    }

    /// Report that the host created an owner
    pub fn owner_created(&self, owner: OwnerId) {
        self.dispatch_lifecycle(Lifecycle::Created(owner));
    }

    /// Report that the host is destroying an owner
    ///
    /// Lifecycle listeners run first, then every event subscription still
    /// targeting the owner is dropped so nothing can fire for it afterwards.
    pub fn owner_destroyed(&self, owner: OwnerId) {
        self.dispatch_lifecycle(Lifecycle::Destroyed(owner));

        let mut state = self.state.write();
        let stale: Vec<SubscriptionHandle> = state
            .subscriptions
            .iter()
            .filter(|(_, sub)| sub.owner == owner)
            .map(|(handle, _)| *handle)
            .collect();
        if !stale.is_empty() {
            log::debug!("dropping {} leftover subscriptions of {}", stale.len(), owner);
        }
        for handle in stale {
            remove_subscription(&mut state, handle);
        }
    }

    fn dispatch_lifecycle(&self, signal: Lifecycle) {
        let listeners: Vec<LifecycleCallback> = self
            .state
            .read()
            .lifecycle
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for listener in &listeners {
            listener(signal);
        }
    }

    /// Total number of events emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Number of live event subscriptions across all owners
    pub fn total_subscriptions(&self) -> usize {
        self.state.read().subscriptions.len()
    }
}

fn remove_subscription(state: &mut BusState, handle: SubscriptionHandle) -> bool {
    let Some(sub) = state.subscriptions.remove(&handle) else {
        return false;
    };
    let key = (sub.owner, sub.event);
    if let Some(handles) = state.by_target.get_mut(&key) {
        handles.retain(|h| *h != handle);
        if handles.is_empty() {
            state.by_target.remove(&key);
        }
    }
    true
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus for EventBus {
    fn subscribe(&self, owner: OwnerId, event: Event, callback: Callback) -> SubscriptionHandle {
        let handle = self.handle();
        let mut state = self.state.write();
        state.subscriptions.insert(
            handle,
            Subscription {
                owner,
                event,
                callback,
            },
        );
        state.by_target.entry((owner, event)).or_default().push(handle);
        handle
    }

    fn subscribe_lifecycle(&self, callback: LifecycleCallback) -> SubscriptionHandle {
        let handle = self.handle();
        self.state.write().lifecycle.push((handle, callback));
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut state = self.state.write();
        if remove_subscription(&mut state, handle) {
            return true;
        }
        let before = state.lifecycle.len();
        state.lifecycle.retain(|(h, _)| *h != handle);
        state.lifecycle.len() != before
    }

    fn subscription_count(&self, owner: OwnerId) -> usize {
        self.state
            .read()
            .subscriptions
            .values()
            .filter(|sub| sub.owner == owner)
            .count()
    }
}
