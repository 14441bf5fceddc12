//! Identity and event plumbing shared by every object in the graph

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fontext_core::{Event, EventBus, OwnerId};

/// Announces creation when built and destruction exactly once, either
/// explicitly or when dropped
pub(crate) struct Node {
    pub(crate) id: OwnerId,
    pub(crate) bus: Arc<EventBus>,
    destroyed: AtomicBool,
}

impl Node {
    pub(crate) fn new(bus: Arc<EventBus>) -> Self {
        let id = OwnerId::fresh();
        bus.owner_created(id);
        Self {
            id,
            bus,
            destroyed: AtomicBool::new(false),
        }
    }

    pub(crate) fn emit(&self, events: &[Event]) {
        if self.is_destroyed() {
            log::trace!("{} is destroyed; not emitting {:?}", self.id, events);
            return;
        }
        for event in events {
            self.bus.emit(self.id, *event);
        }
    }

    pub(crate) fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            self.bus.owner_destroyed(self.id);
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.destroy();
    }
}
